//! Chunk registry: lazily resolved, memoized page modules.
//!
//! Every page of the site is shipped as a *module*: a factory closure bound to
//! an opaque [`ModuleId`]. Modules arrive in batches called [`Chunk`]s, and
//! nothing is compiled until somebody asks for it.
//!
//! ## Lifecycle
//!
//! ```text
//! create → register* / load_chunk* → resolve* → drop
//! ```
//!
//! A registry is an ordinary value. There is no process-wide instance; the
//! site owns one and hands out references to whoever needs to resolve pages.
//!
//! ## Resolution
//!
//! Each identifier owns a slot that moves through three states:
//!
//! ```text
//! Unresolved ──resolve()──▶ Resolving(thread) ──factory returns──▶ Resolved(Arc<T>)
//!      ▲                          │
//!      └──────factory panics──────┘
//! ```
//!
//! The first caller runs the factory with no lock held. Concurrent callers
//! for the same identifier park on the slot's condition variable and receive
//! the same `Arc` once it is ready, so a factory runs at most once
//! (single-flight). Callers for *other* identifiers are never blocked, and a
//! factory may itself resolve other modules.
//!
//! Resolving an identifier from inside its own factory would wait forever;
//! the slot records the resolving thread and reports
//! [`RegistryError::CircularResolution`] instead.

use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("module {0} is already registered")]
    DuplicateIdentifier(ModuleId),
    #[error("module {0} is not registered")]
    UnknownIdentifier(ModuleId),
    #[error("module {0} was resolved from inside its own factory")]
    CircularResolution(ModuleId),
}

/// Opaque key for a registered module.
///
/// Never interpreted beyond equality and ordering. Numeric ids mirror the
/// compact integers a bundler assigns; named ids are convenient in tests and
/// for hand-registered modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    Numeric(u64),
    Named(String),
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Numeric(n) => write!(f, "{}", n),
            ModuleId::Named(name) => write!(f, "\"{}\"", name),
        }
    }
}

impl From<u64> for ModuleId {
    fn from(n: u64) -> Self {
        ModuleId::Numeric(n)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        ModuleId::Named(name.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(name: String) -> Self {
        ModuleId::Named(name)
    }
}

/// A module factory. Invoked at most once per registry.
pub type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A named batch of modules that is loaded as one unit.
pub struct Chunk<T> {
    name: String,
    modules: Vec<(ModuleId, Factory<T>)>,
}

impl<T> Chunk<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    /// Add a module to the chunk (builder style).
    pub fn with_module<F>(mut self, id: impl Into<ModuleId>, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.modules.push((id.into(), Box::new(factory)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.modules.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<T> fmt::Debug for Chunk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("name", &self.name)
            .field("modules", &self.module_ids().collect::<Vec<_>>())
            .finish()
    }
}

enum SlotState<T> {
    Unresolved,
    Resolving(ThreadId),
    Resolved(Arc<T>),
}

struct Slot<T> {
    factory: Factory<T>,
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn new(factory: Factory<T>) -> Self {
        Self {
            factory,
            state: Mutex::new(SlotState::Unresolved),
            ready: Condvar::new(),
        }
    }
}

/// Resets a slot to `Unresolved` if the factory unwinds, so parked callers
/// wake up and one of them retries.
struct InFlight<'a, T> {
    slot: &'a Slot<T>,
    armed: bool,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.slot.state.lock() = SlotState::Unresolved;
            self.slot.ready.notify_all();
        }
    }
}

struct Inner<T> {
    slots: HashMap<ModuleId, Arc<Slot<T>>>,
    loaded_chunks: HashSet<String>,
}

/// Registry of lazily resolved modules producing values of type `T`.
pub struct ChunkRegistry<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> Default for ChunkRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChunkRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ChunkRegistry")
            .field("modules", &inner.slots.len())
            .field("chunks", &inner.loaded_chunks.len())
            .finish()
    }
}

impl<T> ChunkRegistry<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: HashMap::new(),
                loaded_chunks: HashSet::new(),
            }),
        }
    }

    /// Bind `factory` to `id`.
    ///
    /// Fails with [`RegistryError::DuplicateIdentifier`] if `id` is already
    /// bound; the existing binding is left untouched.
    pub fn register<F>(&self, id: impl Into<ModuleId>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let id = id.into();
        let mut inner = self.inner.write();
        if inner.slots.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentifier(id));
        }
        debug!(module = %id, "registered module");
        inner.slots.insert(id, Arc::new(Slot::new(Box::new(factory))));
        Ok(())
    }

    /// Register every module of `chunk`.
    ///
    /// All identifiers are checked before any is bound, so a chunk either
    /// loads completely or not at all. Loading a chunk whose name was already
    /// loaded is a no-op that returns `Ok(0)`.
    pub fn load_chunk(&self, chunk: Chunk<T>) -> Result<usize, RegistryError> {
        let mut inner = self.inner.write();
        if inner.loaded_chunks.contains(&chunk.name) {
            trace!(chunk = %chunk.name, "chunk already loaded");
            return Ok(0);
        }

        let mut seen = HashSet::new();
        for (id, _) in &chunk.modules {
            if inner.slots.contains_key(id) || !seen.insert(id) {
                return Err(RegistryError::DuplicateIdentifier(id.clone()));
            }
        }

        let count = chunk.modules.len();
        for (id, factory) in chunk.modules {
            inner.slots.insert(id, Arc::new(Slot::new(factory)));
        }
        debug!(chunk = %chunk.name, modules = count, "loaded chunk");
        inner.loaded_chunks.insert(chunk.name);
        Ok(count)
    }

    /// Return the module bound to `id`, running its factory on first use.
    ///
    /// Every successful call for the same `id` returns a clone of the same
    /// `Arc`.
    ///
    /// Cycle detection is per thread: a factory resolving its own id on the
    /// same thread gets [`RegistryError::CircularResolution`]. A cycle that
    /// spans threads (A's factory waits on B while B's factory, on another
    /// thread, waits on A) is not detected and deadlocks. Factories that
    /// resolve other modules must not form such cycles.
    pub fn resolve(&self, id: &ModuleId) -> Result<Arc<T>, RegistryError> {
        let slot = self
            .inner
            .read()
            .slots
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownIdentifier(id.clone()))?;

        let me = thread::current().id();
        let mut state = slot.state.lock();
        loop {
            let in_progress = match &*state {
                SlotState::Resolved(value) => {
                    trace!(module = %id, "cache hit");
                    return Ok(Arc::clone(value));
                }
                SlotState::Resolving(owner) if *owner == me => {
                    return Err(RegistryError::CircularResolution(id.clone()));
                }
                SlotState::Resolving(_) => true,
                SlotState::Unresolved => false,
            };
            if !in_progress {
                break;
            }
            slot.ready.wait(&mut state);
        }
        *state = SlotState::Resolving(me);
        drop(state);

        let mut in_flight = InFlight {
            slot: slot.as_ref(),
            armed: true,
        };
        debug!(module = %id, "running factory");
        let value = Arc::new((slot.factory)());
        in_flight.armed = false;

        *slot.state.lock() = SlotState::Resolved(Arc::clone(&value));
        slot.ready.notify_all();
        Ok(value)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.inner.read().slots.contains_key(id)
    }

    /// Whether the module's factory has already run to completion.
    pub fn is_resolved(&self, id: &ModuleId) -> bool {
        self.inner
            .read()
            .slots
            .get(id)
            .is_some_and(|slot| matches!(*slot.state.lock(), SlotState::Resolved(_)))
    }

    pub fn is_chunk_loaded(&self, name: &str) -> bool {
        self.inner.read().loaded_chunks.contains(name)
    }

    pub fn len(&self) -> usize {
        self.inner.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().slots.is_empty()
    }

    /// Number of modules whose factory has run.
    pub fn resolved_count(&self) -> usize {
        self.inner
            .read()
            .slots
            .values()
            .filter(|slot| matches!(*slot.state.lock(), SlotState::Resolved(_)))
            .count()
    }

    /// All registered identifiers, sorted.
    pub fn ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.inner.read().slots.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    fn counting_factory(
        counter: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl Fn() -> String + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            value.to_string()
        }
    }

    // =========================================================================
    // register / resolve
    // =========================================================================

    #[test]
    fn resolve_returns_same_arc_every_time() {
        let registry = ChunkRegistry::new();
        registry.register("page-1", || "T".to_string()).unwrap();

        let id = ModuleId::from("page-1");
        let first = registry.resolve(&id).unwrap();
        let second = registry.resolve(&id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, "T");
    }

    #[test]
    fn factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ChunkRegistry::new();
        registry
            .register(7u64, counting_factory(&calls, "seven"))
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0, "registration must be lazy");
        for _ in 0..5 {
            registry.resolve(&ModuleId::Numeric(7)).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resolve_unknown_is_error() {
        let registry: ChunkRegistry<String> = ChunkRegistry::new();
        let err = registry.resolve(&ModuleId::from("missing")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownIdentifier(ModuleId::from("missing"))
        );
    }

    #[test]
    fn duplicate_register_keeps_original_binding() {
        let registry = ChunkRegistry::new();
        registry.register("a", || "original".to_string()).unwrap();
        let err = registry
            .register("a", || "replacement".to_string())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateIdentifier(ModuleId::from("a")));

        let value = registry.resolve(&ModuleId::from("a")).unwrap();
        assert_eq!(*value, "original");
    }

    #[test]
    fn numeric_and_named_ids_are_distinct() {
        let registry = ChunkRegistry::new();
        registry.register(1u64, || "number".to_string()).unwrap();
        registry.register("1", || "name".to_string()).unwrap();
        assert_eq!(*registry.resolve(&ModuleId::Numeric(1)).unwrap(), "number");
        assert_eq!(*registry.resolve(&ModuleId::from("1")).unwrap(), "name");
    }

    #[test]
    fn is_resolved_tracks_state() {
        let registry = ChunkRegistry::new();
        registry.register("x", || 1u32).unwrap();
        let id = ModuleId::from("x");
        assert!(!registry.is_resolved(&id));
        assert_eq!(registry.resolved_count(), 0);
        registry.resolve(&id).unwrap();
        assert!(registry.is_resolved(&id));
        assert_eq!(registry.resolved_count(), 1);
    }

    #[test]
    fn ids_are_sorted() {
        let registry = ChunkRegistry::new();
        registry.register("b", || ()).unwrap();
        registry.register(2u64, || ()).unwrap();
        registry.register("a", || ()).unwrap();
        assert_eq!(
            registry.ids(),
            vec![ModuleId::Numeric(2), ModuleId::from("a"), ModuleId::from("b")]
        );
    }

    #[test]
    fn module_id_display() {
        assert_eq!(ModuleId::Numeric(4053).to_string(), "4053");
        assert_eq!(ModuleId::from("page-1").to_string(), "\"page-1\"");
    }

    // =========================================================================
    // Chunks
    // =========================================================================

    #[test]
    fn load_chunk_registers_all_modules() {
        let registry = ChunkRegistry::new();
        let chunk = Chunk::new("398")
            .with_module(4053u64, || "page".to_string())
            .with_module(8453u64, || "provider".to_string());
        assert_eq!(registry.load_chunk(chunk).unwrap(), 2);
        assert!(registry.is_chunk_loaded("398"));
        assert_eq!(registry.len(), 2);
        assert_eq!(*registry.resolve(&ModuleId::Numeric(8453)).unwrap(), "provider");
    }

    #[test]
    fn reloading_chunk_is_noop() {
        let registry = ChunkRegistry::new();
        registry
            .load_chunk(Chunk::new("c").with_module("m", || 1u8))
            .unwrap();
        let again = registry
            .load_chunk(Chunk::new("c").with_module("m", || 2u8))
            .unwrap();
        assert_eq!(again, 0);
        assert_eq!(*registry.resolve(&ModuleId::from("m")).unwrap(), 1);
    }

    #[test]
    fn chunk_with_taken_id_loads_nothing() {
        let registry = ChunkRegistry::new();
        registry.register("taken", || 0u8).unwrap();
        let chunk = Chunk::new("c")
            .with_module("fresh", || 1u8)
            .with_module("taken", || 2u8);
        let err = registry.load_chunk(chunk).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateIdentifier(ModuleId::from("taken"))
        );
        assert!(!registry.contains(&ModuleId::from("fresh")));
        assert!(!registry.is_chunk_loaded("c"));
    }

    #[test]
    fn chunk_with_internal_duplicate_is_rejected() {
        let registry = ChunkRegistry::new();
        let chunk = Chunk::new("c")
            .with_module("same", || 1u8)
            .with_module("same", || 2u8);
        assert!(matches!(
            registry.load_chunk(chunk),
            Err(RegistryError::DuplicateIdentifier(_))
        ));
        assert!(registry.is_empty());
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[test]
    fn concurrent_first_resolution_is_single_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(ChunkRegistry::new());
        let counter = Arc::clone(&calls);
        registry
            .register("slow", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(20));
                vec![1, 2, 3]
            })
            .unwrap();

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    registry.resolve(&ModuleId::from("slow")).unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<Vec<i32>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for r in &results {
            assert!(Arc::ptr_eq(r, &results[0]));
        }
    }

    #[test]
    fn factory_may_resolve_other_modules() {
        let registry = Arc::new(ChunkRegistry::new());
        registry.register("leaf", || 10u32).unwrap();
        let inner = Arc::downgrade(&registry);
        registry
            .register("root", move || {
                let registry = inner.upgrade().unwrap();
                *registry.resolve(&ModuleId::from("leaf")).unwrap() + 1
            })
            .unwrap();
        assert_eq!(*registry.resolve(&ModuleId::from("root")).unwrap(), 11);
    }

    #[test]
    fn self_resolution_is_reported() {
        let registry: Arc<ChunkRegistry<Result<u32, RegistryError>>> =
            Arc::new(ChunkRegistry::new());
        let inner = Arc::downgrade(&registry);
        registry
            .register("loop", move || {
                let registry = inner.upgrade().unwrap();
                registry.resolve(&ModuleId::from("loop")).map(|_| 0)
            })
            .unwrap();
        let value = registry.resolve(&ModuleId::from("loop")).unwrap();
        assert_eq!(
            *value,
            Err(RegistryError::CircularResolution(ModuleId::from("loop")))
        );
    }

    #[test]
    fn panicking_factory_can_be_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(ChunkRegistry::new());
        let counter = Arc::clone(&attempts);
        registry
            .register("flaky", move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first attempt fails");
                }
                "ok".to_string()
            })
            .unwrap();

        let id = ModuleId::from("flaky");
        let first = {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            std::thread::spawn(move || registry.resolve(&id)).join()
        };
        assert!(first.is_err(), "panic must propagate to the caller");
        assert!(!registry.is_resolved(&id));

        assert_eq!(*registry.resolve(&id).unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
