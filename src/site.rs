//! The built site: one lazily compiled chunk per page.
//!
//! Stage 2 of the pipeline. [`Site::build`] turns a scan [`Manifest`] into a
//! [`ChunkRegistry`] of [`ContentModule`]s plus a route table:
//!
//! ```text
//! 02-guides/1-getting-started.md
//!   → chunk "3f2a9c1e.b71d04aa"        sha256(source path)[..8] . sha256(body)[..8]
//!       → module 1                      factory: ContentModule::compile(doc)
//!   → route /docs/guides/getting-started → module 1
//! ```
//!
//! Nothing is parsed during `build`; a page's Markdown is compiled the first
//! time its route is resolved and the result is shared from then on.

use crate::config::SiteConfig;
use crate::content::{ContentModule, RenderError};
use crate::context::{ContextStack, HelperSet, default_helpers, tag_overrides};
use crate::registry::{Chunk, ChunkRegistry, ModuleId, RegistryError};
use crate::scan::Manifest;
use crate::types::{DocSource, SidebarItem};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("no page at {0}")]
    UnknownRoute(String),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Failed to render {permalink}: {source}")]
    Render {
        permalink: String,
        source: RenderError,
    },
}

/// Where a permalink's module lives.
#[derive(Debug, Clone)]
pub struct Route {
    pub permalink: String,
    pub module: ModuleId,
    pub chunk: String,
    pub source: String,
    pub unlisted: bool,
}

pub struct Site {
    registry: ChunkRegistry<ContentModule>,
    routes: Vec<Route>,
    by_permalink: HashMap<String, usize>,
    sidebar: Vec<SidebarItem>,
    config: SiteConfig,
}

impl Site {
    /// Register one chunk per doc. Pages are compiled on first resolution.
    pub fn build(manifest: Manifest) -> Result<Self, SiteError> {
        let registry = ChunkRegistry::new();
        let mut routes = Vec::with_capacity(manifest.docs.len());
        let mut by_permalink = HashMap::new();
        let toc = manifest.config.toc;

        for (index, doc) in manifest.docs.into_iter().enumerate() {
            let chunk_name = chunk_name(&doc.source, &doc.body);
            let module = ModuleId::Numeric(index as u64);
            let route = Route {
                permalink: doc.permalink.clone(),
                module: module.clone(),
                chunk: chunk_name.clone(),
                source: doc.source.clone(),
                unlisted: doc.unlisted,
            };

            let doc: Arc<DocSource> = Arc::new(doc);
            let chunk = Chunk::new(chunk_name).with_module(module, move || {
                debug!(source = %doc.source, "compiling page");
                ContentModule::compile(&doc, toc)
            });
            registry.load_chunk(chunk)?;

            by_permalink.insert(route.permalink.clone(), index);
            routes.push(route);
        }
        info!(pages = routes.len(), "registered page chunks");

        Ok(Self {
            registry,
            routes,
            by_permalink,
            sidebar: manifest.sidebar,
            config: manifest.config,
        })
    }

    /// Resolve the page served at `permalink`.
    pub fn page(&self, permalink: &str) -> Result<Arc<ContentModule>, SiteError> {
        let index = self
            .by_permalink
            .get(permalink)
            .ok_or_else(|| SiteError::UnknownRoute(permalink.to_string()))?;
        self.resolve(&self.routes[*index].module)
    }

    pub fn resolve(&self, id: &ModuleId) -> Result<Arc<ContentModule>, SiteError> {
        Ok(self.registry.resolve(id)?)
    }

    /// Routes in site order: sidebar order, then unlisted pages.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn sidebar(&self) -> &[SidebarItem] {
        &self.sidebar
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChunkRegistry<ContentModule> {
        &self.registry
    }
}

/// `"xxxxxxxx.yyyyyyyy"`: leading hex of the source path hash and of the body hash.
pub fn chunk_name(source: &str, body: &str) -> String {
    let path_hash = format!("{:x}", Sha256::digest(source.as_bytes()));
    let body_hash = format!("{:x}", Sha256::digest(body.as_bytes()));
    format!("{}.{}", &path_hash[..8], &body_hash[..8])
}

/// Run `body` with the site's helper set: the default HTML primitives, with
/// the config's `[primitives]` overrides in an enclosing scope.
pub fn with_site_helpers<R>(config: &SiteConfig, body: impl FnOnce(&HelperSet) -> R) -> R {
    let defaults = default_helpers();
    let overrides = tag_overrides(&defaults, &config.primitives);
    let mut stack = ContextStack::new(defaults);
    stack.scope(&overrides, |stack| body(&stack.current_or_default()))
}

// ============================================================================
// Check
// ============================================================================

#[derive(Debug, Clone)]
pub struct PageCheck {
    pub permalink: String,
    pub title: String,
    pub toc_entries: usize,
    pub nodes: usize,
    pub unlisted: bool,
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    pub pages: Vec<PageCheck>,
    pub chunks: usize,
}

/// Resolve and render every route without writing anything.
pub fn check(site: &Site) -> Result<CheckReport, SiteError> {
    with_site_helpers(site.config(), |helpers| -> Result<CheckReport, SiteError> {
        let mut pages = Vec::with_capacity(site.routes().len());
        for route in site.routes() {
            let module = site.resolve(&route.module)?;
            let tree = module.render(helpers).map_err(|source| SiteError::Render {
                permalink: route.permalink.clone(),
                source,
            })?;
            pages.push(PageCheck {
                permalink: route.permalink.clone(),
                title: module.metadata().title.clone(),
                toc_entries: module.toc().len(),
                nodes: tree.root().count_nodes(),
                unlisted: route.unlisted,
            });
        }
        Ok(CheckReport {
            chunks: site.registry().len(),
            pages,
        })
    })
}
