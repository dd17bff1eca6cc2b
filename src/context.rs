//! Rendering helpers and the context stack that supplies them.
//!
//! Content modules never import their rendering primitives. They receive a
//! [`HelperSet`], a name → [`Primitive`] map, and look up what they need by
//! name (`"heading"`, `"paragraph"`, `"code_block"`, ...). Swapping the set
//! swaps the output: the same page renders to HTML elements with
//! [`default_helpers`] and to plain tagged nodes with a mock set in tests.
//!
//! ## Scopes
//!
//! Nested overrides are modelled as an explicit [`ContextStack`] of frames
//! owned by the caller, not as ambient state:
//!
//! ```text
//! frame 0: default_helpers()
//! frame 1: frame 0 + { code_block: retagged(.., "div") }   ← scope(overrides, ..)
//! ```
//!
//! [`ContextStack::provide`] computes a merged set without touching the stack;
//! [`ContextStack::scope`] pushes that set for the duration of a closure and
//! pops it afterwards, so the previous frame is current again on return.

use crate::tree::{Child, Node};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("no helper context has been established")]
    NoContextEstablished,
}

pub const HEADING: &str = "heading";
pub const PARAGRAPH: &str = "paragraph";
pub const CODE: &str = "code";
pub const CODE_BLOCK: &str = "code_block";
pub const STRONG: &str = "strong";
pub const EMPHASIS: &str = "emphasis";
pub const STRIKETHROUGH: &str = "strikethrough";
pub const LIST: &str = "list";
pub const LIST_ITEM: &str = "list_item";
pub const LINK: &str = "link";
pub const IMAGE: &str = "image";
pub const QUOTE: &str = "quote";
pub const RULE: &str = "rule";
/// Optional primitive that receives the whole rendered page as its child.
pub const WRAPPER: &str = "wrapper";

/// Every primitive name a page may ask for.
pub const PRIMITIVE_NAMES: &[&str] = &[
    HEADING,
    PARAGRAPH,
    CODE,
    CODE_BLOCK,
    STRONG,
    EMPHASIS,
    STRIKETHROUGH,
    LIST,
    LIST_ITEM,
    LINK,
    IMAGE,
    QUOTE,
    RULE,
    WRAPPER,
];

/// Input to a primitive: semantic attributes plus already-rendered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Child>,
}

impl Props {
    pub fn new(attrs: BTreeMap<String, String>, children: Vec<Child>) -> Self {
        Self { attrs, children }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// A single rendering helper.
#[derive(Clone)]
pub struct Primitive(Arc<dyn Fn(Props) -> Node + Send + Sync>);

impl Primitive {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(Props) -> Node + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    /// A primitive that emits `tag` with the props' children and no attributes.
    pub fn tag(tag: &'static str) -> Self {
        Self::new(move |props| Node::new(tag).with_children(props.children))
    }

    pub fn call(&self, props: Props) -> Node {
        (self.0)(props)
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Primitive")
    }
}

/// Named collection of primitives.
#[derive(Clone, Default)]
pub struct HelperSet {
    primitives: BTreeMap<String, Primitive>,
}

impl fmt::Debug for HelperSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.primitives.keys()).finish()
    }
}

impl HelperSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, primitive: Primitive) -> Self {
        self.insert(name, primitive);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, primitive: Primitive) {
        self.primitives.insert(name.into(), primitive);
    }

    pub fn get(&self, name: &str) -> Option<&Primitive> {
        self.primitives.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.primitives.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// A new set with `overrides` shallow-merged on top of `self`.
    pub fn merged(&self, overrides: &HelperSet) -> HelperSet {
        let mut merged = self.clone();
        for (name, primitive) in &overrides.primitives {
            merged.primitives.insert(name.clone(), primitive.clone());
        }
        merged
    }
}

/// Explicit stack of helper-set frames.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<HelperSet>,
}

impl ContextStack {
    /// A stack whose ambient frame is `defaults`.
    pub fn new(defaults: HelperSet) -> Self {
        Self {
            frames: vec![defaults],
        }
    }

    /// A stack with no frame at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The nearest enclosing frame.
    pub fn current(&self) -> Result<&HelperSet, ContextError> {
        self.frames.last().ok_or(ContextError::NoContextEstablished)
    }

    /// The nearest enclosing frame, or an empty set when there is none.
    pub fn current_or_default(&self) -> HelperSet {
        self.frames.last().cloned().unwrap_or_default()
    }

    /// Current helpers with `overrides` merged on top. The stack is unchanged.
    pub fn provide(&self, overrides: &HelperSet) -> HelperSet {
        match self.frames.last() {
            Some(frame) => frame.merged(overrides),
            None => overrides.clone(),
        }
    }

    /// Derive a new set from the current one.
    pub fn provide_with<F>(&self, derive: F) -> HelperSet
    where
        F: FnOnce(&HelperSet) -> HelperSet,
    {
        derive(&self.current_or_default())
    }

    /// Run `body` with `provide(overrides)` as the current frame.
    pub fn scope<R, F>(&mut self, overrides: &HelperSet, body: F) -> R
    where
        F: FnOnce(&mut ContextStack) -> R,
    {
        let frame = self.provide(overrides);
        self.run_in_frame(frame, body)
    }

    /// Run `body` with exactly `helpers` as the current frame, ignoring
    /// everything provided by enclosing frames.
    pub fn scope_isolated<R, F>(&mut self, helpers: HelperSet, body: F) -> R
    where
        F: FnOnce(&mut ContextStack) -> R,
    {
        self.run_in_frame(helpers, body)
    }

    fn run_in_frame<R, F>(&mut self, frame: HelperSet, body: F) -> R
    where
        F: FnOnce(&mut ContextStack) -> R,
    {
        let depth = self.frames.len();
        self.frames.push(frame);
        let mut guard = FrameGuard { stack: self, depth };
        body(&mut *guard.stack)
    }
}

/// Pops a scope's frame on exit, including when the body unwinds.
struct FrameGuard<'a> {
    stack: &'a mut ContextStack,
    depth: usize,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.truncate(self.depth);
    }
}

// ============================================================================
// Default HTML primitives
// ============================================================================

/// Primitives that map page content onto plain HTML elements.
pub fn default_helpers() -> HelperSet {
    HelperSet::new()
        .with(HEADING, Primitive::new(heading))
        .with(PARAGRAPH, Primitive::tag("p"))
        .with(CODE, Primitive::tag("code"))
        .with(CODE_BLOCK, Primitive::new(code_block))
        .with(STRONG, Primitive::tag("strong"))
        .with(EMPHASIS, Primitive::tag("em"))
        .with(STRIKETHROUGH, Primitive::tag("del"))
        .with(LIST, Primitive::new(list))
        .with(LIST_ITEM, Primitive::tag("li"))
        .with(LINK, Primitive::new(link))
        .with(IMAGE, Primitive::new(image))
        .with(QUOTE, Primitive::tag("blockquote"))
        .with(RULE, Primitive::tag("hr"))
}

fn heading(props: Props) -> Node {
    let level = props.attr("level").unwrap_or("2").to_string();
    let mut node = Node::new(format!("h{}", level));
    if let Some(id) = props.attr("id") {
        node = node.attr("id", id);
    }
    node.with_children(props.children)
}

fn code_block(props: Props) -> Node {
    let mut code = Node::new("code");
    if let Some(lang) = props.attr("language") {
        code = code.attr("class", format!("language-{}", lang));
    }
    Node::new("pre").child(code.with_children(props.children))
}

fn list(props: Props) -> Node {
    let ordered = props.attr("ordered") == Some("true");
    let mut node = Node::new(if ordered { "ol" } else { "ul" });
    if let Some(start) = props.attr("start").filter(|s| *s != "1") {
        node = node.attr("start", start);
    }
    node.with_children(props.children)
}

fn link(props: Props) -> Node {
    let mut node = Node::new("a").attr("href", props.attr("href").unwrap_or_default());
    if let Some(title) = props.attr("title") {
        node = node.attr("title", title);
    }
    node.with_children(props.children)
}

fn image(props: Props) -> Node {
    Node::new("img")
        .attr("src", props.attr("src").unwrap_or_default())
        .attr("alt", props.attr("alt").unwrap_or_default())
}

/// Wrap `base` so the node it emits carries `tag` instead.
///
/// `{level}` in `tag` is replaced with the `level` prop, which lets a
/// heading override keep its level (`"h{level}"`, `"div"`, ...).
pub fn retagged(base: Primitive, tag: impl Into<String>) -> Primitive {
    let tag = tag.into();
    Primitive::new(move |props: Props| {
        let level = props.attr("level").map(str::to_owned);
        let mut node = base.call(props);
        node.tag = match &level {
            Some(level) => tag.replace("{level}", level),
            None => tag.clone(),
        };
        node
    })
}

/// Build override primitives from a `name → tag` map, on top of `base`.
///
/// Names missing from `base` are skipped; config validation rejects them
/// before this point.
pub fn tag_overrides(base: &HelperSet, tags: &BTreeMap<String, String>) -> HelperSet {
    let mut overrides = HelperSet::new();
    for (name, tag) in tags {
        if let Some(primitive) = base.get(name) {
            overrides.insert(name.clone(), retagged(primitive.clone(), tag.clone()));
        }
    }
    overrides
}
