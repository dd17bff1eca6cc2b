//! Content modules: compiled pages that render through a helper set.
//!
//! A [`ContentModule`] is what a page's registry factory produces. Compiling
//! parses the Markdown body once into structured [`Content`] and derives the
//! page's immutable [`PageMetadata`] (description, table of contents). The
//! module never renders HTML itself: [`ContentModule::render`] walks the
//! content and asks the supplied [`HelperSet`] for a primitive by name for
//! every element.
//!
//! ```text
//! "## Key Features:"  →  Element { Heading { level: 2, id: "key-features" }, [Text("Key Features:")] }
//!                     →  helpers["heading"]({ level: "2", id: "key-features" }, ["Key Features:"])
//!                     →  <h2 id="key-features">Key Features:</h2>
//! ```

use crate::config::TocConfig;
use crate::context::{self, HelperSet, Props};
use crate::slug::Slugger;
use crate::tree::{Child, DisplayTree};
use crate::types::{DocSource, PageMetadata, TocEntry};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("helper set has no '{name}' primitive")]
    MissingHelper { name: String },
}

/// Semantic element kinds a page body is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Heading { level: u8, id: String },
    Paragraph,
    /// Inline code span.
    Code,
    CodeBlock { language: Option<String> },
    Strong,
    Emphasis,
    Strikethrough,
    List { ordered: bool, start: u64 },
    ListItem,
    Link { href: String, title: String },
    Image { src: String, alt: String },
    Quote,
    Rule,
}

impl ElementKind {
    /// Name of the primitive that renders this kind.
    pub fn primitive(&self) -> &'static str {
        match self {
            ElementKind::Heading { .. } => context::HEADING,
            ElementKind::Paragraph => context::PARAGRAPH,
            ElementKind::Code => context::CODE,
            ElementKind::CodeBlock { .. } => context::CODE_BLOCK,
            ElementKind::Strong => context::STRONG,
            ElementKind::Emphasis => context::EMPHASIS,
            ElementKind::Strikethrough => context::STRIKETHROUGH,
            ElementKind::List { .. } => context::LIST,
            ElementKind::ListItem => context::LIST_ITEM,
            ElementKind::Link { .. } => context::LINK,
            ElementKind::Image { .. } => context::IMAGE,
            ElementKind::Quote => context::QUOTE,
            ElementKind::Rule => context::RULE,
        }
    }

    /// Attributes handed to the primitive.
    pub fn attrs(&self) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        match self {
            ElementKind::Heading { level, id } => {
                attrs.insert("level".into(), level.to_string());
                attrs.insert("id".into(), id.clone());
            }
            ElementKind::CodeBlock {
                language: Some(language),
            } => {
                attrs.insert("language".into(), language.clone());
            }
            ElementKind::List { ordered, start } => {
                attrs.insert("ordered".into(), ordered.to_string());
                if *ordered {
                    attrs.insert("start".into(), start.to_string());
                }
            }
            ElementKind::Link { href, title } => {
                attrs.insert("href".into(), href.clone());
                if !title.is_empty() {
                    attrs.insert("title".into(), title.clone());
                }
            }
            ElementKind::Image { src, alt } => {
                attrs.insert("src".into(), src.clone());
                attrs.insert("alt".into(), alt.clone());
            }
            _ => {}
        }
        attrs
    }
}

/// Structured content of a page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Element {
        #[serde(flatten)]
        kind: ElementKind,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<Content>,
    },
}

impl Content {
    pub fn element(kind: ElementKind, children: Vec<Content>) -> Self {
        Content::Element { kind, children }
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Content::Text(text) => out.push_str(text),
            Content::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

fn plain_text(children: &[Content]) -> String {
    children.iter().map(Content::plain_text).collect()
}

/// A compiled page.
#[derive(Debug, Clone)]
pub struct ContentModule {
    metadata: Arc<PageMetadata>,
    content_title: Option<String>,
    content: Vec<Content>,
}

impl ContentModule {
    pub fn new(
        metadata: PageMetadata,
        content_title: Option<String>,
        content: Vec<Content>,
    ) -> Self {
        Self {
            metadata: Arc::new(metadata),
            content_title,
            content,
        }
    }

    /// Parse `doc`'s body and build the page's metadata.
    ///
    /// Headings get de-duplicated anchor ids; the ones within `toc` levels
    /// make up the table of contents. When the front matter has no
    /// description, the first line of the first paragraph is used.
    pub fn compile(doc: &DocSource, toc: TocConfig) -> Self {
        let parsed = parse_markdown(&doc.body, toc);
        let description = doc
            .description
            .clone()
            .or(parsed.first_paragraph)
            .unwrap_or_default();

        let metadata = PageMetadata {
            id: doc.id.clone(),
            title: doc.title.clone(),
            description,
            source: doc.source.clone(),
            source_dir_name: doc.source_dir_name.clone(),
            slug: doc.slug.clone(),
            permalink: doc.permalink.clone(),
            edit_url: doc.edit_url.clone(),
            draft: false,
            unlisted: doc.unlisted,
            tags: doc.tags.clone(),
            sidebar_position: doc.sidebar_position,
            sidebar_label: doc.sidebar_label.clone(),
            previous: doc.previous.clone(),
            next: doc.next.clone(),
            toc: parsed.toc,
        };
        Self::new(metadata, parsed.content_title, parsed.content)
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    /// Shared handle to the metadata, for callers that outlive the module borrow.
    pub fn shared_metadata(&self) -> Arc<PageMetadata> {
        Arc::clone(&self.metadata)
    }

    /// Text of the first level-1 heading in the body.
    pub fn content_title(&self) -> Option<&str> {
        self.content_title.as_deref()
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.metadata.toc
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Names of every primitive a render of this page will ask for.
    pub fn required_helpers(&self) -> BTreeSet<&'static str> {
        fn walk(items: &[Content], out: &mut BTreeSet<&'static str>) {
            for item in items {
                if let Content::Element { kind, children } = item {
                    out.insert(kind.primitive());
                    walk(children, out);
                }
            }
        }
        let mut names = BTreeSet::new();
        walk(&self.content, &mut names);
        names
    }

    /// Render the page with `helpers`.
    ///
    /// A single top-level element becomes the root; several are grouped
    /// under a fragment. If `helpers` has a `wrapper` primitive the root is
    /// passed to it as its only child.
    pub fn render(&self, helpers: &HelperSet) -> Result<DisplayTree, RenderError> {
        let tree = DisplayTree::from_children(render_all(&self.content, helpers)?);
        Ok(match helpers.get(context::WRAPPER) {
            Some(wrapper) => DisplayTree::new(
                wrapper.call(Props::new(BTreeMap::new(), vec![tree.into_root().into()])),
            ),
            None => tree,
        })
    }
}

fn render_all(items: &[Content], helpers: &HelperSet) -> Result<Vec<Child>, RenderError> {
    items.iter().map(|item| render_one(item, helpers)).collect()
}

fn render_one(item: &Content, helpers: &HelperSet) -> Result<Child, RenderError> {
    match item {
        Content::Text(text) => Ok(Child::Text(text.clone())),
        Content::Element { kind, children } => {
            let name = kind.primitive();
            let primitive = helpers.get(name).ok_or_else(|| RenderError::MissingHelper {
                name: name.to_string(),
            })?;
            let children = render_all(children, helpers)?;
            Ok(Child::Element(primitive.call(Props::new(kind.attrs(), children))))
        }
    }
}

// ============================================================================
// Markdown → Content
// ============================================================================

struct Parsed {
    content: Vec<Content>,
    content_title: Option<String>,
    first_paragraph: Option<String>,
    toc: Vec<TocEntry>,
}

enum Open {
    Element(ElementKind),
    Heading(u8),
    Image(String),
    /// Container whose children are spliced into the parent.
    Transparent,
}

struct Frame {
    open: Open,
    children: Vec<Content>,
}

impl Frame {
    fn new(open: Open) -> Self {
        Self {
            open,
            children: Vec::new(),
        }
    }
}

fn push_text(children: &mut Vec<Content>, text: &str) {
    if let Some(Content::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(Content::Text(text.to_string()));
    }
}

fn open_for(tag: Tag<'_>) -> Open {
    match tag {
        Tag::Paragraph => Open::Element(ElementKind::Paragraph),
        Tag::Heading { level, .. } => Open::Heading(level as u8),
        Tag::BlockQuote(_) => Open::Element(ElementKind::Quote),
        Tag::CodeBlock(kind) => {
            let language = match kind {
                CodeBlockKind::Fenced(info) => info
                    .split_whitespace()
                    .next()
                    .map(str::to_string),
                CodeBlockKind::Indented => None,
            };
            Open::Element(ElementKind::CodeBlock { language })
        }
        Tag::List(start) => Open::Element(ElementKind::List {
            ordered: start.is_some(),
            start: start.unwrap_or(1),
        }),
        Tag::Item => Open::Element(ElementKind::ListItem),
        Tag::Emphasis => Open::Element(ElementKind::Emphasis),
        Tag::Strong => Open::Element(ElementKind::Strong),
        Tag::Strikethrough => Open::Element(ElementKind::Strikethrough),
        Tag::Link {
            dest_url, title, ..
        } => Open::Element(ElementKind::Link {
            href: dest_url.to_string(),
            title: title.to_string(),
        }),
        Tag::Image { dest_url, .. } => Open::Image(dest_url.to_string()),
        _ => Open::Transparent,
    }
}

fn parse_markdown(body: &str, toc: TocConfig) -> Parsed {
    let mut slugger = Slugger::new();
    let mut parsed = Parsed {
        content: Vec::new(),
        content_title: None,
        first_paragraph: None,
        toc: Vec::new(),
    };
    let mut stack = vec![Frame::new(Open::Transparent)];

    for event in Parser::new_ext(body, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(tag) => stack.push(Frame::new(open_for(tag))),
            Event::End(_) => {
                if stack.len() < 2 {
                    continue;
                }
                let Some(frame) = stack.pop() else { continue };
                let finished = finish(frame, &mut slugger, &mut parsed, toc);
                if let Some(parent) = stack.last_mut() {
                    for item in finished {
                        match item {
                            Content::Text(text) => push_text(&mut parent.children, &text),
                            element => parent.children.push(element),
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    push_text(&mut frame.children, &text);
                }
            }
            Event::Code(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.children.push(Content::element(
                        ElementKind::Code,
                        vec![Content::Text(text.to_string())],
                    ));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(frame) = stack.last_mut() {
                    push_text(&mut frame.children, "\n");
                }
            }
            Event::Rule => {
                if let Some(frame) = stack.last_mut() {
                    frame
                        .children
                        .push(Content::element(ElementKind::Rule, Vec::new()));
                }
            }
            // raw HTML, footnotes, task markers
            _ => {}
        }
    }

    // unbalanced input: fold anything still open into the root
    while stack.len() > 1 {
        let Some(frame) = stack.pop() else { break };
        let finished = finish(frame, &mut slugger, &mut parsed, toc);
        if let Some(parent) = stack.last_mut() {
            parent.children.extend(finished);
        }
    }
    if let Some(root) = stack.pop() {
        parsed.content = root.children;
    }
    parsed
}

fn finish(
    frame: Frame,
    slugger: &mut Slugger,
    parsed: &mut Parsed,
    toc: TocConfig,
) -> Vec<Content> {
    match frame.open {
        Open::Element(kind) => {
            if kind == ElementKind::Paragraph && parsed.first_paragraph.is_none() {
                let text = plain_text(&frame.children);
                let line = text.lines().next().unwrap_or_default().trim();
                if !line.is_empty() {
                    parsed.first_paragraph = Some(line.to_string());
                }
            }
            vec![Content::element(kind, frame.children)]
        }
        Open::Heading(level) => {
            let text = plain_text(&frame.children);
            let value = text.trim().to_string();
            let id = slugger.slug(&value);
            if level == 1 && parsed.content_title.is_none() {
                parsed.content_title = Some(value.clone());
            }
            if (toc.min_level..=toc.max_level).contains(&level) {
                parsed.toc.push(TocEntry {
                    value,
                    id: id.clone(),
                    level,
                });
            }
            vec![Content::element(
                ElementKind::Heading { level, id },
                frame.children,
            )]
        }
        Open::Image(src) => {
            let alt = plain_text(&frame.children);
            vec![Content::element(ElementKind::Image { src, alt }, Vec::new())]
        }
        Open::Transparent => frame.children,
    }
}
