//! # chunkdoc
//!
//! A documentation-site builder whose pages are lazily compiled modules.
//! Your docs directory is the data source: Markdown files become pages,
//! directories become sidebar categories, and numeric prefixes set the order.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan      docs/     →  Manifest   (filesystem → page sources, sidebar, prev/next)
//! 2. Register  Manifest  →  Site       (one lazy chunk per page in a ChunkRegistry)
//! 3. Generate  Site      →  build/     (resolve + render every page → HTML)
//! ```
//!
//! Underneath the pipeline sits a small page runtime:
//!
//! - A [`registry::ChunkRegistry`] maps module identifiers to factories.
//!   Pages are registered in batches ([`registry::Chunk`]) and compiled only
//!   when first resolved; the result is memoized and shared.
//! - A compiled page is a [`content::ContentModule`]: immutable metadata plus
//!   structured content, with a `render(helpers)` operation.
//! - Rendering primitives come from a [`context::HelperSet`] passed in
//!   explicitly, usually via a [`context::ContextStack`] of override scopes.
//! - The result is a [`tree::DisplayTree`], which drops straight into a
//!   maud template.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`registry`] | Chunk registry: deferred registration, memoized single-flight resolution |
//! | [`content`] | Content modules: Markdown compilation, metadata, `render(helpers)` |
//! | [`context`] | Helper sets, default HTML primitives, the context stack |
//! | [`tree`] | Display tree nodes and their HTML rendering |
//! | [`scan`] | Stage 1: walks the docs directory, front matter, sidebar, prev/next |
//! | [`site`] | Stage 2: registers one chunk per page, route lookup, `check` |
//! | [`generate`] | Stage 3: parallel rendering into the page shell, `pages.json` |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared page types (`DocSource`, `PageMetadata`, `SidebarItem`) |
//! | [`naming`] | `NN-name` filename convention parser |
//! | [`slug`] | Heading anchor ids with per-page de-duplication |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## Explicit Helper Context
//!
//! Content modules never import rendering primitives. The caller hands them a
//! helper set, and nested overrides are an explicit stack owned by the caller
//! rather than ambient state. The same compiled page renders to HTML in a
//! build and to plain tagged nodes in a test.
//!
//! ## Lazy, Memoized Pages
//!
//! Registering a page costs a hash and a closure. Parsing happens on first
//! resolution, at most once per page even when several render workers ask
//! for it at the same time.
//!
//! ## Maud Over Template Engines
//!
//! The page shell is generated with [Maud](https://maud.lambda.xyz/).
//! Malformed templates are a build error and every interpolated value,
//! including display-tree text and attributes, is escaped.

pub mod config;
pub mod content;
pub mod context;
pub mod generate;
pub mod naming;
pub mod output;
pub mod registry;
pub mod scan;
pub mod site;
pub mod slug;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
