//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Resolves every route of a [`Site`], renders
//! its content module through the site helper set, and wraps the resulting
//! display tree in the documentation page shell.
//!
//! ## Generated Pages
//!
//! - **Doc pages** (`/{route}/index.html`): sidebar, rendered content, table
//!   of contents, previous/next pagination and an optional edit link
//! - **Page index** (`/pages.json`): metadata of every page plus the sidebar
//!
//! ## Output Structure
//!
//! ```text
//! build/
//! ├── pages.json
//! └── docs/
//!     ├── intro/index.html
//!     ├── guides/
//!     │   ├── getting-started/index.html
//!     │   └── templates-and-repositories/index.html
//!     └── hidden-page/index.html       # unlisted: noindex, not in sidebar
//! ```
//!
//! Pages render in parallel on the rayon pool; each page's module is resolved
//! (and compiled, the first time) by the worker that renders it.
//!
//! ## HTML Generation
//!
//! The page shell uses [maud](https://maud.lambda.xyz/). Page content is a
//! [`DisplayTree`], which implements `maud::Render`, so it is embedded and
//! escaped like any other template value.

use crate::config;
use crate::content::ContentModule;
use crate::site::{Route, Site, SiteError, with_site_helpers};
use crate::tree::DisplayTree;
use crate::types::{PageMetadata, SidebarItem, TocEntry};
use maud::{DOCTYPE, Markup, html};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Site(#[from] SiteError),
    #[error("Refusing to write {0} outside the output directory")]
    UnsafePath(String),
}

/// One written page.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub permalink: String,
    /// Output file, relative to the output directory.
    pub path: String,
    pub title: String,
    pub bytes: usize,
    pub unlisted: bool,
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub pages: Vec<GeneratedPage>,
}

#[derive(Serialize)]
struct PagesIndex<'a> {
    title: &'a str,
    sidebar: &'a [SidebarItem],
    pages: Vec<&'a PageMetadata>,
}

const CSS_STATIC: &str = include_str!("../static/style.css");

pub fn generate(site: &Site, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let config = site.config();
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;
    info!(output = %output_dir.display(), pages = site.routes().len(), "generating site");

    let rendered = with_site_helpers(config, |helpers| {
        site.routes()
            .par_iter()
            .map(|route| -> Result<(GeneratedPage, Arc<PageMetadata>), GenerateError> {
                let module = site.resolve(&route.module)?;
                let tree = module.render(helpers).map_err(|source| SiteError::Render {
                    permalink: route.permalink.clone(),
                    source,
                })?;
                let markup = render_doc_page(site, &module, &tree, &css);
                let page = write_page(output_dir, site, route, &module, markup)?;
                Ok((page, module.shared_metadata()))
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let (pages, metadata): (Vec<_>, Vec<_>) = rendered.into_iter().unzip();
    let index = PagesIndex {
        title: &config.title,
        sidebar: site.sidebar(),
        pages: metadata.iter().map(Arc::as_ref).collect(),
    };
    fs::write(
        output_dir.join("pages.json"),
        serde_json::to_string_pretty(&index)?,
    )?;

    Ok(GenerateReport {
        output_dir: output_dir.to_path_buf(),
        pages,
    })
}

/// Output path of a permalink, relative to the output directory.
///
/// `/docs/guides/setup` → `docs/guides/setup/index.html`; the site's
/// `base_url` is not part of the output tree.
///
/// `None` unless every segment is a plain name.
pub fn output_path(permalink: &str, base_url: &str) -> Option<String> {
    let rel = permalink
        .strip_prefix(base_url.trim_end_matches('/'))
        .unwrap_or(permalink)
        .trim_matches('/');
    if rel.is_empty() {
        return Some("index.html".to_string());
    }
    let plain = rel
        .split('/')
        .all(|segment| !matches!(segment, "" | "." | "..") && !segment.contains('\\'));
    plain.then(|| format!("{}/index.html", rel))
}

fn write_page(
    output_dir: &Path,
    site: &Site,
    route: &Route,
    module: &ContentModule,
    markup: Markup,
) -> Result<GeneratedPage, GenerateError> {
    let rel = output_path(&route.permalink, &site.config().base_url)
        .ok_or_else(|| GenerateError::UnsafePath(route.permalink.clone()))?;
    let path = output_dir.join(&rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let html = markup.into_string();
    fs::write(&path, &html)?;
    debug!(path = %rel, "wrote page");

    Ok(GeneratedPage {
        permalink: route.permalink.clone(),
        path: rel,
        title: module.metadata().title.clone(),
        bytes: html.len(),
        unlisted: route.unlisted,
    })
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, description: &str, noindex: bool, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                @if noindex {
                    meta name="robots" content="noindex, nofollow";
                }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the sidebar tree, marking the current page and opening its category
pub fn render_sidebar(items: &[SidebarItem], current: &str) -> Markup {
    html! {
        ul.sidebar-list {
            @for item in items {
                (render_sidebar_item(item, current))
            }
        }
    }
}

fn render_sidebar_item(item: &SidebarItem, current: &str) -> Markup {
    html! {
        @match &item.permalink {
            Some(permalink) => {
                @let is_current = permalink == current;
                li class=[is_current.then_some("current")] {
                    a href=(permalink) aria-current=[is_current.then_some("page")] { (item.label) }
                }
            }
            None => {
                @let contains_current = item.permalinks().contains(&current);
                li.sidebar-category {
                    details open[contains_current] {
                        summary { (item.label) }
                        (render_sidebar(&item.children, current))
                    }
                }
            }
        }
    }
}

/// Renders the "On this page" list
pub fn render_toc(entries: &[TocEntry]) -> Markup {
    html! {
        @if !entries.is_empty() {
            nav.toc {
                p.toc-title { "On this page" }
                ul {
                    @for entry in entries {
                        li class={ "toc-level-" (entry.level) } {
                            a href={ "#" (entry.id) } { (entry.value) }
                        }
                    }
                }
            }
        }
    }
}

/// Renders previous/next links
pub fn render_pagination(metadata: &PageMetadata) -> Markup {
    html! {
        @if metadata.previous.is_some() || metadata.next.is_some() {
            nav.pagination {
                @if let Some(previous) = &metadata.previous {
                    a.pagination-prev href=(previous.permalink) {
                        span.pagination-label { "Previous" }
                        span.pagination-title { (previous.title) }
                    }
                }
                @if let Some(next) = &metadata.next {
                    a.pagination-next href=(next.permalink) {
                        span.pagination-label { "Next" }
                        span.pagination-title { (next.title) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderer
// ============================================================================

fn render_doc_page(site: &Site, module: &ContentModule, tree: &DisplayTree, css: &str) -> Markup {
    let config = site.config();
    let metadata = module.metadata();
    let page_title = format!("{} | {}", metadata.title, config.title);
    let home = site
        .routes()
        .first()
        .map(|route| route.permalink.as_str())
        .unwrap_or(config.base_url.as_str());

    let content = html! {
        header.site-header {
            a.site-title href=(home) { (config.title) }
        }
        div.layout {
            nav.sidebar aria-label="Docs sidebar" {
                (render_sidebar(site.sidebar(), &metadata.permalink))
            }
            main.doc {
                article.doc-content {
                    (tree)
                }
                @if !metadata.tags.is_empty() {
                    ul.tags {
                        @for tag in &metadata.tags {
                            li.tag { (tag) }
                        }
                    }
                }
                @if let Some(edit_url) = &metadata.edit_url {
                    a.edit-link href=(edit_url) target="_blank" rel="noopener" { "Edit this page" }
                }
                (render_pagination(metadata))
            }
            aside.doc-toc {
                (render_toc(module.toc()))
            }
        }
    };

    base_document(&page_title, &metadata.description, metadata.unlisted, css, content)
}
