//! Shared types used across pipeline stages.
//!
//! These types are produced by scan, carried through the registry into
//! content modules, and serialized into `pages.json` by generate.

use serde::{Deserialize, Serialize};

/// Front matter of a doc page, parsed from a TOML block between `+++` lines.
///
/// ```text
/// +++
/// title = "Getting Started"
/// sidebar_position = 1
/// tags = ["setup"]
/// +++
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub sidebar_position: Option<u32>,
    pub sidebar_label: Option<String>,
    pub draft: bool,
    pub unlisted: bool,
    pub tags: Vec<String>,
}

/// Link to a neighbouring page in the prev/next chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// One entry of a page's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text.
    pub value: String,
    /// Anchor id of the heading.
    pub id: String,
    pub level: u8,
}

/// Everything known about a page apart from its body.
///
/// Built once, when the page's module is first resolved, and shared read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Doc id: source path without extension and number prefixes (`guides/getting-started`).
    pub id: String,
    pub title: String,
    pub description: String,
    /// Source path relative to the docs root (`02-guides/1-getting-started.md`).
    pub source: String,
    /// Directory part of `source`, `"."` for top-level pages.
    pub source_dir_name: String,
    /// `/`-prefixed slug below the route prefix.
    pub slug: String,
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    pub draft: bool,
    pub unlisted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<u32>,
    pub sidebar_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toc: Vec<TocEntry>,
}

/// Sidebar tree item. Categories have children and no permalink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SidebarItem>,
}

impl SidebarItem {
    /// Permalinks of all pages below (and including) this item, in order.
    pub fn permalinks(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_permalinks(&mut out);
        out
    }

    fn collect_permalinks<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(permalink) = &self.permalink {
            out.push(permalink);
        }
        for child in &self.children {
            child.collect_permalinks(out);
        }
    }
}

/// A page as found on disk, before its body is compiled.
///
/// Scan fills everything it can work out from the path, the front matter and
/// the page's neighbours; the body stays raw Markdown until the page's module
/// is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSource {
    pub id: String,
    pub title: String,
    /// Description from front matter; compile falls back to the first paragraph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: String,
    pub source_dir_name: String,
    pub slug: String,
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    pub unlisted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<u32>,
    pub sidebar_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
    /// Markdown body with the front matter removed.
    #[serde(skip)]
    pub body: String,
}
