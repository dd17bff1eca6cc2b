//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Walks the docs directory to discover pages,
//! works out every page's id, slug and permalink, and arranges the sidebar
//! and the previous/next chain. Page bodies are not parsed here; that happens
//! lazily when a page's module is resolved.
//!
//! ## Directory Structure
//!
//! ```text
//! docs/                                 # Docs root
//! ├── config.toml                       # Site configuration (optional)
//! ├── 01-intro.md                       # /docs/intro, sidebar position 1
//! ├── 02-guides/                        # Sidebar category "guides"
//! │   ├── 1-getting-started.md          # /docs/guides/getting-started
//! │   ├── 2-templates-and-repositories.md
//! │   └── 3-roadmap.md                  # draft = true → skipped
//! ├── hidden-page.md                    # unlisted = true → built, not linked
//! └── _partials/                        # "_" and "." prefixes are ignored
//! ```
//!
//! ## Naming Conventions
//!
//! - **Numbered entries** (`NN-name`): the number is the sidebar position and
//!   is stripped from ids and slugs
//! - **Unnumbered entries**: sorted after numbered ones, by name
//! - **`index.md` / `README.md`**: slug of the containing directory
//!
//! ## Front Matter
//!
//! An optional TOML block between `+++` lines at the top of the file. See
//! [`FrontMatter`] for the keys. Unknown keys are an error.
//!
//! ## Validation
//!
//! - Front matter must be terminated and parse as TOML
//! - No two pages may share a permalink

use crate::config::{self, SiteConfig};
use crate::naming::{parse_entry_name, strip_number_prefixes};
use crate::types::{DocSource, FrontMatter, NavLink, SidebarItem};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Front matter is not closed with '+++' in {0}")]
    UnterminatedFrontMatter(PathBuf),
    #[error("Invalid slug '{slug}' in {path}: '.' and '..' segments are not allowed")]
    InvalidSlug { path: String, slug: String },
    #[error("Duplicate permalink {permalink}: {first} and {second}")]
    DuplicatePermalink {
        permalink: String,
        first: String,
        second: String,
    },
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// Listed pages in sidebar order, then unlisted pages.
    pub docs: Vec<DocSource>,
    pub sidebar: Vec<SidebarItem>,
    pub config: SiteConfig,
    /// Source paths of draft pages that were left out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_drafts: Vec<String>,
}

const DOC_EXTENSIONS: &[&str] = &["md", "mdx"];
const FRONT_MATTER_FENCE: &str = "+++";

/// A doc found on disk, with the raw path segments needed for ordering.
struct Found {
    doc: DocSource,
    /// Directory names from the root down, prefixes intact.
    dirs: Vec<String>,
    file_name: String,
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    info!(root = %root.display(), "scanning docs");
    let config = config::load_config(root)?;

    let mut found = Vec::new();
    let mut skipped_drafts = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_doc(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let source = segments.join("/");

        let content = fs::read_to_string(entry.path())?;
        let (front_matter, body) = split_front_matter(&content, entry.path())?;
        let front_matter: FrontMatter = match front_matter {
            Some(raw) => toml::from_str(raw).map_err(|source| ScanError::FrontMatter {
                path: entry.path().to_path_buf(),
                source,
            })?,
            None => FrontMatter::default(),
        };

        if front_matter.draft {
            warn!(%source, "skipping draft");
            skipped_drafts.push(source);
            continue;
        }

        let (dirs, file_name) = match segments.split_last() {
            Some((file, dirs)) => (dirs.to_vec(), file.clone()),
            None => continue,
        };
        let doc = build_doc(&config, &source, &dirs, &file_name, front_matter, body)?;
        debug!(id = %doc.id, permalink = %doc.permalink, "found doc");
        found.push(Found {
            doc,
            dirs,
            file_name,
        });
    }

    check_permalinks(&found)?;

    let mut tree = DirNode::default();
    for (index, item) in found.iter().enumerate() {
        tree.insert(&item.dirs, index);
    }
    let mut order = Vec::new();
    let sidebar = tree.sidebar(&found, &mut order);

    let docs = arrange(found, &order);
    info!(
        docs = docs.len(),
        drafts = skipped_drafts.len(),
        "scan complete"
    );

    Ok(Manifest {
        docs,
        sidebar,
        config,
        skipped_drafts,
    })
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0 && (name.starts_with('.') || name.starts_with('_'))
}

fn is_doc(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            DOC_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Split a `+++` front matter block off the top of `content`.
///
/// Returns `(None, content)` when the file doesn't open with a fence.
pub fn split_front_matter<'a>(
    content: &'a str,
    path: &Path,
) -> Result<(Option<&'a str>, &'a str), ScanError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let opens = lines
        .next()
        .map(|first| first.trim_end() == FRONT_MATTER_FENCE && first.ends_with('\n'))
        .unwrap_or(false);
    if !opens {
        return Ok((None, content));
    }

    let start = content.find('\n').map(|i| i + 1).unwrap_or(content.len());
    let mut offset = start;
    for line in lines {
        if line.trim_end() == FRONT_MATTER_FENCE {
            let front_matter = &content[start..offset];
            let body = &content[offset + line.len()..];
            return Ok((Some(front_matter), body));
        }
        offset += line.len();
    }
    Err(ScanError::UnterminatedFrontMatter(path.to_path_buf()))
}

/// Title from the first `# ` line outside fenced code blocks.
fn first_heading(body: &str) -> Option<String> {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            if let Some(title) = trimmed.strip_prefix("# ") {
                let title = title.trim().trim_end_matches('#').trim();
                if !title.is_empty() {
                    return Some(title.to_string());
                }
            }
        }
    }
    None
}

fn build_doc(
    config: &SiteConfig,
    source: &str,
    dirs: &[String],
    file_name: &str,
    front_matter: FrontMatter,
    body: &str,
) -> Result<DocSource, ScanError> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_entry_name(&stem);
    let stem_name = if parsed.name.is_empty() {
        stem.clone()
    } else {
        parsed.name.clone()
    };
    let dir_path = strip_number_prefixes(&dirs.join("/"));

    let base_id = front_matter.id.clone().unwrap_or_else(|| stem_name.clone());
    let id = join_path(&dir_path, &base_id);

    let is_index = ["index", "readme"].contains(&stem_name.to_lowercase().as_str());
    let raw_slug = match &front_matter.slug {
        Some(slug) if slug.starts_with('/') => slug.clone(),
        Some(slug) => join_path(&dir_path, slug),
        None if is_index && front_matter.id.is_none() => dir_path.clone(),
        None => id.clone(),
    };
    let slug = normalize_slug(&raw_slug).ok_or_else(|| ScanError::InvalidSlug {
        path: source.to_string(),
        slug: raw_slug.clone(),
    })?;
    let permalink = {
        let joined = format!("{}{}", config.route_prefix(), slug);
        if joined.is_empty() { "/".to_string() } else { joined }
    };

    let title = front_matter
        .title
        .clone()
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| {
            if parsed.display_title.is_empty() {
                stem.clone()
            } else {
                parsed.display_title.clone()
            }
        });
    let sidebar_label = front_matter
        .sidebar_label
        .clone()
        .unwrap_or_else(|| title.clone());

    let source_dir_name = if dirs.is_empty() {
        ".".to_string()
    } else {
        dirs.join("/")
    };
    let edit_url = config
        .edit_url
        .as_ref()
        .map(|base| format!("{}/{}", base.trim_end_matches('/'), source));

    Ok(DocSource {
        id,
        title,
        description: front_matter.description,
        source: source.to_string(),
        source_dir_name,
        slug,
        permalink,
        edit_url,
        unlisted: front_matter.unlisted,
        tags: front_matter.tags,
        sidebar_position: front_matter.sidebar_position.or(parsed.number),
        sidebar_label,
        previous: None,
        next: None,
        body: body.to_string(),
    })
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Leading slash, no trailing slash, no empty segments. The root slug is `/`.
///
/// `None` if any segment is `.` or `..`.
fn normalize_slug(slug: &str) -> Option<String> {
    let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return None;
    }
    Some(format!("/{}", segments.join("/")))
}

fn check_permalinks(found: &[Found]) -> Result<(), ScanError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for item in found {
        if let Some(first) = seen.insert(&item.doc.permalink, &item.doc.source) {
            return Err(ScanError::DuplicatePermalink {
                permalink: item.doc.permalink.clone(),
                first: first.to_string(),
                second: item.doc.source.clone(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Sidebar and ordering
// =============================================================================

#[derive(Default)]
struct DirNode {
    docs: Vec<usize>,
    dirs: BTreeMap<String, DirNode>,
}

enum Entry<'a> {
    Doc(usize),
    Dir(&'a str, &'a DirNode),
}

impl DirNode {
    fn insert(&mut self, dirs: &[String], index: usize) {
        match dirs.split_first() {
            Some((first, rest)) => self.dirs.entry(first.clone()).or_default().insert(rest, index),
            None => self.docs.push(index),
        }
    }

    /// Build sidebar items for this directory, recording listed docs in
    /// sidebar order.
    fn sidebar(&self, found: &[Found], order: &mut Vec<usize>) -> Vec<SidebarItem> {
        let mut entries: Vec<((u32, String), Entry<'_>)> = Vec::new();
        for &index in &self.docs {
            let item = &found[index];
            let key = (
                item.doc.sidebar_position.unwrap_or(u32::MAX),
                item.file_name.clone(),
            );
            entries.push((key, Entry::Doc(index)));
        }
        for (name, node) in &self.dirs {
            let key = (parse_entry_name(name).number.unwrap_or(u32::MAX), name.clone());
            entries.push((key, Entry::Dir(name, node)));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut items = Vec::new();
        for (_, entry) in entries {
            match entry {
                Entry::Doc(index) => {
                    let doc = &found[index].doc;
                    if doc.unlisted {
                        continue;
                    }
                    order.push(index);
                    items.push(SidebarItem {
                        label: doc.sidebar_label.clone(),
                        permalink: Some(doc.permalink.clone()),
                        children: Vec::new(),
                    });
                }
                Entry::Dir(name, node) => {
                    let children = node.sidebar(found, order);
                    if children.is_empty() {
                        continue;
                    }
                    let parsed = parse_entry_name(name);
                    let label = if parsed.display_title.is_empty() {
                        name.to_string()
                    } else {
                        parsed.display_title
                    };
                    items.push(SidebarItem {
                        label,
                        permalink: None,
                        children,
                    });
                }
            }
        }
        items
    }
}

/// Put listed docs in sidebar order with prev/next links, unlisted docs last.
fn arrange(found: Vec<Found>, order: &[usize]) -> Vec<DocSource> {
    let links: Vec<NavLink> = order
        .iter()
        .map(|&index| NavLink {
            title: found[index].doc.sidebar_label.clone(),
            permalink: found[index].doc.permalink.clone(),
        })
        .collect();

    let mut slots: Vec<Option<DocSource>> = found.into_iter().map(|f| Some(f.doc)).collect();
    let mut docs = Vec::with_capacity(slots.len());
    for (position, &index) in order.iter().enumerate() {
        if let Some(mut doc) = slots[index].take() {
            doc.previous = position.checked_sub(1).map(|p| links[p].clone());
            doc.next = links.get(position + 1).cloned();
            docs.push(doc);
        }
    }
    docs.extend(slots.into_iter().flatten());
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    // =========================================================================
    // Fixture scans
    // =========================================================================

    #[test]
    fn scan_finds_listed_and_unlisted_docs() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(
            doc_ids(&manifest),
            vec![
                "intro",
                "guides/getting-started",
                "guides/templates-and-repositories",
                "hidden-page"
            ]
        );
    }

    #[test]
    fn sidebar_follows_number_prefixes() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert_sidebar_shape(
            &manifest,
            &[
                ("Introduction", &[]),
                ("guides", &["Getting Started", "Templates & Repositories"]),
            ],
        );
    }

    #[test]
    fn drafts_are_skipped_and_recorded() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.skipped_drafts, vec!["02-guides/3-roadmap.md"]);
        assert!(manifest.docs.iter().all(|d| !d.id.contains("roadmap")));
    }

    #[test]
    fn unlisted_docs_have_no_neighbours() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let hidden = find_doc(&manifest, "hidden-page");
        assert!(hidden.unlisted);
        assert!(hidden.previous.is_none());
        assert!(hidden.next.is_none());
        assert_eq!(hidden.permalink, "/docs/hidden-page");
    }

    #[test]
    fn previous_next_chain() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let intro = find_doc(&manifest, "intro");
        assert!(intro.previous.is_none());
        assert_eq!(
            intro.next.as_ref().map(|l| l.permalink.as_str()),
            Some("/docs/guides/getting-started")
        );

        let last = find_doc(&manifest, "guides/templates-and-repositories");
        assert_eq!(
            last.previous.as_ref().map(|l| l.title.as_str()),
            Some("Getting Started")
        );
        assert!(last.next.is_none());
    }

    #[test]
    fn underscore_directories_are_ignored() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.docs.iter().all(|d| !d.source.starts_with('_')));
    }

    #[test]
    fn config_loaded_from_fixtures() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.config.title, "Spring Data MongoDB");
        let intro = find_doc(&manifest, "intro");
        assert_eq!(
            intro.edit_url.as_deref(),
            Some("https://github.com/example/docs/edit/main/docs/01-intro.md")
        );
    }

    #[test]
    fn front_matter_fields_flow_into_doc() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let doc = find_doc(&manifest, "guides/getting-started");
        assert_eq!(doc.tags, vec!["setup", "quickstart"]);
        assert_eq!(doc.source_dir_name, "02-guides");
        assert_eq!(doc.sidebar_position, Some(1));
        assert!(!doc.body.contains("+++"));
    }

    // =========================================================================
    // Ids, slugs and titles
    // =========================================================================

    #[test]
    fn title_falls_back_to_file_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "3-faq-and-tips.md", "No heading here.\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.docs[0].title, "faq and tips");
        assert_eq!(manifest.docs[0].id, "faq-and-tips");
    }

    #[test]
    fn title_ignores_comments_in_code_blocks() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "setup.md",
            "```sh\n# install\n```\n\n# Setup Guide\n",
        );
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.docs[0].title, "Setup Guide");
    }

    #[test]
    fn front_matter_slug_absolute_and_relative() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a/one.md", "+++\nslug = \"/custom/place\"\n+++\n# One\n");
        write(tmp.path(), "a/two.md", "+++\nslug = \"second\"\n+++\n# Two\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(find_doc(&manifest, "a/one").permalink, "/docs/custom/place");
        assert_eq!(find_doc(&manifest, "a/two").permalink, "/docs/a/second");
    }

    #[test]
    fn front_matter_id_replaces_file_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "01-sub/2-File.mdx", "+++\nid = \"custom\"\n+++\n# File\n");
        let manifest = scan(tmp.path()).unwrap();
        let doc = find_doc(&manifest, "sub/custom");
        assert_eq!(doc.slug, "/sub/custom");
    }

    #[test]
    fn index_page_takes_directory_slug() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "index.md", "# Home\n");
        write(tmp.path(), "02-guides/index.md", "# Guides\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(find_doc(&manifest, "index").permalink, "/docs/");
        assert_eq!(find_doc(&manifest, "guides/index").permalink, "/docs/guides");
    }

    #[test]
    fn sidebar_position_overrides_prefix() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "1-first.md", "# First\n");
        write(tmp.path(), "2-second.md", "+++\nsidebar_position = 0\n+++\n# Second\n");
        write(tmp.path(), "unnumbered.md", "# Unnumbered\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(sidebar_labels(&manifest), vec!["Second", "First", "Unnumbered"]);
    }

    #[test]
    fn sidebar_label_overrides_title() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "+++\nsidebar_label = \"Short\"\n+++\n# A Long Title\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.docs[0].title, "A Long Title");
        assert_eq!(sidebar_labels(&manifest), vec!["Short"]);
    }

    #[test]
    fn category_with_only_unlisted_docs_is_omitted() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "# A\n");
        write(tmp.path(), "secret/b.md", "+++\nunlisted = true\n+++\n# B\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(sidebar_labels(&manifest), vec!["A"]);
        assert_eq!(manifest.docs.len(), 2);
    }

    #[test]
    fn non_doc_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "# A\n");
        write(tmp.path(), "notes.txt", "not a doc");
        write(tmp.path(), ".hidden.md", "# Hidden\n");
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(doc_ids(&manifest), vec!["a"]);
    }

    #[test]
    fn empty_root_has_no_docs() {
        let tmp = TempDir::new().unwrap();
        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.docs.is_empty());
        assert!(manifest.sidebar.is_empty());
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn unterminated_front_matter_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "+++\ntitle = \"A\"\n# A\n");
        assert!(matches!(
            scan(tmp.path()),
            Err(ScanError::UnterminatedFrontMatter(_))
        ));
    }

    #[test]
    fn unknown_front_matter_key_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "+++\ntitel = \"A\"\n+++\n");
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::FrontMatter { .. }));
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn duplicate_permalink_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "1-setup.md", "# Setup\n");
        write(tmp.path(), "2-setup.mdx", "# Setup again\n");
        match scan(tmp.path()) {
            Err(ScanError::DuplicatePermalink {
                permalink,
                first,
                second,
            }) => {
                assert_eq!(permalink, "/docs/setup");
                assert_eq!(first, "1-setup.md");
                assert_eq!(second, "2-setup.mdx");
            }
            other => panic!("expected duplicate permalink, got {other:?}"),
        }
    }

    #[test]
    fn parent_segment_in_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "+++\nslug = \"/../../escaped\"\n+++\n# A\n");
        match scan(tmp.path()) {
            Err(ScanError::InvalidSlug { path, slug }) => {
                assert_eq!(path, "a.md");
                assert_eq!(slug, "/../../escaped");
            }
            other => panic!("expected invalid slug, got {other:?}"),
        }
    }

    #[test]
    fn dot_segment_in_relative_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "guides/a.md", "+++\nslug = \"./a\"\n+++\n");
        assert!(matches!(
            scan(tmp.path()),
            Err(ScanError::InvalidSlug { .. })
        ));
    }

    #[test]
    fn parent_segment_in_id_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "+++\nid = \"../outside\"\n+++\n");
        assert!(matches!(
            scan(tmp.path()),
            Err(ScanError::InvalidSlug { .. })
        ));
    }

    // =========================================================================
    // Front matter splitting
    // =========================================================================

    #[test]
    fn split_without_front_matter() {
        let (fm, body) = split_front_matter("# Title\n", Path::new("a.md")).unwrap();
        assert!(fm.is_none());
        assert_eq!(body, "# Title\n");
    }

    #[test]
    fn split_with_front_matter() {
        let (fm, body) =
            split_front_matter("+++\ntitle = \"A\"\n+++\n# Body\n", Path::new("a.md")).unwrap();
        assert_eq!(fm, Some("title = \"A\"\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn split_handles_crlf_and_bom() {
        let (fm, body) =
            split_front_matter("\u{feff}+++\r\ndraft = false\r\n+++\r\nText", Path::new("a.md"))
                .unwrap();
        assert_eq!(fm, Some("draft = false\r\n"));
        assert_eq!(body, "Text");
    }
}
