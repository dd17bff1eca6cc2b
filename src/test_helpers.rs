//! Shared test utilities for the chunkdoc test suite.
//!
//! Provides fixture setup, lookup helpers, and sidebar assertions that work
//! with scan-phase data structures (`Manifest`, `DocSource`, `SidebarItem`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let doc = find_doc(&manifest, "guides/getting-started");
//! assert_eq!(doc.permalink, "/docs/guides/getting-started");
//!
//! assert_sidebar_shape(&manifest, &[
//!     ("Introduction", &[]),
//!     ("guides", &["Getting Started", "Templates & Repositories"]),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::scan::Manifest;
use crate::types::DocSource;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/docs/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/docs");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// A minimal top-level doc with the given id, title and Markdown body.
pub fn doc_source(id: &str, title: &str, body: &str) -> DocSource {
    DocSource {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        source: format!("{id}.md"),
        source_dir_name: ".".to_string(),
        slug: format!("/{id}"),
        permalink: format!("/docs/{id}"),
        edit_url: None,
        unlisted: false,
        tags: Vec::new(),
        sidebar_position: None,
        sidebar_label: title.to_string(),
        previous: None,
        next: None,
        body: body.to_string(),
    }
}

// =========================================================================
// Manifest lookups (panic with a clear message on miss)
// =========================================================================

/// Find a doc by id. Panics if not found.
pub fn find_doc<'a>(manifest: &'a Manifest, id: &str) -> &'a DocSource {
    manifest
        .docs
        .iter()
        .find(|d| d.id == id)
        .unwrap_or_else(|| {
            let ids = doc_ids(manifest);
            panic!("doc '{id}' not found. Available: {ids:?}")
        })
}

/// All doc ids in manifest order.
pub fn doc_ids(manifest: &Manifest) -> Vec<&str> {
    manifest.docs.iter().map(|d| d.id.as_str()).collect()
}

// =========================================================================
// Sidebar helpers
// =========================================================================

/// Top-level sidebar labels in order.
pub fn sidebar_labels(manifest: &Manifest) -> Vec<&str> {
    manifest
        .sidebar
        .iter()
        .map(|item| item.label.as_str())
        .collect()
}

/// Child labels under a given sidebar category. Panics if not found.
pub fn sidebar_children_labels<'a>(manifest: &'a Manifest, parent: &str) -> Vec<&'a str> {
    manifest
        .sidebar
        .iter()
        .find(|item| item.label == parent)
        .map(|item| item.children.iter().map(|c| c.label.as_str()).collect())
        .unwrap_or_else(|| {
            let labels = sidebar_labels(manifest);
            panic!("sidebar item '{parent}' not found. Available: {labels:?}")
        })
}

/// Assert that the sidebar matches an expected shape.
///
/// Each entry is `(label, children)`. Use `&[]` for pages.
pub fn assert_sidebar_shape(manifest: &Manifest, expected: &[(&str, &[&str])]) {
    let expected_labels: Vec<&str> = expected.iter().map(|(label, _)| *label).collect();
    assert_eq!(
        sidebar_labels(manifest),
        expected_labels,
        "sidebar top-level labels mismatch"
    );

    for (label, children) in expected {
        assert_eq!(
            sidebar_children_labels(manifest, label),
            children.to_vec(),
            "sidebar children of '{label}' mismatch"
        );
    }
}
