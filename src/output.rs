//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page is shown by
//! its positional index and title first, with the source file and other
//! details as indented context lines, so the output reads as an inventory of
//! the docs while still pointing back at the files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Sidebar
//! 001 Introduction
//!     Source: 01-intro.md
//! 002 guides
//!     001 Getting Started
//!         Source: 02-guides/1-getting-started.md
//!         Tags: setup, quickstart
//!
//! Unlisted
//!     Hidden Page → /docs/hidden-page
//!         Source: hidden-page.md
//!
//! Drafts (skipped)
//!     02-guides/3-roadmap.md
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 Introduction → docs/intro/index.html
//! 002 Getting Started → docs/guides/getting-started/index.html
//! 003 Hidden Page → docs/hidden-page/index.html (unlisted)
//!
//! Generated 3 pages, pages.json
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 Introduction
//!     Route: /docs/intro
//!     2 TOC entries, 17 nodes
//!
//! Checked 3 pages in 3 chunks
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O apart from checking whether `config.toml` exists.

use crate::generate::GenerateReport;
use crate::scan::Manifest;
use crate::site::CheckReport;
use crate::types::{DocSource, SidebarItem};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

fn doc_context_lines(doc: &DocSource, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    lines.push(format!("{}Source: {}", pad, doc.source));
    if let Some(description) = &doc.description {
        let truncated = truncate_desc(description.trim(), 60);
        if !truncated.is_empty() {
            lines.push(format!("{}{}", pad, truncated));
        }
    }
    if !doc.tags.is_empty() {
        lines.push(format!("{}Tags: {}", pad, doc.tags.join(", ")));
    }
}

fn walk_sidebar(
    items: &[SidebarItem],
    manifest: &Manifest,
    depth: usize,
    lines: &mut Vec<String>,
) {
    for (i, item) in items.iter().enumerate() {
        lines.push(format!(
            "{}{} {}",
            indent(depth),
            format_index(i + 1),
            item.label
        ));
        match &item.permalink {
            Some(permalink) => {
                if let Some(doc) = manifest.docs.iter().find(|d| &d.permalink == permalink) {
                    doc_context_lines(doc, depth + 1, lines);
                }
            }
            None => walk_sidebar(&item.children, manifest, depth + 1, lines),
        }
    }
}

/// Format scan stage output showing the discovered docs structure.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Sidebar".to_string()];
    walk_sidebar(&manifest.sidebar, manifest, 0, &mut lines);

    let unlisted: Vec<&DocSource> = manifest.docs.iter().filter(|d| d.unlisted).collect();
    if !unlisted.is_empty() {
        lines.push(String::new());
        lines.push("Unlisted".to_string());
        for doc in unlisted {
            lines.push(format!("    {} \u{2192} {}", doc.title, doc.permalink));
            doc_context_lines(doc, 2, &mut lines);
        }
    }

    if !manifest.skipped_drafts.is_empty() {
        lines.push(String::new());
        lines.push("Drafts (skipped)".to_string());
        for source in &manifest.skipped_drafts {
            lines.push(format!("    {}", source));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    } else {
        lines.push("    (defaults)".to_string());
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, page) in report.pages.iter().enumerate() {
        let marker = if page.unlisted { " (unlisted)" } else { "" };
        lines.push(format!(
            "{} {} \u{2192} {}{}",
            format_index(i + 1),
            page.title,
            page.path,
            marker
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, pages.json",
        plural(report.pages.len(), "page", "pages")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, page) in report.pages.iter().enumerate() {
        let marker = if page.unlisted { " (unlisted)" } else { "" };
        lines.push(format!("{} {}{}", format_index(i + 1), page.title, marker));
        lines.push(format!("    Route: {}", page.permalink));
        lines.push(format!(
            "    {}, {}",
            plural(page.toc_entries, "TOC entry", "TOC entries"),
            plural(page.nodes, "node", "nodes")
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Checked {} in {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.chunks, "chunk", "chunks")
    ));
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
