//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` file that lives
//! in the docs root. Stock defaults are the base layer; the user file only
//! needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Documentation"
//! base_url = "/"              # Site prefix, must start and end with "/"
//! route_base_path = "docs"    # Path segment in front of every page slug
//! # edit_url = "https://github.com/org/repo/edit/main/docs"
//!
//! [toc]
//! min_level = 2               # Smallest heading level listed in the TOC
//! max_level = 3               # Largest heading level listed in the TOC
//!
//! [primitives]
//! # Replace the element a rendering primitive emits.
//! # code_block = "div"
//! # heading = "h{level}"
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#1c1e21"
//! text_muted = "#606770"      # Sidebar, TOC, pagination labels
//! border = "#dadde1"
//! link = "#2e8555"
//! link_hover = "#29784c"
//! code_background = "#f6f7f8"
//!
//! [colors.dark]
//! background = "#1b1b1d"
//! text = "#e3e3e3"
//! text_muted = "#a0a0a0"
//! border = "#444950"
//! link = "#25c2a0"
//! link_hover = "#4fddbf"
//! code_background = "#2b2b2b"
//!
//! [processing]
//! max_processes = 4           # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::context::{WRAPPER, default_helpers};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title shown in the header and the `<title>` suffix.
    pub title: String,
    /// URL prefix of the whole site.
    pub base_url: String,
    /// Path segment placed between `base_url` and each page slug.
    pub route_base_path: String,
    /// Prefix for "Edit this page" links; the page's source path is appended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Heading levels collected into each page's table of contents.
    pub toc: TocConfig,
    /// Primitive name → replacement element tag.
    pub primitives: BTreeMap<String, String>,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            base_url: "/".to_string(),
            route_base_path: "docs".to_string(),
            edit_url: None,
            toc: TocConfig::default(),
            primitives: BTreeMap::new(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with('/') || !self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must start and end with '/'".into(),
            ));
        }
        if self.route_base_path.starts_with('/') || self.route_base_path.ends_with('/') {
            return Err(ConfigError::Validation(
                "route_base_path must not start or end with '/'".into(),
            ));
        }
        if !self.route_base_path.is_empty()
            && self
                .route_base_path
                .split('/')
                .any(|segment| matches!(segment, "" | "." | ".."))
        {
            return Err(ConfigError::Validation(format!(
                "route_base_path {:?} has an empty, '.' or '..' segment",
                self.route_base_path
            )));
        }
        if let Some(edit_url) = &self.edit_url {
            if !edit_url.starts_with("https://") && !edit_url.starts_with("http://") {
                return Err(ConfigError::Validation(format!(
                    "edit_url must be an http(s) URL, got {edit_url:?}"
                )));
            }
        }
        if !(1..=6).contains(&self.toc.min_level) || !(1..=6).contains(&self.toc.max_level) {
            return Err(ConfigError::Validation(
                "toc levels must be 1-6".into(),
            ));
        }
        if self.toc.min_level > self.toc.max_level {
            return Err(ConfigError::Validation(
                "toc.min_level must not exceed toc.max_level".into(),
            ));
        }
        let known = default_helpers();
        for (name, tag) in &self.primitives {
            if name == WRAPPER || !known.contains(name) {
                return Err(ConfigError::Validation(format!(
                    "primitives.{name}: unknown primitive"
                )));
            }
            if !is_valid_tag(tag) {
                return Err(ConfigError::Validation(format!(
                    "primitives.{name}: invalid element tag {tag:?}"
                )));
            }
        }
        Ok(())
    }

    /// Route prefix for every page: `base_url` + `route_base_path`, no trailing slash.
    ///
    /// `"/"` + `"docs"` → `"/docs"`; `"/"` + `""` → `""`.
    pub fn route_prefix(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.route_base_path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, self.route_base_path)
        }
    }
}

/// Element tags may contain a `{level}` placeholder, otherwise letters,
/// digits and dashes only.
fn is_valid_tag(tag: &str) -> bool {
    let bare = tag.replace("{level}", "1");
    !bare.is_empty()
        && bare.starts_with(|c: char| c.is_ascii_alphabetic())
        && bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Table-of-contents heading range (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub min_level: u8,
    pub max_level: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 3,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Used for the sidebar, TOC and pagination labels.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    pub code_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1c1e21".to_string(),
            text_muted: "#606770".to_string(),
            border: "#dadde1".to_string(),
            link: "#2e8555".to_string(),
            link_hover: "#29784c".to_string(),
            code_background: "#f6f7f8".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1b1b1d".to_string(),
            text: "#e3e3e3".to_string(),
            text_muted: "#a0a0a0".to_string(),
            border: "#444950".to_string(),
            link: "#25c2a0".to_string(),
            link_hover: "#4fddbf".to_string(),
            code_background: "#2b2b2b".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# chunkdoc Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the docs root (next to your Markdown pages).
# Unknown keys will cause an error.

# Site title, shown in the header and appended to every <title>.
title = "Documentation"

# URL prefix of the whole site. Must start and end with "/".
base_url = "/"

# Path segment in front of every page slug: /docs/intro
route_base_path = "docs"

# Prefix for "Edit this page" links. The page's source path is appended.
# edit_url = "https://github.com/org/repo/edit/main/docs"

# ---------------------------------------------------------------------------
# Table of contents
# ---------------------------------------------------------------------------
[toc]
min_level = 2
max_level = 3

# ---------------------------------------------------------------------------
# Rendering primitives
# ---------------------------------------------------------------------------
# Replace the element a primitive emits. "{level}" expands to the heading level.
# Known primitives: heading, paragraph, code, code_block, strong, emphasis,
# strikethrough, list, list_item, link, image, quote, rule.
[primitives]
# code_block = "div"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1c1e21"
text_muted = "#606770"    # Sidebar, TOC, pagination labels
border = "#dadde1"
link = "#2e8555"
link_hover = "#29784c"
code_background = "#f6f7f8"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#1b1b1d"
text = "#e3e3e3"
text_muted = "#a0a0a0"
border = "#444950"
link = "#25c2a0"
link_hover = "#4fddbf"
code_background = "#2b2b2b"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
    --color-code-bg: {light_code_bg};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
        --color-code-bg: {dark_code_bg};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        light_code_bg = colors.light.code_background,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
        dark_code_bg = colors.dark.code_background,
    )
}
