//! Site configuration module.
//!
//! Handles loading, validating, and merging `_config.yml`. The user file is
//! sparse: it is merged on top of the stock defaults, so it only needs the
//! keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── _config.yml       # optional; stock defaults apply when absent
//! ├── _layouts/
//! ├── _posts/
//! └── index.html
//! ```
//!
//! ## Configuration Options
//!
//! ```yaml
//! url: "https://example.com/"   # base for post URLs and feed ids
//! title: "My Site"              # any extra key is exposed to templates
//!
//! collections:
//!   posts:
//!     generator: post           # default generator
//!   gallery:
//!     generator: listing
//!     dir: _shots               # default: _<lowercase name>
//!     path: gallery             # URL prefix for listing pages and images
//!     image_width: 500          # main image width (height follows aspect)
//!     thumb_width: 150          # 0 = derive from thumb_height
//!     thumb_height: 150         # 0 = derive from thumb_width
//!     quality: 85               # JPEG quality (1-100)
//! ```
//!
//! Everything except `collections` becomes site-wide template data. The
//! collection tables are typed and reject unknown keys, to catch typos early.

use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file at the source root.
pub const CONFIG_FILE: &str = "_config.yml";

/// Generator used when a collection does not name one.
pub const DEFAULT_GENERATOR: &str = "post";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config error: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `_config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that post URLs and feed ids are resolved against.
    pub url: String,
    /// Named collections, in name order.
    pub collections: BTreeMap<String, CollectionConfig>,
    /// Every other top-level key, passed through to templates untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert("posts".to_string(), CollectionConfig::default());
        Self {
            url: String::new(),
            collections,
            extra: Map::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, collection) in &self.collections {
            if collection.quality == 0 || collection.quality > 100 {
                return Err(ConfigError::Validation(format!(
                    "collections.{name}.quality must be 1-100"
                )));
            }
            if collection.path.trim_matches('/').is_empty() {
                return Err(ConfigError::Validation(format!(
                    "collections.{name}.path must name a directory"
                )));
            }
            if collection.image_width == 0 {
                return Err(ConfigError::Validation(format!(
                    "collections.{name}.image_width must be non-zero"
                )));
            }
        }
        Ok(())
    }

    /// Site-wide template data: every configured key except `collections`.
    pub fn template_data(&self) -> Map<String, Value> {
        let mut data = self.extra.clone();
        data.insert("url".to_string(), Value::String(self.url.clone()));
        data
    }
}

/// Settings for one collection.
///
/// Listing-only options are ignored by the post generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Registered generator name.
    pub generator: String,
    /// Source directory relative to the site root. Defaults to `_<lowercase name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// URL prefix for listing pages and images.
    pub path: String,
    /// Width of the main listing image; height keeps the aspect ratio.
    pub image_width: u32,
    /// Thumbnail width (0 = derive from height).
    pub thumb_width: u32,
    /// Thumbnail height (0 = derive from width).
    pub thumb_height: u32,
    /// JPEG encoding quality for both derivatives.
    pub quality: u32,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR.to_string(),
            dir: None,
            path: "listing".to_string(),
            image_width: 500,
            thumb_width: 0,
            thumb_height: 0,
            quality: 85,
        }
    }
}

impl CollectionConfig {
    /// Source directory for the collection called `name`.
    pub fn source_dir(&self, name: &str) -> String {
        self.dir
            .clone()
            .unwrap_or_else(|| format!("_{}", name.to_lowercase()))
    }

    pub fn jpeg_quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a JSON value.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Value {
    serde_json::to_value(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Mappings are merged key-by-key (overlay keys override base keys).
/// - Non-mapping values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_values(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load `_config.yml` from a directory as a raw value.
///
/// Returns `Ok(None)` if the file does not exist. An empty file counts as
/// no overrides.
pub fn load_raw_config(root: &Path) -> Result<Option<Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_yaml::from_str(&content)?;
    Ok(match value {
        Value::Null => None,
        other => Some(other),
    })
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(base: Value, overlay: Option<Value>) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_values(base, ov),
        None => base,
    };
    let config: SiteConfig = serde_json::from_value(merged)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `_config.yml` in the given directory.
///
/// Merges user values on top of stock defaults and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `_config.yml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_yaml() -> &'static str {
    r##"# Trowel configuration
# ====================
# All settings are optional. Values shown are the defaults.
# Any top-level key other than `collections` is available to every
# template, e.g. `title: My Site` is rendered with {{title}}.

# Base URL that post URLs and feed ids are resolved against.
url: ""

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# Each collection reads the files directly inside its directory
# (default: _<lowercase name>) and exposes them to templates as a list
# under its name, newest first.
collections:
  posts:
    # `post`    - YYYY-MM-DD-slug.html  ->  YYYY/MM/DD/slug.html
    # `listing` - NNN-slug.html + NNN-slug.png|jpg  ->  /<path>/NNN/slug.html
    generator: post
    # dir: _posts

    # Listing options (ignored by `post`):
    # URL prefix for listing pages and images.
    path: listing
    # Main image width in pixels; height keeps the aspect ratio.
    image_width: 500
    # Thumbnail size. 0 derives that edge from the other; both 0 keeps
    # the source size.
    thumb_width: 0
    thumb_height: 0
    # JPEG quality (1-100).
    quality: 85
"##
}
