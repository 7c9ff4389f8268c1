//! Build configuration.
//!
//! An optional `config.toml` in the source root tunes where the build writes
//! and what it treats as an image. Every key is optional; the stock defaults
//! below reproduce the conventional layout of the web front end.
//!
//! ```toml
//! output = "web/public/subjects"       # Output tree (wiped on every build)
//! index = "web/public/subjects.json"   # Global subjects index
//! public_prefix = "subjects"           # URL prefix the front end serves `output` under
//! image_extensions = ["png", "jpg", "jpeg", "gif", "svg"]
//! json_indent = 4                      # Spaces per indentation level
//! ```
//!
//! Relative paths resolve against the working directory. `--output` and
//! `--index` on the command line take precedence over the file.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output tree, fully regenerated on each build.
    pub output: String,
    /// Path of the global `subjects.json`.
    pub index: String,
    /// Prefix of every public asset path written into `questions.json`.
    pub public_prefix: String,
    /// Lowercase file extensions copied as question assets.
    pub image_extensions: Vec<String>,
    /// Spaces per indentation level in generated JSON.
    pub json_indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: "web/public/subjects".to_string(),
            index: "web/public/subjects.json".to_string(),
            public_prefix: "subjects".to_string(),
            image_extensions: ["png", "jpg", "jpeg", "gif", "svg"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            json_indent: 4,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "image_extensions must not be empty".into(),
            ));
        }
        for ext in &self.image_extensions {
            if ext.is_empty() || ext.starts_with('.') || *ext != ext.to_lowercase() {
                return Err(ConfigError::Validation(format!(
                    "image_extensions entry {ext:?} must be lowercase without a leading dot"
                )));
            }
            if ext == "json" {
                return Err(ConfigError::Validation(
                    "image_extensions must not include json".into(),
                ));
            }
        }
        if self.json_indent > 8 {
            return Err(ConfigError::Validation("json_indent must be 0-8".into()));
        }
        if self.public_prefix.is_empty()
            || self.public_prefix.starts_with('/')
            || self.public_prefix.ends_with('/')
        {
            return Err(ConfigError::Validation(
                "public_prefix must be non-empty with no leading or trailing '/'".into(),
            ));
        }
        Ok(())
    }

    /// Whether a file with this extension is copied as a question asset.
    pub fn is_image_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.image_extensions.iter().any(|e| *e == ext)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` when the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the build config from the source root, falling back to stock defaults.
pub fn load_config(source_root: &Path) -> Result<Config, ConfigError> {
    resolve_config(load_raw_config(source_root)?)
}

/// Fully commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# quiz-index configuration
# ========================
# Place this file in the source root (next to the subject directories).
# Every key is optional; the values below are the defaults.

# Output tree. Wiped and regenerated on every build.
output = "web/public/subjects"

# Global subjects index consumed by the front end.
index = "web/public/subjects.json"

# URL prefix under which the front end serves the output tree.
# Image paths in questions.json start with this prefix.
public_prefix = "subjects"

# Files directly inside a question directory with one of these
# extensions (case-insensitive) are copied to the output.
image_extensions = ["png", "jpg", "jpeg", "gif", "svg"]

# Spaces per indentation level in generated JSON files.
json_indent = 4
"##
}
