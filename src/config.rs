//! Ingest configuration.
//!
//! Handles loading, validating, and merging `ingest.toml`. Stock defaults
//! reproduce the reference deployment; a user file overrides only the keys
//! it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! storage_root = "uploads"      # Parent of original/, large/, thumb/
//! max_upload_bytes = 2097152    # 2 MiB
//! allowed_extensions = ["jpg", "jpeg", "png", "webp"]
//! allowed_mime_types = ["image/jpeg", "image/jpg", "image/png", "image/webp"]
//! large_max_width = 1600        # Width bound for the large derivative
//! thumb_size = 300              # Edge of the square thumbnail
//! target_format = "webp"        # Encoding of every derivative
//! access_guard = true           # Write {storage_root}/.htaccess if absent
//! # public_prefix = "/uploads"  # Adds public URLs to results
//!
//! [processing]
//! max_processes = 4             # CLI batch workers (omit for auto = CPU cores)
//! ```
//!
//! Encode quality is intentionally absent: the three operating points live in
//! [`Quality`](crate::imaging::Quality) and are not tunable per deployment.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{SourceFormat, TargetFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config filename looked up by the CLI.
pub const CONFIG_FILENAME: &str = "ingest.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Limits, allow-lists and layout for the ingest pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Directory holding `original/`, `large/` and `thumb/`.
    pub storage_root: PathBuf,
    /// Largest accepted payload in bytes.
    pub max_upload_bytes: u64,
    /// Accepted filename extensions, lower-case, without the dot.
    pub allowed_extensions: Vec<String>,
    /// Accepted MIME types, checked against both the declared and sniffed type.
    pub allowed_mime_types: Vec<String>,
    /// Width bound of the large derivative.
    pub large_max_width: u32,
    /// Edge length of the square thumbnail.
    pub thumb_size: u32,
    /// Encoding of every derivative.
    pub target_format: TargetFormat,
    /// Prefix for public URLs in results (e.g. `/backend/uploads`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_prefix: Option<String>,
    /// Write an access-control file at the storage root if none exists.
    pub access_guard: bool,
    /// Batch processing settings for the CLI.
    pub processing: ProcessingConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("uploads"),
            max_upload_bytes: 2 * 1024 * 1024,
            allowed_extensions: ["jpg", "jpeg", "png", "webp"]
                .map(String::from)
                .to_vec(),
            allowed_mime_types: ["image/jpeg", "image/jpg", "image/png", "image/webp"]
                .map(String::from)
                .to_vec(),
            large_max_width: 1600,
            thumb_size: 300,
            target_format: TargetFormat::WebP,
            public_prefix: None,
            access_guard: true,
            processing: ProcessingConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Same defaults, rooted somewhere else.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: root.into(),
            ..Self::default()
        }
    }

    /// Lower-case the allow-lists so lookups can compare case-insensitively.
    pub fn normalize(&mut self) {
        for ext in &mut self.allowed_extensions {
            *ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        }
        for mime in &mut self.allowed_mime_types {
            *mime = mime.trim().to_ascii_lowercase();
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_upload_bytes must be greater than 0".into(),
            ));
        }
        if self.large_max_width == 0 {
            return Err(ConfigError::Validation(
                "large_max_width must be greater than 0".into(),
            ));
        }
        if self.thumb_size == 0 {
            return Err(ConfigError::Validation(
                "thumb_size must be greater than 0".into(),
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "allowed_extensions must not be empty".into(),
            ));
        }
        if self.allowed_mime_types.is_empty() {
            return Err(ConfigError::Validation(
                "allowed_mime_types must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .allowed_extensions
            .iter()
            .find(|e| SourceFormat::from_extension(e).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "allowed_extensions: no decoder for '{ext}'"
            )));
        }
        if let Some(mime) = self
            .allowed_mime_types
            .iter()
            .find(|m| SourceFormat::from_mime(m).is_err())
        {
            return Err(ConfigError::Validation(format!(
                "allowed_mime_types: no decoder for '{mime}'"
            )));
        }
        Ok(())
    }

    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| *e == ext)
    }

    pub fn allows_mime(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        self.allowed_mime_types.iter().any(|m| *m == mime)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of files ingested at once by the CLI.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(IngestConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `allowed_extensions` list replaces the stock list rather than extending it.
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

/// Parse config text, merge it over the defaults, normalize and validate.
pub fn parse_config(content: &str) -> Result<IngestConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let mut config: IngestConfig = merged.try_into()?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Load config from a file.
///
/// A missing file yields the stock defaults; a file that exists but does not
/// parse or validate is an error.
pub fn load_config(path: &Path) -> Result<IngestConfig, ConfigError> {
    if !path.exists() {
        let config = IngestConfig::default();
        config.validate()?;
        return Ok(config);
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `ingest.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-ingest configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding the original/, large/ and thumb/ derivative folders.
storage_root = "uploads"

# Largest accepted upload, in bytes (2 MiB).
max_upload_bytes = 2097152

# Filename extensions accepted for uploads (lower-case, no dot).
allowed_extensions = ["jpg", "jpeg", "png", "webp"]

# MIME types accepted for uploads. Both the declared Content-Type and the
# type sniffed from the file's bytes must be in this list.
allowed_mime_types = ["image/jpeg", "image/jpg", "image/png", "image/webp"]

# Width bound for the large derivative. Narrower images keep their size.
large_max_width = 1600

# Edge length of the center-cropped square thumbnail.
thumb_size = 300

# Encoding of every derivative. Changing it orphans the extension of every
# file already stored.
target_format = "webp"

# Write {storage_root}/.htaccess (no script execution, no directory listing)
# the first time it is missing.
access_guard = true

# Prefix for public URLs reported alongside file paths, e.g. "/backend/uploads".
# public_prefix = "/uploads"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of files the CLI ingests at once.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
