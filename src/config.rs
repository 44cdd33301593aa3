//! Gallery configuration module.
//!
//! Handles loading and validating `gallery.toml`. Stock defaults are
//! overridden by an optional `gallery.toml` placed at the gallery root:
//!
//! ```text
//! my-gallery/
//! ├── gallery.toml     # Optional, overrides stock defaults
//! ├── README.md        # Table view (generated)
//! ├── GALLERY.md       # Mobile view (generated)
//! ├── images/
//! └── prompts/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Prompt Gallery"   # Heading of the README
//! description = ""           # Paragraph under the heading
//! images_dir = "images"      # Image directory, relative to the root
//! prompts_dir = "prompts"    # Prompt and tag record directory
//! readme = "README.md"       # Table view output
//! mobile = "GALLERY.md"      # Mobile view output ("" disables it)
//!
//! [seed]
//! fallback = "02seed"        # Shared seed image basename ("" disables)
//! extensions = ["png", "jpg", "jpeg", "webp"]
//!
//! [watch]
//! interval_secs = 2
//!
//! [provider]
//! endpoint = "https://api.openai.com/v1/images/generations"
//! model = "gpt-image-1"
//! size = "1024x1024"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [fill]
//! clipboard_command = ["pbpaste"]
//! watch_interval_ms = 200    # Clipboard poll interval for --clipboard-watch
//! watch_attempts = 6000      # Polls per entry before it is skipped
//! editor_command = ["open", "-a", "TextEdit"]
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up at the gallery root.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Heading written at the top of the README.
    pub title: String,
    /// Optional paragraph written under the heading.
    pub description: String,
    /// Image directory, relative to the gallery root.
    pub images_dir: String,
    /// Prompt text and tag record directory, relative to the gallery root.
    pub prompts_dir: String,
    /// Table view output file, relative to the gallery root.
    pub readme: String,
    /// Mobile view output file. Empty disables the mobile document.
    pub mobile: String,
    /// Shared seed image lookup.
    pub seed: SeedConfig,
    /// Refresh loop settings.
    pub watch: WatchConfig,
    /// Image generation provider.
    pub provider: ProviderConfig,
    /// Prompt filling settings.
    pub fill: FillConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Prompt Gallery".to_string(),
            description: String::new(),
            images_dir: "images".to_string(),
            prompts_dir: "prompts".to_string(),
            readme: "README.md".to_string(),
            mobile: "GALLERY.md".to_string(),
            seed: SeedConfig::default(),
            watch: WatchConfig::default(),
            provider: ProviderConfig::default(),
            fill: FillConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("images_dir", &self.images_dir),
            ("prompts_dir", &self.prompts_dir),
            ("readme", &self.readme),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.images_dir == self.prompts_dir {
            return Err(ConfigError::Validation(
                "images_dir and prompts_dir must differ".into(),
            ));
        }
        // The mobile view is written after the table and would replace it.
        if self.mobile.trim() == self.readme.trim() {
            return Err(ConfigError::Validation("mobile and readme must differ".into()));
        }
        if self.watch.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "watch.interval_secs must be at least 1".into(),
            ));
        }
        if self.seed.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "seed.extensions must not be empty".into(),
            ));
        }
        if self.fill.clipboard_command.is_empty() {
            return Err(ConfigError::Validation(
                "fill.clipboard_command must not be empty".into(),
            ));
        }
        if self.fill.watch_interval_ms == 0 || self.fill.watch_attempts == 0 {
            return Err(ConfigError::Validation(
                "fill.watch_interval_ms and fill.watch_attempts must be at least 1".into(),
            ));
        }
        if self.fill.editor_command.is_empty() {
            return Err(ConfigError::Validation(
                "fill.editor_command must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Shared seed image lookup used when a record names no usable seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Basename probed inside the image directory. Empty disables the probe.
    pub fallback: String,
    /// Extensions tried in order; the first existing file wins.
    pub extensions: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            fallback: "02seed".to_string(),
            extensions: ["png", "jpg", "jpeg", "webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Seconds between two directory polls.
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 2 }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Image generation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
    /// Requested image size, e.g. `1024x1024`.
    pub size: String,
    /// Environment variable holding the API key. The key itself never lives
    /// in the config file.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/images/generations".to_string(),
            model: "gpt-image-1".to_string(),
            size: "1024x1024".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillConfig {
    /// Program and arguments printing the clipboard to stdout.
    pub clipboard_command: Vec<String>,
    /// Milliseconds between two clipboard reads in watch mode.
    pub watch_interval_ms: u64,
    /// Reads per entry before watch mode gives up on it.
    pub watch_attempts: u32,
    /// Program and arguments that open a prompt file; its path is appended.
    pub editor_command: Vec<String>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            clipboard_command: vec!["pbpaste".to_string()],
            watch_interval_ms: 200,
            watch_attempts: 6000,
            editor_command: vec!["open".to_string(), "-a".to_string(), "TextEdit".to_string()],
        }
    }
}

impl FillConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

// =============================================================================
// Resolved gallery layout
// =============================================================================

/// A gallery root together with its configuration.
///
/// Every component receives one of these instead of reading the process
/// working directory, so tests can point the whole pipeline at a temp dir.
#[derive(Debug, Clone)]
pub struct Gallery {
    pub root: PathBuf,
    pub config: GalleryConfig,
}

impl Gallery {
    pub fn new(root: impl Into<PathBuf>, config: GalleryConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load `gallery.toml` from `root` (stock defaults when absent).
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = load_config(&root)?;
        Ok(Self { root, config })
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.config.images_dir)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.root.join(&self.config.prompts_dir)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join(&self.config.readme)
    }

    /// Mobile document path, `None` when disabled.
    pub fn mobile_path(&self) -> Option<PathBuf> {
        let name = self.config.mobile.trim();
        (!name.is_empty()).then(|| self.root.join(name))
    }

    /// Root-relative link to a file in the image directory, `/`-separated.
    pub fn image_link(&self, filename: &str) -> String {
        join_link(&self.config.images_dir, filename)
    }

    /// Root-relative link to a file in the prompt directory, `/`-separated.
    pub fn prompt_link(&self, filename: &str) -> String {
        join_link(&self.config.prompts_dir, filename)
    }
}

fn join_link(dir: &str, filename: &str) -> String {
    format!("{}/{}", dir.trim_end_matches(['/', '\\']), filename)
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load and validate `gallery.toml` from the gallery root.
///
/// A missing file yields the stock defaults. Keys absent from the file keep
/// their defaults through `#[serde(default)]` on every section.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str::<GalleryConfig>(&content)?
    } else {
        GalleryConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Prompt Gallery Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Heading of the generated README.
title = "Prompt Gallery"

# Paragraph written under the heading (may be empty).
description = ""

# Directories, relative to the gallery root.
images_dir = "images"
prompts_dir = "prompts"

# Generated documents, overwritten on every render.
readme = "README.md"
# Collapsible per-entry view. Set to "" to skip it.
mobile = "GALLERY.md"

# ---------------------------------------------------------------------------
# Shared seed image
# ---------------------------------------------------------------------------
[seed]
# When a tag record names no existing seed, images/<fallback>.<ext> is used.
# Set to "" to disable the lookup.
fallback = "02seed"
# Extensions tried in order; the first existing file wins.
extensions = ["png", "jpg", "jpeg", "webp"]

# ---------------------------------------------------------------------------
# Watch mode
# ---------------------------------------------------------------------------
[watch]
# Seconds between two directory polls.
interval_secs = 2

# ---------------------------------------------------------------------------
# Image generation
# ---------------------------------------------------------------------------
[provider]
endpoint = "https://api.openai.com/v1/images/generations"
model = "gpt-image-1"
size = "1024x1024"
# Environment variable holding the API key.
api_key_env = "OPENAI_API_KEY"

# ---------------------------------------------------------------------------
# Prompt filling
# ---------------------------------------------------------------------------
[fill]
# Command printing the clipboard contents (used by every clipboard mode).
clipboard_command = ["pbpaste"]
# `fill --clipboard-watch`: milliseconds between clipboard reads, and reads
# per entry before it is skipped.
watch_interval_ms = 200
watch_attempts = 6000
# `fill --editor`: command opening a prompt file. The file path is appended.
editor_command = ["open", "-a", "TextEdit"]
"##
}
