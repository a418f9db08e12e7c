//! Application configuration
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/adscript/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod export;
mod generation;
mod logging;
mod reveal;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use export::{ExportConfig, FileExport};
pub use generation::{FileGeneration, GenerationConfig};
pub use logging::{FileLogging, LogRotation, LoggingConfig};
pub use reveal::{FileReveal, RevealConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the script-generation backend
    pub api_url: String,

    /// Directory exported documents are written to
    pub export_dir: PathBuf,

    /// Whether to run the TUI (disabled for headless mode)
    pub enable_tui: bool,

    /// Demo mode: serve the bundled sample script instead of calling the backend
    pub demo_mode: bool,

    /// Typing effect and status phrases
    pub reveal: RevealConfig,

    /// Generation request defaults
    pub generation: GenerationConfig,

    /// Document export settings
    pub export: ExportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            export_dir: PathBuf::from("."),
            enable_tui: true,
            demo_mode: false,
            reveal: RevealConfig::default(),
            generation: GenerationConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub export_dir: Option<String>,

    /// Optional [reveal] section
    pub reveal: Option<FileReveal>,

    /// Optional [generation] section
    pub generation: Option<FileGeneration>,

    /// Optional [export] section
    pub export: Option<FileExport>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/adscript/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("adscript").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        // Config is optional, so failing to write the template is not an error
        if let Err(e) = Self::write_template(&path) {
            tracing::debug!("Could not write config template {:?}: {:#}", path, e);
        }
    }

    /// Write the default template to `path`, creating parent directories
    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        // Use Config::default().to_toml() as single source of truth
        std::fs::write(path, Self::default().to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Read and parse a config file. A missing file yields defaults.
    ///
    /// A file that exists but cannot be read or parsed is an error: a broken
    /// config should fail fast instead of silently falling back to defaults.
    pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("Cannot read {}", path.display())),
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn load() -> Result<Self> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file_config(&path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        // API URL: env > file > default
        let api_url = env("ADSCRIPT_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        // Export directory: env > file > default
        let export_dir = env("ADSCRIPT_EXPORT_DIR")
            .or(file.export_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        // TUI toggle: env only (runtime flag)
        let enable_tui = env("ADSCRIPT_NO_TUI")
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true);

        // Demo mode: env only (runtime flag)
        let demo_mode = env("ADSCRIPT_DEMO")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            api_url,
            export_dir,
            enable_tui,
            demo_mode,
            reveal: RevealConfig::from_file(file.reveal),
            generation: GenerationConfig::from_file(file.generation),
            export: ExportConfig::from_file(file.export),
            logging: LoggingConfig::from_file(file.logging),
        }
    }
}
