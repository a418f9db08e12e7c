//! Generation request defaults and client settings

use serde::Deserialize;
use std::time::Duration;

/// Defaults sent with every script-generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Target spot length, e.g. "45 seconds"
    pub duration: String,
    /// Ad format, e.g. "TVC"
    pub ad_type: String,
    /// Ask the backend for its low-latency path
    pub turbo: bool,
    /// Regional dialect; `None` means the standard language
    pub dialect: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            duration: "45 seconds".to_string(),
            ad_type: "TVC".to_string(),
            turbo: true,
            dialect: None,
            timeout_secs: 120,
        }
    }
}

/// Generation settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileGeneration {
    pub duration: Option<String>,
    pub ad_type: Option<String>,
    pub turbo: Option<bool>,
    pub dialect: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl GenerationConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileGeneration>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            duration: file.duration.unwrap_or(defaults.duration),
            ad_type: file.ad_type.unwrap_or(defaults.ad_type),
            turbo: file.turbo.unwrap_or(defaults.turbo),
            // "standard" is what the dialect picker calls no dialect at all
            dialect: file.dialect.filter(|d| !d.is_empty() && d != "standard"),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
