//! Document export settings

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// File name stem: "<prefix>-script.doc"
    pub file_prefix: String,
    /// `<title>` of the exported document
    pub title: String,
    /// CSS font stack for the document body
    pub font_family: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "adscript".to_string(),
            title: "Ad Script".to_string(),
            font_family: "'Hind Siliguri', sans-serif".to_string(),
        }
    }
}

/// Export settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileExport {
    pub file_prefix: Option<String>,
    pub title: Option<String>,
    pub font_family: Option<String>,
}

impl ExportConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileExport>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            file_prefix: file.file_prefix.unwrap_or(defaults.file_prefix),
            title: file.title.unwrap_or(defaults.title),
            font_family: file.font_family.unwrap_or(defaults.font_family),
        }
    }
}
