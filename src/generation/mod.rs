//! Where finished scripts come from
//!
//! The reveal only ever sees a complete `Document`. This module produces one
//! from the generation backend, a file, stdin, or the bundled sample.

mod client;

pub use client::HttpSource;

use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Shown when the backend answers without a script
pub const FALLBACK_SCRIPT: &str = "No script was generated. Please try again.";

/// Warning code the backend sends once the daily model quota is spent
const QUOTA_EXHAUSTED: &str = "CRITICAL_QUOTA_EXHAUSTED";

/// Bundled sample used by demo mode
pub const SAMPLE_SCRIPT: &str = include_str!("sample.md");

/// Errors from producing a script
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Failed to connect to backend. Is the server running? ({0})")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the backend's `detail` when it sent one
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),
}

/// What the user asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Brief {
    pub prompt: String,
    pub product_name: Option<String>,
    pub industry: Option<String>,
    pub tones: Vec<String>,
    /// Overrides the configured dialect for this request
    pub dialect: Option<String>,
}

impl Brief {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Body of `POST /generate`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScriptRequest {
    pub prompt: String,
    pub product_name: Option<String>,
    pub industry: Option<String>,
    pub tones: Option<Vec<String>>,
    pub duration: String,
    pub ad_type: String,
    pub turbo: bool,
    pub dialect: Option<String>,
}

/// Successful answer from `POST /generate`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScriptResponse {
    #[serde(default)]
    pub script: Option<String>,
    /// Older backends answer with `result` instead of `script`
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    /// Row id of the stored script; numeric or string depending on backend
    #[serde(default)]
    pub db_id: Option<serde_json::Value>,
}

/// Non-fatal notice attached to a generated script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    QuotaExhausted,
    Other(String),
}

impl Warning {
    fn from_code(code: String) -> Option<Self> {
        match code.as_str() {
            "" => None,
            QUOTA_EXHAUSTED => Some(Self::QuotaExhausted),
            _ => Some(Self::Other(code)),
        }
    }

    /// Text for the user
    pub fn message(&self) -> &str {
        match self {
            Self::QuotaExhausted => "AI quota exhausted for the day. Please come back later.",
            Self::Other(text) => text,
        }
    }
}

/// A finished script plus whatever the source said about it
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub document: Document,
    pub warning: Option<Warning>,
    /// Backend id of the stored script, when there is one
    pub script_id: Option<String>,
}

impl Generated {
    pub fn local(document: Document) -> Self {
        Self {
            document,
            warning: None,
            script_id: None,
        }
    }
}

impl From<ScriptResponse> for Generated {
    fn from(response: ScriptResponse) -> Self {
        let script = response
            .script
            .filter(|s| !s.is_empty())
            .or(response.result.filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_SCRIPT.to_string());

        let script_id = match response.db_id {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(id)) => Some(id),
            Some(other) => Some(other.to_string()),
        };

        Self {
            document: Document::from(script),
            warning: response.warning.and_then(Warning::from_code),
            script_id,
        }
    }
}

/// A way of obtaining one complete script
#[derive(Debug, Clone)]
pub enum Source {
    /// Ask the generation backend
    Http(HttpSource, Brief),
    /// Read a markdown file
    File(PathBuf),
    /// Read all of stdin
    Stdin,
    /// Serve the bundled sample after a simulated delay
    Demo(Duration),
}

impl Source {
    /// Produce the script
    pub async fn fetch(&self) -> Result<Generated, GenerationError> {
        match self {
            Self::Http(client, brief) => client.generate(brief).await,
            Self::File(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|source| {
                    GenerationError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                tracing::debug!(path = %path.display(), bytes = text.len(), "Loaded script file");
                Ok(Generated::local(Document::from(text)))
            }
            Self::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .map_err(GenerationError::Stdin)?;
                Ok(Generated::local(Document::from(text)))
            }
            Self::Demo(delay) => {
                tracing::info!("Demo mode: serving bundled sample script");
                tokio::time::sleep(*delay).await;
                Ok(Generated::local(Document::from(SAMPLE_SCRIPT)))
            }
        }
    }

    /// Short label for logs and the title bar
    pub fn label(&self) -> &'static str {
        match self {
            Self::Http(..) => "backend",
            Self::File(_) => "file",
            Self::Stdin => "stdin",
            Self::Demo(_) => "demo",
        }
    }
}
