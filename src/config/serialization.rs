//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize the dialect line, commented out when unset
    fn dialect_to_toml(&self) -> String {
        match &self.generation.dialect {
            Some(dialect) => format!("dialect = {:?}", dialect),
            None => "# dialect = \"chatgaiya\"       # standard when unset".to_string(),
        }
    }

    /// Render the full config file, comments included
    pub fn to_toml(&self) -> String {
        format!(
            r#"# adscript configuration

# Script-generation backend (ADSCRIPT_API_URL overrides)
api_url = {api_url:?}

# Where exported documents are written (ADSCRIPT_EXPORT_DIR overrides)
export_dir = {export_dir:?}

# Typing effect
[reveal]
step = {step}                     # characters per tick
tick_ms = {tick_ms}                 # milliseconds between ticks
phrase_interval_ms = {phrase_ms}    # status phrase rotation while waiting
demo_delay_ms = {demo_ms}           # simulated latency in demo mode
phrases = {phrases:?}

# Defaults sent with each generation request
[generation]
duration = {duration:?}
ad_type = {ad_type:?}
turbo = {turbo}
{dialect}
timeout_secs = {timeout}

# Document export
[export]
file_prefix = {file_prefix:?}   # <prefix>-script.doc
title = {title:?}
font_family = {font:?}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level:?}
# File logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir:?}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix:?}
"#,
            api_url = self.api_url,
            export_dir = self.export_dir.display().to_string(),
            step = self.reveal.step,
            tick_ms = self.reveal.tick_ms,
            phrase_ms = self.reveal.phrase_interval_ms,
            demo_ms = self.reveal.demo_delay_ms,
            phrases = self.reveal.phrases,
            duration = self.generation.duration,
            ad_type = self.generation.ad_type,
            turbo = self.generation.turbo,
            dialect = self.dialect_to_toml(),
            timeout = self.generation.timeout_secs,
            file_prefix = self.export.file_prefix,
            title = self.export.title,
            font = self.export.font_family,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
