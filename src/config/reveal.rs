//! Reveal timing configuration
//!
//! Step size and cadence of the typing effect, plus the status phrases
//! shown while the generation request is in flight.

use crate::reveal::phrases::DEFAULT_PHRASES;
use crate::reveal::{DEFAULT_PHRASE_INTERVAL, DEFAULT_STEP, DEFAULT_TICK};
use serde::Deserialize;
use std::time::Duration;

/// Reveal settings
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Characters revealed per tick
    pub step: usize,
    /// Milliseconds between ticks
    pub tick_ms: u64,
    /// Milliseconds between status phrases while waiting
    pub phrase_interval_ms: u64,
    /// Status phrases, shown in order and cycled
    pub phrases: Vec<String>,
    /// Simulated generation latency in demo mode
    pub demo_delay_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            tick_ms: DEFAULT_TICK.as_millis() as u64,
            phrase_interval_ms: DEFAULT_PHRASE_INTERVAL.as_millis() as u64,
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            demo_delay_ms: 800,
        }
    }
}

/// Reveal settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileReveal {
    pub step: Option<usize>,
    pub tick_ms: Option<u64>,
    pub phrase_interval_ms: Option<u64>,
    pub phrases: Option<Vec<String>>,
    pub demo_delay_ms: Option<u64>,
}

impl RevealConfig {
    /// Create from file config with defaults
    ///
    /// Zero step or zero cadence would stall or spin the loop, so both are
    /// clamped to 1.
    pub fn from_file(file: Option<FileReveal>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            step: file.step.unwrap_or(defaults.step).max(1),
            tick_ms: file.tick_ms.unwrap_or(defaults.tick_ms).max(1),
            phrase_interval_ms: file
                .phrase_interval_ms
                .unwrap_or(defaults.phrase_interval_ms)
                .max(1),
            phrases: file.phrases.unwrap_or(defaults.phrases),
            demo_delay_ms: file.demo_delay_ms.unwrap_or(defaults.demo_delay_ms),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn phrase_interval(&self) -> Duration {
        Duration::from_millis(self.phrase_interval_ms)
    }

    pub fn demo_delay(&self) -> Duration {
        Duration::from_millis(self.demo_delay_ms)
    }
}
