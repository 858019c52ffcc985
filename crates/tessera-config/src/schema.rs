//! Configuration section types.

use serde::{Deserialize, Serialize};
use tessera_pipeline::HandlerConfig;
use tessera_telemetry::{LogConfig, LogFormat};

/// Settings shared by every typed handler.
///
/// # Example
///
/// ```
/// use tessera_config::HandlerSection;
///
/// let section = HandlerSection::default();
/// assert_eq!(section.max_body_bytes, 2 * 1024 * 1024);
/// assert!(section.propagate_request_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HandlerSection {
    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Reuse an incoming `x-request-id` and echo it on responses.
    #[serde(default = "default_true")]
    pub propagate_request_id: bool,
}

impl Default for HandlerSection {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            propagate_request_id: true,
        }
    }
}

impl HandlerSection {
    /// Converts to the pipeline's handler settings.
    #[must_use]
    pub fn to_handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            max_body_bytes: self.max_body_bytes,
            propagate_request_id: self.propagate_request_id,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Whether logging is installed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives, e.g. `info` or `tessera_pipeline=debug,warn`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log span open and close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include file and line numbers.
    #[serde(default)]
    pub file_line_info: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            span_events: false,
            file_line_info: false,
        }
    }
}

impl LoggingSection {
    /// Converts to the telemetry crate's logging settings.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            span_events: self.span_events,
            file_line_info: self.file_line_info,
            ..LogConfig::default()
        }
    }
}

fn default_max_body_bytes() -> usize {
    HandlerConfig::default().max_body_bytes
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}
