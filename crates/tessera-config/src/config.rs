//! The root configuration type.

use serde::{Deserialize, Serialize};
use tessera_pipeline::HandlerConfig;
use tessera_telemetry::{LogConfig, LogFormat};

use crate::{ConfigError, HandlerSection, LoggingSection};

/// Complete Tessera configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use tessera_config::TesseraConfig;
///
/// let config = TesseraConfig::default();
/// assert_eq!(config.logging.level, "info");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    /// Handler settings.
    #[serde(default)]
    pub handler: HandlerSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl TesseraConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `handler.max_body_bytes` is zero
    /// - `logging.level` is not a valid filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handler.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "handler.max_body_bytes",
                "must be greater than 0",
            ));
        }

        self.logging
            .to_log_config()
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// Development preset: debug level, pretty output with span events.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera_config::TesseraConfig;
    /// use tessera_telemetry::LogFormat;
    ///
    /// let config = TesseraConfig::development();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            handler: HandlerSection::default(),
            logging: LoggingSection {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                span_events: true,
                file_line_info: true,
            },
        }
    }

    /// Production preset: info level, JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Handler settings for [`TypedHandler::config`](tessera_pipeline::TypedHandler::config).
    #[must_use]
    pub fn to_handler_config(&self) -> HandlerConfig {
        self.handler.to_handler_config()
    }

    /// Logging settings for [`tessera_telemetry::init_logging`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        self.logging.to_log_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TesseraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config, TesseraConfig::production());
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let mut config = TesseraConfig::default();
        config.handler.max_body_bytes = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("handler.max_body_bytes"));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = TesseraConfig::default();
        config.logging.level = "tessera=loud".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "logging.level"));
    }

    #[test]
    fn test_conversions() {
        let config = TesseraConfig::development();
        assert_eq!(config.to_log_config().level, "debug");
        assert!(config.to_log_config().span_events);
        assert!(config.to_handler_config().propagate_request_id);
    }
}
