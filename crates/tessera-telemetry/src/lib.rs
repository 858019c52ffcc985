//! Structured logging for Tessera services.
//!
//! Tessera crates log through `tracing` macros. Every request handled by a
//! `TypedHandler` runs inside a `tessera.request` span carrying the request
//! ID, method, path and endpoint name; this crate installs the subscriber
//! that renders those spans and events.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     format: LogFormat::Pretty,
//!     level: "tessera=debug,info".to_string(),
//!     ..LogConfig::default()
//! };
//! init_logging(&config)?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
