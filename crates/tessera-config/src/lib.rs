//! Typed configuration for Tessera handlers.
//!
//! This crate loads the settings every typed handler shares, plus the
//! logging setup, with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use tessera_config::ConfigLoader;
//!
//! # fn main() -> Result<(), tessera_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("tessera.toml")?
//!     .with_env_prefix("TESSERA")
//!     .load()?;
//!
//! println!("Body limit: {} bytes", config.handler.max_body_bytes);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [handler]
//! max_body_bytes = 2097152
//! propagate_request_id = true
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! span_events = false
//! file_line_info = false
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `TESSERA__HANDLER__MAX_BODY_BYTES=65536`
//! - `TESSERA__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::TesseraConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{HandlerSection, LoggingSection};
