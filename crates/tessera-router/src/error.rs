//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Error returned when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern is not a valid `/segment/{param}` pattern.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The same method and pattern were registered twice.
    #[error("duplicate route: {method} {pattern}")]
    Duplicate {
        /// Request method.
        method: Method,
        /// Route pattern.
        pattern: String,
    },

    /// Two patterns declare different parameter names at the same position.
    #[error("route '{pattern}' names parameter '{{{name}}}' where '{{{existing}}}' is already registered")]
    ConflictingParam {
        /// Route pattern being registered.
        pattern: String,
        /// Name used by the new pattern.
        name: String,
        /// Name already registered at that position.
        existing: String,
    },
}

impl RouteError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
