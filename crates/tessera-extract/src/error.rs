//! Hydration error types.
//!
//! Client-facing failures ([`ConversionError`], violations) are kept apart
//! from developer mistakes ([`SetupError`]); the former become a 400 problem
//! listing every violation, the latter a logged, generic 500.

use tessera_core::{HandlerError, ProblemDetail, Violation};
use thiserror::Error;

use crate::descriptor::SourceKind;

/// A raw value could not be converted to the field's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter '{parameter}' must be a valid {type_name}: {reason}")]
pub struct ConversionError {
    /// Reported parameter name.
    pub parameter: String,
    /// Short name of the target type, e.g. `int`.
    pub type_name: &'static str,
    /// Where the value came from.
    pub origin: SourceKind,
    /// Parser message. Logged, never sent to clients.
    pub reason: String,
}

impl ConversionError {
    /// The client-facing violation for this failure.
    #[must_use]
    pub fn violation(&self) -> Violation {
        Violation::parameter(
            self.parameter.clone(),
            format!("must be a valid {}", self.type_name),
            Some(self.origin.as_str()),
        )
    }
}

/// A parameter type is declared in a way that can never bind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The field's type has no scalar conversion.
    #[error("field '{field}' has unsupported parameter type {type_name}")]
    UnsupportedFieldType {
        /// Rust field name.
        field: &'static str,
        /// Full Rust type name.
        type_name: &'static str,
    },

    /// The declared default does not convert to the field's type.
    #[error("default value '{value}' of field '{field}' is not a valid {type_name}: {reason}")]
    MalformedDefault {
        /// Rust field name.
        field: &'static str,
        /// The declared default.
        value: String,
        /// Short name of the target type.
        type_name: &'static str,
        /// Parser message.
        reason: String,
    },
}

/// Failure to bind one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The client sent a bad value.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The parameter type is misdeclared.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Failure to hydrate a parameter struct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrationError {
    /// One or more parameters failed conversion or validation.
    #[error("{} invalid parameter(s)", .0.len())]
    Invalid(Vec<Violation>),

    /// The parameter type is misdeclared.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

impl HydrationError {
    /// Returns the violations, if this is a client error.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(violations) => violations,
            Self::Setup(_) => &[],
        }
    }
}

impl From<HydrationError> for HandlerError {
    fn from(err: HydrationError) -> Self {
        match err {
            HydrationError::Invalid(violations) => ProblemDetail::bad_parameters(violations).into(),
            HydrationError::Setup(setup) => HandlerError::internal(setup),
        }
    }
}
