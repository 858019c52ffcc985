//! Error types for Tessera handlers.
//!
//! Guards, hooks and actions fail with a [`HandlerError`]. The type is a
//! closed sum: either the failure is already a client-facing
//! [`ProblemDetail`], which is rendered verbatim, or it is an opaque internal
//! error, which is logged and replaced by a generic server error.

use crate::problem::ProblemDetail;
use thiserror::Error;

/// Result type alias using [`HandlerError`].
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Failure raised by a guard, hook or action.
///
/// # Example
///
/// ```
/// use tessera_core::{HandlerError, ProblemDetail};
///
/// let err: HandlerError = ProblemDetail::not_found("no such user").into();
/// assert_eq!(err.into_problem().status(), 404);
///
/// let err = HandlerError::msg("connection pool exhausted");
/// let problem = err.into_problem();
/// assert_eq!(problem.status(), 500);
/// assert!(!problem.detail().contains("pool"));
/// ```
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A client-facing problem, passed through unchanged.
    #[error(transparent)]
    Problem(#[from] ProblemDetail),

    /// Any other failure. Never shown to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wraps an arbitrary error as an internal failure.
    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal(error.into())
    }

    /// Creates an internal failure from a message.
    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(message))
    }

    /// Returns `true` if this error is already a client-facing problem.
    #[must_use]
    pub const fn is_problem(&self) -> bool {
        matches!(self, Self::Problem(_))
    }

    /// Returns the problem, if this error is one.
    #[must_use]
    pub const fn as_problem(&self) -> Option<&ProblemDetail> {
        match self {
            Self::Problem(problem) => Some(problem),
            Self::Internal(_) => None,
        }
    }

    /// Converts the error into the document sent to the client.
    ///
    /// Internal errors are logged at error level with their full chain and
    /// replaced by [`ProblemDetail::server_error`].
    #[must_use]
    pub fn into_problem(self) -> ProblemDetail {
        match self {
            Self::Problem(problem) => problem,
            Self::Internal(error) => {
                tracing::error!(error = ?error, "internal error, responding with a generic server error");
                ProblemDetail::server_error()
            }
        }
    }
}
