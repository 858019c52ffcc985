//! # Tessera Core
//!
//! Core types shared by every Tessera crate:
//!
//! - [`RequestContext`] - Per-request context carrying the request id and endpoint name
//! - [`RequestId`] - UUID v7 request identifier
//! - [`ProblemDetail`] / [`ProblemKind`] - Client-facing error documents and their taxonomy
//! - [`Violation`] - A single parameter or body field failure
//! - [`HandlerError`] - The error type of guards, hooks and actions

#![doc(html_root_url = "https://docs.rs/tessera-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod problem;

pub use context::{RequestContext, RequestId, REQUEST_ID_HEADER};
pub use error::{HandlerError, HandlerResult};
pub use problem::{ProblemDetail, ProblemKind, Violation, APPLICATION_PROBLEM_JSON};
