//! # Tessera Pipeline
//!
//! The request hydration orchestrator: turns a raw HTTP request into typed,
//! validated parameters and body, runs an action, and writes its reply.
//!
//! ## Stages
//!
//! ```text
//! Request → Guards → Params → Body → on_data/on_params → Action
//!                                                           ↓
//! Response ←──────── encode ← on_response ← Reply/Redirect ─┘
//! ```
//!
//! | Stage | Failure                                             |
//! |-------|-----------------------------------------------------|
//! | Guards | the guard's error or response                      |
//! | Params | 400 bad parameters with every violation; 500 for misdeclared types |
//! | Body   | 400 for oversize, empty or undecodable; 422 with pointers |
//! | Hooks  | generic 500, logged                                |
//! | Action | the returned problem, or a generic 500             |
//!
//! Every failure is written as `application/problem+json`.
//!
//! ## Example
//!
//! ```
//! use tessera_core::HandlerError;
//! use tessera_extract::Empty;
//! use tessera_pipeline::{HydratedRequest, Reply, Routes, TypedHandler};
//!
//! let ping = TypedHandler::new(|_: HydratedRequest<Empty, Empty>| async {
//!     Ok::<_, HandlerError>(Reply::ok("pong"))
//! })
//! .named("ping");
//!
//! let routes = Routes::new().get("/ping", ping).unwrap();
//! assert!(!routes.is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod guard;
mod handler;
mod hooks;
mod reply;
mod request;
mod routes;
pub mod types;

pub use guard::{guard_fn, FnGuard, Guard, GuardChain, GuardOutcome, GuardVerdict};
pub use handler::{HandlerConfig, HttpHandler, TypedHandler};
pub use hooks::{Hook, Hooks};
pub use reply::{header_name, header_value, Outcome, Reply};
pub use request::HydratedRequest;
pub use routes::{Endpoint, Routes};
pub use types::{error_response, BoxFuture, Request, Response, ResponseExt};
