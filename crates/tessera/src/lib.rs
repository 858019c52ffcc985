//! # Tessera
//!
//! **Typed request hydration for HTTP handlers**
//!
//! A handler declares three types: the request body `D`, the parameters `P`
//! and the reply payload `R`. Tessera fills `P` from the query string,
//! headers and path captures, decodes and validates `D`, calls the action,
//! and renders either the reply or an RFC 7807 problem document.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//!
//! #[derive(Debug, Default, Params, Validate)]
//! #[params(crate = "tessera::extract")]
//! struct ListOrders {
//!     #[param("query=page,default=1")]
//!     #[validate(range(min = 1))]
//!     page: u32,
//!
//!     #[param("header=X-Correlation-Id")]
//!     #[validate(required)]
//!     correlation_id: Option<String>,
//! }
//!
//! let list = TypedHandler::new(|req: HydratedRequest<Empty, ListOrders>| async move {
//!     Ok::<_, HandlerError>(Reply::ok(load_page(req.params.page).await?))
//! })
//! .named("listOrders");
//!
//! let routes = Routes::new().get("/orders", list)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Guards → Params → Body → Hooks → Action → Reply
//!              ↓        ↓       ↓      ↓        ↓
//!              └────────┴───────┴──────┴────────┴──→ Problem Detail
//! ```

#![doc(html_root_url = "https://docs.rs/tessera/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tessera_core as core;

// Re-export router types
pub use tessera_router as router;

// Re-export parameter and body extraction
pub use tessera_extract as extract;

// Re-export the handler pipeline
pub use tessera_pipeline as pipeline;

// Re-export logging setup
pub use tessera_telemetry as telemetry;

// Re-export configuration
pub use tessera_config as config;

// Re-export the Params derive
pub use tessera_macros::Params;

// `#[derive(Validate)]` expands to `::validator` paths.
pub use validator;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use tessera_core::{
        HandlerError, HandlerResult, ProblemDetail, ProblemKind, RequestContext, RequestId,
        Violation,
    };

    pub use tessera_extract::{Codec, Empty, FromParam, JsonCodec};

    pub use tessera_pipeline::{
        guard_fn, Guard, GuardOutcome, HandlerConfig, HttpHandler, HydratedRequest, Outcome,
        Reply, Routes, TypedHandler,
    };

    pub use tessera_config::{ConfigLoader, TesseraConfig};

    pub use tessera_macros::Params;

    pub use validator::Validate;
}
