//! Path parameters and route table for Tessera.
//!
//! This crate is the registration collaborator of the handler pipeline: it
//! maps an exact method and a `/segment/{param}` pattern to a value and
//! captures path parameters into [`Params`]. It is deliberately small; it
//! has no wildcards, regex segments or method fallbacks.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use tessera_router::{Lookup, Router};
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/orgs/{orgId}/users/{userId}", "getOrgUser").unwrap();
//!
//! if let Lookup::Found(m) = router.lookup(&Method::GET, "/orgs/acme/users/7") {
//!     assert_eq!(m.params.get("orgId"), Some("acme"));
//!     assert_eq!(m.params.get("userId"), Some("7"));
//! }
//! ```

mod error;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use params::Params;
pub use router::{Lookup, RouteMatch, Router};
