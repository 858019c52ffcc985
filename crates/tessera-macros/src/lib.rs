//! Procedural macros for Tessera parameter structs.
//!
//! `#[derive(Params)]` implements `tessera_extract::BindParams` for a struct
//! with named fields. Each field that should be hydrated from the request
//! carries a binding annotation listing its sources in priority order:
//!
//! ```rust,ignore
//! use tessera_macros::Params;
//! use validator::Validate;
//!
//! #[derive(Debug, Default, Params, Validate)]
//! struct ListOrders {
//!     // `?page=` first, then the `X-Page` header, else 1
//!     #[param("query=page,header=X-Page,default=1")]
//!     #[validate(range(min = 1))]
//!     page: u32,
//!
//!     #[param("path=customerId")]
//!     customer_id: uuid::Uuid,
//!
//!     // Not bound; keeps its Default.
//!     cursor: Option<String>,
//! }
//! ```
//!
//! Sources are `query`, `header`, `path` and `default`. Annotated fields must
//! have a type implementing `tessera_extract::FromParam`.
//!
//! The generated impl refers to `::tessera_extract`. When only the facade is
//! a dependency, point the macro at its re-export:
//!
//! ```rust,ignore
//! #[derive(Default, Params, Validate)]
//! #[params(crate = "tessera::extract")]
//! struct Q { /* ... */ }
//! ```

mod params;
mod parse;

use proc_macro::TokenStream;

/// Derives `BindParams` from `#[param("source=key,...")]` field annotations.
///
/// Deriving for an enum, union or tuple struct is a compile error.
#[proc_macro_derive(Params, attributes(param, params))]
pub fn derive_params(item: TokenStream) -> TokenStream {
    params::expand_params(item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
