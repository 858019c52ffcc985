//! # Tessera Extract
//!
//! Typed parameter hydration and body decoding for Tessera handlers.
//!
//! A parameter struct declares where each field comes from with a binding
//! annotation and how it must look with `validator` rules:
//!
//! ```rust,ignore
//! #[derive(Debug, Default, Params, Validate)]
//! struct ListUsers {
//!     #[param("query=page,default=1")]
//!     #[validate(range(min = 1))]
//!     page: u32,
//!
//!     #[param("header=X-Correlation-Id")]
//!     #[validate(required)]
//!     correlation_id: Option<String>,
//! }
//! ```
//!
//! Hydration then runs in four steps:
//!
//! | Step | Module | |
//! |------|--------|-|
//! | Parse annotations once per type | [`descriptor`] | [`FieldDescriptor::parse`], [`descriptors`] |
//! | Find the raw value | [`resolve`](mod@resolve) | [`resolve()`], [`ParamSource`] |
//! | Convert it | [`coerce`] | [`FromParam`], [`assign`] |
//! | Validate and report | [`validate`](mod@validate) | [`hydrate_params`], [`body_violations`] |
//!
//! Bodies go through [`decode_body`] with a [`Codec`].

#![doc(html_root_url = "https://docs.rs/tessera-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod body;
pub mod codec;
pub mod coerce;
mod context;
pub mod descriptor;
mod error;
pub mod resolve;
pub mod validate;

pub use bind::{descriptors, hydrate_params, BindParams, Empty};
pub use body::{decode_body, DEFAULT_MAX_BODY_BYTES, EMPTY_BODY_DETAIL};
pub use codec::{Codec, CodecError, JsonCodec};
pub use coerce::{assign, FromParam};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use descriptor::{DescriptorTable, FieldDescriptor, FieldEntry, FieldTag, Source, SourceKind, DEFAULT_KEY};
pub use error::{BindError, ConversionError, HydrationError, SetupError};
pub use resolve::{resolve, resolve_all, ParamSource, ResolvedParam};
pub use validate::{body_violations, describe};

pub use tessera_router::Params;
