//! # Tessera Test
//!
//! In-memory HTTP testing for Tessera handlers: requests go straight into an
//! [`HttpHandler`](tessera_pipeline::HttpHandler) without binding a port.
//!
//! ## Key Features
//!
//! - **Request Builder**: headers, query pairs, JSON, form and raw bodies
//! - **Response Assertions**: status, headers and JSON fields
//! - **Problem Documents**: decode `application/problem+json` bodies and
//!   compare their `violations`
//!
//! ## Example
//!
//! ```ignore
//! use tessera_test::TestClient;
//!
//! #[tokio::test]
//! async fn rejects_bad_page() {
//!     let client = TestClient::new(routes());
//!
//!     let response = client
//!         .get("/orders")
//!         .query_param("page", "invalid")
//!         .send()
//!         .await;
//!
//!     response.assert_problem(StatusCode::BAD_REQUEST, "BAD_PARAMETERS");
//!     assert_eq!(response.violations().unwrap()[0].detail, "must be a valid int");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
