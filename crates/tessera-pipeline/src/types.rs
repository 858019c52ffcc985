//! Common request and response types.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use tessera_core::{HandlerError, ProblemDetail, APPLICATION_PROBLEM_JSON};

/// The HTTP request type handlers consume.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type handlers produce.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed future, as returned by guards and [`crate::HttpHandler`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fallback body if a problem fails to serialise.
const SERVER_ERROR_BODY: &str = r#"{"type":"urn:tessera:problem:server-error","title":"Internal Server Error","detail":"an unexpected error occurred","status":500,"code":"SERVER_ERROR"}"#;

/// Extension trait for building responses without a fallible builder.
pub trait ResponseExt {
    /// An empty response with the given status.
    fn empty(status: StatusCode) -> Response;

    /// An `application/problem+json` response for `problem`.
    fn problem(problem: &ProblemDetail) -> Response;
}

impl ResponseExt for Response {
    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn problem(problem: &ProblemDetail) -> Response {
        let (status, body) = match serde_json::to_vec(problem) {
            Ok(body) => (problem.status_code(), Bytes::from(body)),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialise problem detail");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Bytes::from_static(SERVER_ERROR_BODY.as_bytes()),
                )
            }
        };

        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROBLEM_JSON));
        response
    }
}

/// Renders a handler failure.
///
/// Problems keep their status; `instance` defaults to `path`. Internal
/// errors are logged and become a generic 500.
pub fn error_response(err: HandlerError, path: &str) -> Response {
    let mut problem = err.into_problem();
    if problem.instance().is_none() {
        problem = problem.with_instance(path);
    }
    Response::problem(&problem)
}
