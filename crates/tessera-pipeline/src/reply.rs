//! What an action hands back.

use http::header::{HeaderMap, HeaderName, HeaderValue, IntoHeaderName};
use http::StatusCode;
use tessera_core::{HandlerError, ProblemDetail};

/// A successful response description.
///
/// Either a payload to encode, a redirect, or neither (status and headers
/// only).
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use tessera_pipeline::Reply;
///
/// let reply = Reply::created(vec![1, 2, 3]);
/// assert_eq!(reply.status_code(), StatusCode::CREATED);
///
/// let reply: Reply<()> = Reply::redirect("/login");
/// assert_eq!(reply.location(), Some("/login"));
/// ```
#[derive(Debug, Clone)]
pub struct Reply<R> {
    status: StatusCode,
    headers: HeaderMap,
    payload: Option<R>,
    redirect: Option<String>,
}

impl<R> Reply<R> {
    /// A 200 reply with `payload`.
    pub fn ok(payload: R) -> Self {
        Self::with_status(StatusCode::OK, payload)
    }

    /// A 201 reply with `payload`.
    pub fn created(payload: R) -> Self {
        Self::with_status(StatusCode::CREATED, payload)
    }

    /// A 202 reply with `payload`.
    pub fn accepted(payload: R) -> Self {
        Self::with_status(StatusCode::ACCEPTED, payload)
    }

    /// A reply with an explicit status and `payload`.
    pub fn with_status(status: StatusCode, payload: R) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            payload: Some(payload),
            redirect: None,
        }
    }

    /// A 204 reply without a body.
    pub fn no_content() -> Self {
        Self::empty(StatusCode::NO_CONTENT)
    }

    /// A reply without a body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            payload: None,
            redirect: None,
        }
    }

    /// A 302 redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::redirect_with(StatusCode::FOUND, location)
    }

    /// A redirect with an explicit status.
    ///
    /// Non-3xx statuses are replaced by 302 when the response is written.
    pub fn redirect_with(status: StatusCode, location: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            payload: None,
            redirect: Some(location.into()),
        }
    }

    /// Overrides the status.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets a response header, replacing earlier values.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The status.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Extra response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The payload, if any.
    pub fn payload(&self) -> Option<&R> {
        self.payload.as_ref()
    }

    /// The redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderMap, Option<R>, Option<String>) {
        (self.status, self.headers, self.payload, self.redirect)
    }
}

/// The full result of an action: a reply, an error, or both.
///
/// An error always wins. Actions normally return `Result<Reply<R>, E>`,
/// which converts into an `Outcome`; building one by hand is only needed to
/// return both halves.
#[derive(Debug)]
pub struct Outcome<R> {
    reply: Option<Reply<R>>,
    error: Option<HandlerError>,
}

impl<R> Outcome<R> {
    /// An outcome with any combination of reply and error.
    pub fn new(reply: Option<Reply<R>>, error: Option<HandlerError>) -> Self {
        Self { reply, error }
    }

    /// A successful outcome.
    pub fn reply(reply: Reply<R>) -> Self {
        Self::new(Some(reply), None)
    }

    /// A failed outcome.
    pub fn error(error: impl Into<HandlerError>) -> Self {
        Self::new(None, Some(error.into()))
    }

    /// Settles the outcome.
    ///
    /// An error takes precedence over any reply, which is dropped. With
    /// neither present the reply is a bare 204.
    pub fn into_result(self) -> Result<Reply<R>, HandlerError> {
        match (self.reply, self.error) {
            (Some(_), Some(error)) => {
                tracing::debug!("action returned a reply and an error; discarding the reply");
                Err(error)
            }
            (None, Some(error)) => Err(error),
            (Some(reply), None) => Ok(reply),
            (None, None) => Ok(Reply::no_content()),
        }
    }
}

impl<R> From<Reply<R>> for Outcome<R> {
    fn from(reply: Reply<R>) -> Self {
        Self::reply(reply)
    }
}

impl<R> From<HandlerError> for Outcome<R> {
    fn from(error: HandlerError) -> Self {
        Self::error(error)
    }
}

impl<R> From<ProblemDetail> for Outcome<R> {
    fn from(problem: ProblemDetail) -> Self {
        Self::error(problem)
    }
}

impl<R, E: Into<HandlerError>> From<Result<Reply<R>, E>> for Outcome<R> {
    fn from(result: Result<Reply<R>, E>) -> Self {
        match result {
            Ok(reply) => Self::reply(reply),
            Err(error) => Self::error(error),
        }
    }
}

/// Builds a header value from a string, for use with [`Reply::header`].
///
/// # Errors
///
/// Fails if `value` contains bytes not allowed in a header.
pub fn header_value(value: &str) -> Result<HeaderValue, HandlerError> {
    HeaderValue::from_str(value).map_err(HandlerError::internal)
}

/// Builds a header name from a string.
///
/// # Errors
///
/// Fails if `name` is not a valid header name.
pub fn header_name(name: &str) -> Result<HeaderName, HandlerError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(HandlerError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_builders() {
        let reply = Reply::ok("x").header("x-total", HeaderValue::from_static("3"));
        assert_eq!(reply.status_code(), StatusCode::OK);
        assert_eq!(reply.headers()["x-total"], "3");
        assert_eq!(reply.payload(), Some(&"x"));

        let reply: Reply<()> = Reply::no_content();
        assert_eq!(reply.status_code(), StatusCode::NO_CONTENT);
        assert!(reply.payload().is_none());

        let reply = Reply::accepted(1).status(StatusCode::OK);
        assert_eq!(reply.status_code(), StatusCode::OK);
    }

    #[test]
    fn test_error_wins_over_reply() {
        let outcome = Outcome::new(
            Some(Reply::ok("ignored")),
            Some(ProblemDetail::conflict("already exists").into()),
        );
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.as_problem().map(ProblemDetail::status), Some(409));
    }

    #[test]
    fn test_neither_is_no_content() {
        let reply = Outcome::<()>::new(None, None).into_result().unwrap();
        assert_eq!(reply.status_code(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_from_result() {
        let ok: Outcome<u8> = Ok::<_, HandlerError>(Reply::ok(1)).into();
        assert_eq!(ok.into_result().unwrap().payload(), Some(&1));

        let err: Outcome<u8> = Err::<Reply<u8>, _>(ProblemDetail::not_found("gone")).into();
        assert!(err.into_result().is_err());
    }

    #[test]
    fn test_header_helpers() {
        assert!(header_value("ok").is_ok());
        assert!(header_value("bad\nvalue").is_err());
        assert!(header_name("x-total").is_ok());
        assert!(header_name("bad name").is_err());
    }
}
