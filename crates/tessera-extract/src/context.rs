//! Read-only view over the parts of a request parameters are resolved from.
//!
//! The [`ExtractionContext`] holds the method, URI, headers and captured path
//! parameters of one request. The query string is decoded once, up front, so
//! repeated lookups during hydration do not re-parse it.

use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use tessera_router::Params;

use crate::resolve::ParamSource;

/// Request data available to the parameter resolver.
///
/// # Example
///
/// ```rust
/// use tessera_extract::{ExtractionContext, ParamSource};
/// use tessera_router::Params;
/// use http::{HeaderMap, Method, Uri};
///
/// let mut params = Params::new();
/// params.push("id", "123");
///
/// let ctx = ExtractionContext::new(
///     Method::GET,
///     Uri::from_static("/users/123?page=2&page=3"),
///     HeaderMap::new(),
///     params,
/// );
///
/// assert_eq!(ctx.path_param("id"), Some("123"));
/// assert_eq!(ctx.query("page"), Some("2"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: Params,
    query: Vec<(String, String)>,
}

impl ExtractionContext {
    /// Creates a new extraction context.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, path_params: Params) -> Self {
        let query = decode_query(uri.query());
        Self {
            method,
            uri,
            headers,
            path_params,
            query,
        }
    }

    /// Creates a context from request parts.
    ///
    /// Path parameters are taken from the request extensions, where the
    /// route table stores them after a match; they are empty otherwise.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let path_params = parts.extensions.get::<Params>().cloned().unwrap_or_default();
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            path_params,
        )
    }

    /// Returns a builder, mostly useful in tests.
    #[must_use]
    pub fn builder() -> ExtractionContextBuilder {
        ExtractionContextBuilder::new()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns every decoded query pair, in order of appearance.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ParamSource for ExtractionContext {
    fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }
}

fn decode_query(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) if !q.is_empty() => serde_urlencoded::from_str(q).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "undecodable query string, treating it as empty");
            Vec::new()
        }),
        _ => Vec::new(),
    }
}

/// Builder for an [`ExtractionContext`].
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    path_params: Params,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method. Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. Defaults to `/`.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a single header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::try_from(name),
            http::HeaderValue::try_from(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Adds a single path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.path_params,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_first_value_wins() {
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/items?tag=a&tag=b&q=hello%20world"))
            .build();

        assert_eq!(ctx.query("tag"), Some("a"));
        assert_eq!(ctx.query("q"), Some("hello world"));
        assert_eq!(ctx.query("missing"), None);
        assert_eq!(ctx.query_pairs().count(), 3);
    }

    #[test]
    fn test_explicit_empty_query_value_is_present_but_empty() {
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/items?q="))
            .build();
        assert_eq!(ctx.query("q"), Some(""));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let ctx = ExtractionContext::builder()
            .header("X-Correlation-Id", "abc")
            .build();

        assert_eq!(ctx.header("x-correlation-id"), Some("abc"));
        assert_eq!(ctx.header("X-CORRELATION-ID"), Some("abc"));
    }

    #[test]
    fn test_non_utf8_header_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-raw",
            http::HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        let ctx = ExtractionContext::new(Method::GET, Uri::from_static("/"), headers, Params::new());
        assert_eq!(ctx.header("x-raw"), None);
    }

    #[test]
    fn test_from_parts_reads_params_extension() {
        let mut params = Params::new();
        params.push("id", "7");

        let mut request = http::Request::builder()
            .method(Method::DELETE)
            .uri("/users/7?hard=true")
            .body(())
            .unwrap();
        request.extensions_mut().insert(params);
        let (parts, ()) = request.into_parts();

        let ctx = ExtractionContext::from_parts(&parts);
        assert_eq!(ctx.method(), &Method::DELETE);
        assert_eq!(ctx.path(), "/users/7");
        assert_eq!(ctx.path_param("id"), Some("7"));
        assert_eq!(ctx.query("hard"), Some("true"));
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = ExtractionContext::builder().build();
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/");
        assert!(ctx.path_params().is_empty());
    }
}
