//! Test client for in-memory HTTP testing.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use tessera_pipeline::HttpHandler;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// A test client for making in-memory HTTP requests.
///
/// Requests go straight into an [`HttpHandler`], usually a `Routes` table or
/// a single `TypedHandler`, without binding a port.
///
/// # Example
///
/// ```ignore
/// use tessera_test::TestClient;
///
/// let client = TestClient::new(routes);
///
/// let response = client.get("/orders/12").send().await;
/// response.assert_status(StatusCode::OK);
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    handler: Arc<dyn HttpHandler>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a new test client around `handler`.
    pub fn new(handler: impl HttpHandler) -> Self {
        Self::from_shared(Arc::new(handler))
    }

    /// Creates a test client around an already shared handler.
    pub fn from_shared(handler: Arc<dyn HttpHandler>) -> Self {
        Self {
            handler,
            default_headers: Vec::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Sends a built request and collects the response.
    pub async fn execute(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.handler.call(request.into_http_request()).await;
        TestResponse::from_http(response).await
    }
}

impl fmt::Debug for TestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClient")
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, mut builder: TestRequestBuilder) -> Self {
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Appends one query pair.
    pub fn query_param(mut self, key: &str, value: &str) -> Self {
        self.builder = self.builder.query_param(key, value);
        self
    }

    /// Appends the url-encoded form of `value` to the query string.
    pub fn query<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.query(value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http_body_util::Full;
    use tessera_pipeline::{BoxFuture, Request, Response};

    struct Echo;

    impl HttpHandler for Echo {
        fn call(&self, request: Request) -> BoxFuture<'_, Response> {
            Box::pin(async move {
                let (parts, body) = request.into_parts();
                let mut response = http::Response::new(body);
                *response.headers_mut() = parts.headers;
                response.headers_mut().insert(
                    "x-echo-target",
                    http::HeaderValue::from_str(&parts.uri.to_string())
                        .unwrap_or(http::HeaderValue::from_static("?")),
                );
                response.headers_mut().insert(
                    "x-echo-method",
                    http::HeaderValue::from_str(parts.method.as_str())
                        .unwrap_or(http::HeaderValue::from_static("?")),
                );
                response
            })
        }
    }

    struct Fixed(StatusCode);

    impl HttpHandler for Fixed {
        fn call(&self, _request: Request) -> BoxFuture<'_, Response> {
            let mut response = http::Response::new(Full::new(Bytes::from_static(b"fixed")));
            *response.status_mut() = self.0;
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn test_fixed_response() {
        let client = TestClient::new(Fixed(StatusCode::CREATED));
        let response = client.post("/items").send().await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.text().unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_request_reaches_handler() {
        let client = TestClient::new(Echo).with_default_header("X-Tenant", "acme");

        let response = client
            .patch("/orders/1")
            .query_param("verbose", "true")
            .bearer_token("t0k")
            .json(&serde_json::json!({"qty": 2}))
            .send()
            .await;

        response
            .assert_header("x-echo-method", "PATCH")
            .assert_header("x-echo-target", "/orders/1?verbose=true")
            .assert_header("x-tenant", "acme")
            .assert_header("authorization", "Bearer t0k")
            .assert_header("content-type", "application/json")
            .assert_json_eq(&serde_json::json!({"qty": 2}));
    }

    #[tokio::test]
    async fn test_custom_method() {
        let client = TestClient::new(Echo);
        let response = client.request(Method::OPTIONS, "/").send().await;
        response.assert_header("x-echo-method", "OPTIONS");
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let client = TestClient::new(Echo);
        let result = client.get("/").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
