//! Test response wrapper.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use tessera_core::{ProblemDetail, Violation, APPLICATION_PROBLEM_JSON, REQUEST_ID_HEADER};

use crate::error::TestError;

/// A collected response with helper methods for assertions.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects an HTTP response into a test response.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body_util::BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the echoed `x-request-id`.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header_str(REQUEST_ID_HEADER)
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON Value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Returns true if the response carries `application/problem+json`.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.starts_with(APPLICATION_PROBLEM_JSON))
    }

    /// Decodes the body as a problem document.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let response = client.get("/orders/abc").send().await;
    /// let problem = response.problem().unwrap();
    /// assert_eq!(problem.code(), "BAD_PARAMETERS");
    /// ```
    pub fn problem(&self) -> Result<ProblemDetail, TestError> {
        if !self.is_problem() {
            return Err(TestError::NotProblem(format!(
                "content-type is {:?}",
                self.content_type()
            )));
        }
        self.json()
    }

    /// The `violations` of the problem document, in response order.
    pub fn violations(&self) -> Result<Vec<Violation>, TestError> {
        Ok(self.problem()?.violations())
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {} with body {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(
            actual, expected,
            "Header '{}': expected '{}', got '{}'",
            name, expected, actual
        );
        self
    }

    /// Asserts that the JSON body matches the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or doesn't match.
    pub fn assert_json_eq(&self, expected: &serde_json::Value) -> &Self {
        let actual = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body should be valid JSON: {e}"));
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts that a JSON field exists and equals the expected value.
    ///
    /// `path` is dot separated; numeric segments index arrays, as in
    /// `violations.0.parameter`.
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &serde_json::Value) -> &Self {
        let path = path.as_ref();
        let json = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body should be valid JSON: {e}"));
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("JSON path '{}' not found in: {}", path, json));
        assert_eq!(
            actual, expected,
            "JSON field '{}': expected {}, got {}",
            path, expected, actual
        );
        self
    }

    /// Asserts a problem response with the given status and `code`.
    ///
    /// # Panics
    ///
    /// Panics if the response is not a problem document or either value differs.
    pub fn assert_problem(&self, status: StatusCode, code: &str) -> &Self {
        self.assert_status(status);
        let problem = self
            .problem()
            .unwrap_or_else(|e| panic!("Expected a problem document: {e}"));
        assert_eq!(problem.code(), code, "Problem code mismatch");
        assert_eq!(problem.status(), status.as_u16(), "Problem status member mismatch");
        self
    }

    /// Asserts that the problem document lists exactly `expected`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the violations differ.
    pub fn assert_violations(&self, expected: &[Violation]) -> &Self {
        let actual = self
            .violations()
            .unwrap_or_else(|e| panic!("Expected a problem document: {e}"));
        assert_eq!(actual, expected, "Violations mismatch");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(segment)?,
        };
    }
    Some(current)
}
