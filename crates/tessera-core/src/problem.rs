//! Problem Details documents.
//!
//! Every failure a client can observe is rendered as a [`ProblemDetail`]: a
//! structured document in the spirit of RFC 9457 extended with a stable,
//! machine-readable `code`. The mapping from [`ProblemKind`] to status, code,
//! title and type URI is fixed; only the `detail` text may be overridden.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "type": "urn:tessera:problem:bad-parameters",
//!   "title": "Bad Parameters",
//!   "detail": "one or more parameters are invalid",
//!   "status": 400,
//!   "code": "BAD_PARAMETERS",
//!   "instance": "/users",
//!   "violations": [
//!     { "parameter": "page", "detail": "must be a valid int", "type": "query" }
//!   ]
//! }
//! ```

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Media type used for problem responses.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Prefix shared by every problem type URI.
pub const PROBLEM_TYPE_PREFIX: &str = "urn:tessera:problem:";

/// Extension key holding the list of [`Violation`]s.
pub const VIOLATIONS_KEY: &str = "violations";

// Standard members an extension may not shadow.
const RESERVED_MEMBERS: [&str; 6] = ["type", "title", "status", "code", "detail", "instance"];

/// The canonical failure scenarios a handler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// The request is malformed (empty or undecodable body, oversized payload).
    BadRequest,
    /// One or more query, header or path parameters are invalid.
    BadParameters,
    /// The decoded body violates structural constraints.
    ConstraintViolation,
    /// The request is well-formed but breaks a domain rule.
    BusinessRuleViolation,
    /// The resource does not exist.
    NotFound,
    /// No endpoint accepts the request method for this path.
    MethodNotAllowed,
    /// The caller is authenticated but not allowed.
    Forbidden,
    /// The caller is not authenticated.
    Unauthorized,
    /// The request conflicts with the current resource state.
    Conflict,
    /// Something failed on our side.
    ServerError,
}

impl ProblemKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::BadRequest,
        Self::BadParameters,
        Self::ConstraintViolation,
        Self::BusinessRuleViolation,
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::Forbidden,
        Self::Unauthorized,
        Self::Conflict,
        Self::ServerError,
    ];

    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest | Self::BadParameters => StatusCode::BAD_REQUEST,
            Self::ConstraintViolation | Self::BusinessRuleViolation => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::BadParameters => "BAD_PARAMETERS",
            Self::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Self::BusinessRuleViolation => "BUSINESS_RULE_VIOLATION",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Forbidden => "FORBIDDEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::ServerError => "SERVER_ERROR",
        }
    }

    /// Returns the human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::BadParameters => "Bad Parameters",
            Self::ConstraintViolation => "Constraint Violation",
            Self::BusinessRuleViolation => "Business Rule Violation",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::Forbidden => "Forbidden",
            Self::Unauthorized => "Unauthorized",
            Self::Conflict => "Conflict",
            Self::ServerError => "Server Error",
        }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::BadRequest => "bad-request",
            Self::BadParameters => "bad-parameters",
            Self::ConstraintViolation => "constraint-violation",
            Self::BusinessRuleViolation => "business-rule-violation",
            Self::NotFound => "not-found",
            Self::MethodNotAllowed => "method-not-allowed",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::ServerError => "server-error",
        }
    }

    /// Returns the problem type URI.
    #[must_use]
    pub fn type_uri(self) -> String {
        format!("{PROBLEM_TYPE_PREFIX}{}", self.slug())
    }

    /// Returns the detail used when the caller does not provide one.
    #[must_use]
    pub const fn default_detail(self) -> &'static str {
        match self {
            Self::BadRequest => "the request could not be processed",
            Self::BadParameters => "one or more parameters are invalid",
            Self::ConstraintViolation => "the request body violates one or more constraints",
            Self::BusinessRuleViolation => "the request violates a business rule",
            Self::NotFound => "the requested resource was not found",
            Self::MethodNotAllowed => "the request method is not supported for this resource",
            Self::Forbidden => "access to this resource is forbidden",
            Self::Unauthorized => "authentication is required",
            Self::Conflict => "the request conflicts with the current state of the resource",
            Self::ServerError => "an unexpected error occurred",
        }
    }

    /// Whether documents of this kind always carry a `violations` array.
    #[must_use]
    pub const fn carries_violations(self) -> bool {
        matches!(self, Self::BadParameters | Self::ConstraintViolation)
    }

    /// Looks a kind up by its machine-readable code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

/// A single parameter- or field-level failure.
///
/// Parameter violations name the offending parameter and where it came from
/// (`query`, `header`, `path`); body violations carry a JSON-pointer-like
/// locator instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Reported parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Location of the offending body field, e.g. `/inner/thing`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// What is wrong.
    pub detail: String,
    /// Source of the parameter.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Violation {
    /// Creates a parameter violation.
    ///
    /// An empty `source` is treated as "unknown" and omitted on the wire.
    #[must_use]
    pub fn parameter(
        name: impl Into<String>,
        detail: impl Into<String>,
        source: Option<&str>,
    ) -> Self {
        Self {
            parameter: Some(name.into()),
            pointer: None,
            detail: detail.into(),
            source: source.filter(|s| !s.is_empty()).map(ToString::to_string),
        }
    }

    /// Creates a body violation located by `pointer`.
    #[must_use]
    pub fn pointer(pointer: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            parameter: None,
            pointer: Some(pointer.into()),
            detail: detail.into(),
            source: None,
        }
    }
}

/// A client-facing error document.
///
/// Built with one of the kind-specific constructors and refined with the
/// `with_*` methods before it leaves the failing stage.
///
/// # Example
///
/// ```
/// use tessera_core::{ProblemDetail, Violation};
///
/// let problem = ProblemDetail::bad_parameters(vec![Violation::parameter(
///     "page",
///     "must be a valid int",
///     Some("query"),
/// )]);
///
/// assert_eq!(problem.status(), 400);
/// assert_eq!(problem.code(), "BAD_PARAMETERS");
/// assert_eq!(problem.violations().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{title} ({status}): {detail}")]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    type_uri: String,
    title: String,
    detail: String,
    status: u16,
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    #[serde(flatten)]
    extensions: IndexMap<String, Value>,
}

impl ProblemDetail {
    /// Creates a document for `kind` with its default detail.
    #[must_use]
    pub fn new(kind: ProblemKind) -> Self {
        let mut extensions = IndexMap::new();
        if kind.carries_violations() {
            extensions.insert(VIOLATIONS_KEY.to_string(), Value::Array(Vec::new()));
        }
        Self {
            type_uri: kind.type_uri(),
            title: kind.title().to_string(),
            detail: kind.default_detail().to_string(),
            status: kind.status().as_u16(),
            code: kind.code().to_string(),
            instance: None,
            extensions,
        }
    }

    /// 400, for malformed requests.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::BadRequest).with_detail(detail)
    }

    /// 400, enumerating invalid parameters.
    #[must_use]
    pub fn bad_parameters(violations: Vec<Violation>) -> Self {
        Self::new(ProblemKind::BadParameters).with_violations(violations)
    }

    /// 422, enumerating body constraint failures.
    #[must_use]
    pub fn constraint_violation(violations: Vec<Violation>) -> Self {
        Self::new(ProblemKind::ConstraintViolation).with_violations(violations)
    }

    /// 422, for domain rule failures.
    #[must_use]
    pub fn business_rule_violation(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::BusinessRuleViolation).with_detail(detail)
    }

    /// 404.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::NotFound).with_detail(detail)
    }

    /// 405.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(ProblemKind::MethodNotAllowed)
    }

    /// 403.
    #[must_use]
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Forbidden).with_detail(detail)
    }

    /// 401.
    #[must_use]
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Unauthorized).with_detail(detail)
    }

    /// 409.
    #[must_use]
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Conflict).with_detail(detail)
    }

    /// 500 with the generic detail. Internal error text never goes here.
    #[must_use]
    pub fn server_error() -> Self {
        Self::new(ProblemKind::ServerError)
    }

    /// Overrides the detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Sets the instance URI.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Adds or replaces an extension member.
    ///
    /// Keys that name a standard member (`type`, `title`, `status`, `code`,
    /// `detail`, `instance`) are ignored.
    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if RESERVED_MEMBERS.contains(&key.as_str()) {
            tracing::debug!(key = %key, "ignoring extension that shadows a standard member");
            return self;
        }
        self.extensions.insert(key, value.into());
        self
    }

    /// Replaces the `violations` extension.
    #[must_use]
    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        let values = serde_json::to_value(&violations).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to serialize violations");
            Value::Array(Vec::new())
        });
        self.extensions.insert(VIOLATIONS_KEY.to_string(), values);
        self
    }

    /// Returns the type URI.
    #[must_use]
    pub fn type_uri(&self) -> &str {
        &self.type_uri
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the numeric status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the status as an [`http::StatusCode`].
    ///
    /// Falls back to 500 if the document carries an out-of-range status.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the kind matching this document's code, if it is a known one.
    #[must_use]
    pub fn kind(&self) -> Option<ProblemKind> {
        ProblemKind::from_code(&self.code)
    }

    /// Returns the instance URI if set.
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Returns the extension members.
    #[must_use]
    pub fn extensions(&self) -> &IndexMap<String, Value> {
        &self.extensions
    }

    /// Returns whether the document has a `violations` extension.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.extensions.contains_key(VIOLATIONS_KEY)
    }

    /// Returns the decoded `violations` extension (empty if absent or malformed).
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.extensions
            .get(VIOLATIONS_KEY)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

impl From<ProblemKind> for ProblemDetail {
    fn from(kind: ProblemKind) -> Self {
        Self::new(kind)
    }
}
