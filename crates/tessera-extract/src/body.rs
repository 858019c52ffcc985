//! The body stage: size limit, decode, validate.

use serde::de::DeserializeOwned;
use tessera_core::ProblemDetail;
use validator::Validate;

use crate::codec::Codec;
use crate::validate::body_violations;

/// Default cap on request bodies, 2 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Detail of the problem returned for an empty body.
pub const EMPTY_BODY_DETAIL: &str = "empty request body";

/// Decodes and validates a fully read request body.
///
/// # Errors
///
/// - 400 bad request if `bytes` is larger than `max_bytes`, empty, or not
///   decodable by `codec`. None of these carry violations.
/// - 422 constraint violation listing every failed rule, located by pointer.
///
/// # Example
///
/// ```rust
/// use tessera_extract::{decode_body, JsonCodec};
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Debug, Deserialize, Validate)]
/// struct NewUser {
///     #[validate(length(min = 1))]
///     name: String,
/// }
///
/// let user: NewUser = decode_body(&JsonCodec, br#"{"name":"Ada"}"#, 1024).unwrap();
/// assert_eq!(user.name, "Ada");
///
/// let problem = decode_body::<NewUser, _>(&JsonCodec, b"", 1024).unwrap_err();
/// assert_eq!(problem.detail(), "empty request body");
/// ```
pub fn decode_body<D, C>(codec: &C, bytes: &[u8], max_bytes: usize) -> Result<D, ProblemDetail>
where
    D: DeserializeOwned + Validate,
    C: Codec,
{
    if bytes.len() > max_bytes {
        tracing::debug!(size = bytes.len(), limit = max_bytes, "request body over limit");
        return Err(ProblemDetail::bad_request(format!(
            "request body exceeds the limit of {max_bytes} bytes"
        )));
    }
    if bytes.is_empty() {
        return Err(ProblemDetail::bad_request(EMPTY_BODY_DETAIL));
    }

    let data: D = codec.decode(bytes).map_err(|err| {
        tracing::debug!(error = %err, "request body could not be decoded");
        ProblemDetail::bad_request(format!("request body could not be decoded: {err}"))
    })?;

    if let Err(errors) = data.validate() {
        let violations = body_violations(&errors);
        tracing::debug!(violations = violations.len(), "request body failed validation");
        return Err(ProblemDetail::constraint_violation(violations));
    }

    Ok(data)
}
