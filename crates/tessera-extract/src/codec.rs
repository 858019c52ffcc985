//! Wire codecs for request and response bodies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Failure to decode or encode a body.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not a valid document of the expected shape.
    #[error("{0}")]
    Decode(String),

    /// The value could not be serialised.
    #[error("{0}")]
    Encode(String),
}

/// Converts between body bytes and typed values.
///
/// Handlers are generic over their codec; [`JsonCodec`] is the default.
pub trait Codec: Send + Sync + 'static {
    /// Media type written to `Content-Type` on encoded responses.
    fn content_type(&self) -> &'static str;

    /// Decodes a request body.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    /// Encodes a response payload.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;
}

/// JSON via `serde_json`.
///
/// # Example
///
/// ```rust
/// use tessera_extract::{Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let n: u32 = codec.decode(b"42").unwrap();
/// assert_eq!(n, 42);
/// assert_eq!(codec.encode(&vec![1, 2]).unwrap(), b"[1,2]");
/// assert_eq!(codec.content_type(), "application/json");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }
}
