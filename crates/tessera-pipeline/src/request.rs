//! The value an action receives.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use tessera_core::RequestContext;

/// A request after guards, parameter hydration and body decoding.
///
/// `data` and `params` are public so actions can destructure them. The raw
/// body stays available through [`HydratedRequest::body`].
#[derive(Debug)]
pub struct HydratedRequest<D, P> {
    /// The decoded and validated body.
    pub data: D,
    /// The hydrated and validated parameters.
    pub params: P,
    parts: Parts,
    body: Bytes,
    context: RequestContext,
}

impl<D, P> HydratedRequest<D, P> {
    pub(crate) fn new(parts: Parts, body: Bytes, data: D, params: P, context: RequestContext) -> Self {
        Self {
            data,
            params,
            parts,
            body,
            context,
        }
    }

    /// The raw request body, byte for byte as received.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Request metadata, including extensions set by guards or routing.
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Per-request context.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Splits off the hydrated values.
    pub fn into_inner(self) -> (D, P) {
        (self.data, self.params)
    }
}
