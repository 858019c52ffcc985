//! The request hydration orchestrator.
//!
//! A [`TypedHandler`] turns a raw request into a [`HydratedRequest`], runs
//! the action, and writes the reply. The stages run in a fixed order and the
//! first failing stage decides the response:
//!
//! 1. Guards
//! 2. Parameter hydration
//! 3. Body decoding and validation (skipped for [`Empty`] bodies)
//! 4. `on_data` and `on_params` hooks
//! 5. The action
//! 6. Redirect, bare status, or `on_response` hook plus encoding

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tessera_core::{HandlerError, RequestContext, RequestId, REQUEST_ID_HEADER};
use tessera_extract::{
    decode_body, hydrate_params, BindParams, Codec, Empty, ExtractionContext, HydrationError,
    JsonCodec, DEFAULT_MAX_BODY_BYTES,
};
use tracing::Instrument;
use validator::Validate;

use crate::guard::{Guard, GuardChain, GuardVerdict};
use crate::hooks::{self, Hooks};
use crate::reply::{Outcome, Reply};
use crate::request::HydratedRequest;
use crate::types::{error_response, BoxFuture, Request, Response, ResponseExt};

type Action<D, P, R> =
    Arc<dyn Fn(HydratedRequest<D, P>) -> BoxFuture<'static, Outcome<R>> + Send + Sync>;

/// Anything that turns a request into a response.
///
/// Object safe, so routers can store handlers of different types together.
pub trait HttpHandler: Send + Sync + 'static {
    /// Handles one request. Never fails; errors become problem responses.
    fn call(&self, request: Request) -> BoxFuture<'_, Response>;
}

impl<H: HttpHandler + ?Sized> HttpHandler for Arc<H> {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        (**self).call(request)
    }
}

/// Per-handler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
    /// Reuse a valid incoming `x-request-id` and echo the request ID on the
    /// response.
    pub propagate_request_id: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            propagate_request_id: true,
        }
    }
}

/// A handler with a typed body `D`, parameters `P` and reply payload `R`.
///
/// # Example
///
/// ```rust
/// use tessera_extract::Empty;
/// use tessera_pipeline::{HydratedRequest, Reply, TypedHandler};
/// use tessera_core::HandlerError;
///
/// let handler = TypedHandler::new(|_req: HydratedRequest<Empty, Empty>| async {
///     Ok::<_, HandlerError>(Reply::ok("pong"))
/// })
/// .named("ping");
/// assert_eq!(handler.name(), Some("ping"));
/// ```
pub struct TypedHandler<D, P, R, C = JsonCodec> {
    name: Option<String>,
    action: Action<D, P, R>,
    guards: GuardChain,
    hooks: Hooks<D, P, R>,
    codec: C,
    config: HandlerConfig,
}

impl<D, P, R> TypedHandler<D, P, R, JsonCodec>
where
    D: DeserializeOwned + Validate + Send + 'static,
    P: BindParams,
    R: Serialize + Send + 'static,
{
    /// Creates a JSON handler around `action`.
    ///
    /// The action may return anything convertible to an [`Outcome`],
    /// typically `Result<Reply<R>, E>` with `E: Into<HandlerError>`.
    pub fn new<F, Fut, O>(action: F) -> Self
    where
        F: Fn(HydratedRequest<D, P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<Outcome<R>> + 'static,
    {
        let action: Action<D, P, R> =
            Arc::new(move |request| -> BoxFuture<'static, Outcome<R>> {
                let fut = action(request);
                Box::pin(async move { fut.await.into() })
            });

        Self {
            name: None,
            action,
            guards: GuardChain::new(),
            hooks: Hooks::default(),
            codec: JsonCodec,
            config: HandlerConfig::default(),
        }
    }
}

impl<D, P, R, C> TypedHandler<D, P, R, C>
where
    D: DeserializeOwned + Validate + Send + 'static,
    P: BindParams,
    R: Serialize + Send + 'static,
    C: Codec,
{
    /// Swaps the body codec.
    pub fn with_codec<C2: Codec>(self, codec: C2) -> TypedHandler<D, P, R, C2> {
        TypedHandler {
            name: self.name,
            action: self.action,
            guards: self.guards,
            hooks: self.hooks,
            codec,
            config: self.config,
        }
    }

    /// Names the endpoint for logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a guard.
    pub fn guard(mut self, guard: impl Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Sets the hook run on the decoded body before the action.
    pub fn on_data<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut D, &RequestContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_data = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run on the hydrated parameters before the action.
    pub fn on_params<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut P, &RequestContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_params = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run on the reply payload before encoding.
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut R, &RequestContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_response = Some(Arc::new(hook));
        self
    }

    /// Replaces the settings.
    pub fn config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the body size limit.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    /// The endpoint name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The active settings.
    pub fn settings(&self) -> &HandlerConfig {
        &self.config
    }

    /// Handles one request.
    ///
    /// Every failure is rendered as an `application/problem+json` response.
    pub async fn handle(&self, request: Request) -> Response {
        let ctx = self.context_for(&request);
        let path = request.uri().path().to_string();
        let span = tracing::info_span!(
            "tessera.request",
            request_id = %ctx.request_id(),
            http.method = %request.method(),
            http.path = %path,
            endpoint = ctx.endpoint().unwrap_or("-"),
        );

        async move {
            // Problems after the guard stage name the request the guards let through.
            let (result, instance) = match self.guards.run(request).await {
                Ok(GuardVerdict::Proceed(request)) => {
                    let instance = request.uri().path().to_string();
                    (self.run(request, &ctx).await, instance)
                }
                Ok(GuardVerdict::Respond(response)) => (Ok(response), path),
                Err(err) => (Err(err), path),
            };
            let mut response = match result {
                Ok(response) => response,
                Err(err) => error_response(err, &instance),
            };

            if self.config.propagate_request_id {
                if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
            }

            tracing::info!(
                http.status_code = response.status().as_u16(),
                duration_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX),
                "request completed"
            );
            response
        }
        .instrument(span)
        .await
    }

    fn context_for(&self, request: &Request) -> RequestContext {
        let incoming = if self.config.propagate_request_id {
            request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(RequestId::parse)
        } else {
            None
        };

        let ctx = incoming.map_or_else(RequestContext::new, RequestContext::with_request_id);
        match &self.name {
            Some(name) => ctx.with_endpoint(name.clone()),
            None => ctx,
        }
    }

    async fn run(&self, request: Request, ctx: &RequestContext) -> Result<Response, HandlerError> {
        let (parts, body) = request.into_parts();

        let mut params: P = hydrate_params(&ExtractionContext::from_parts(&parts)).map_err(|err| {
            if let HydrationError::Invalid(violations) = &err {
                tracing::debug!(violations = violations.len(), "parameter hydration failed");
            }
            HandlerError::from(err)
        })?;

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        let mut data = self.decode(&body)?;

        hooks::apply(self.hooks.on_data.as_ref(), "on_data", &mut data, ctx)?;
        hooks::apply(self.hooks.on_params.as_ref(), "on_params", &mut params, ctx)?;

        let request = HydratedRequest::new(parts, body, data, params, ctx.clone());
        let reply = (self.action)(request).await.into_result()?;

        self.respond(reply, ctx)
    }

    fn decode(&self, body: &Bytes) -> Result<D, HandlerError> {
        let empty: Box<dyn Any> = Box::new(Empty);
        if let Ok(data) = empty.downcast::<D>() {
            return Ok(*data);
        }
        Ok(decode_body::<D, C>(&self.codec, body, self.config.max_body_bytes)?)
    }

    fn respond(&self, reply: Reply<R>, ctx: &RequestContext) -> Result<Response, HandlerError> {
        let (status, headers, payload, redirect) = reply.into_parts();

        if let Some(location) = redirect {
            let location = HeaderValue::try_from(location).map_err(HandlerError::internal)?;
            let status = if status.is_redirection() {
                status
            } else {
                StatusCode::FOUND
            };
            let mut response = Response::empty(status);
            response.headers_mut().extend(headers);
            response.headers_mut().insert(LOCATION, location);
            return Ok(response);
        }

        let Some(mut payload) = payload else {
            let mut response = Response::empty(status);
            response.headers_mut().extend(headers);
            return Ok(response);
        };

        hooks::apply(self.hooks.on_response.as_ref(), "on_response", &mut payload, ctx)?;
        let encoded = self.codec.encode(&payload).map_err(HandlerError::internal)?;

        let mut response = http::Response::new(Full::new(Bytes::from(encoded)));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(self.codec.content_type()));
        response.headers_mut().extend(headers);
        Ok(response)
    }
}

impl<D, P, R, C> HttpHandler for TypedHandler<D, P, R, C>
where
    D: DeserializeOwned + Validate + Send + 'static,
    P: BindParams,
    R: Serialize + Send + 'static,
    C: Codec,
{
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(self.handle(request))
    }
}

impl<D, P, R, C> std::fmt::Debug for TypedHandler<D, P, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedHandler")
            .field("name", &self.name)
            .field("guards", &self.guards)
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
