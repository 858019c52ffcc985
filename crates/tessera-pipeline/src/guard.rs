//! Guards: pre-hydration interceptors.
//!
//! A guard sees the raw request before any parameter or body work happens.
//! It can let the request through untouched, swap in a different request,
//! answer the request itself, or fail with a [`HandlerError`] that is
//! rendered like any other handler failure.

use std::sync::Arc;

use tessera_core::HandlerError;

use crate::types::{BoxFuture, Request, Response};

/// What a guard decided.
#[derive(Debug)]
pub enum GuardOutcome {
    /// Proceed with the request as it is.
    Continue,
    /// Proceed with this request instead.
    Replace(Request),
    /// Stop and send this response.
    Respond(Response),
}

/// An interceptor run before hydration.
///
/// # Example
///
/// ```rust
/// use tessera_core::{HandlerError, ProblemDetail};
/// use tessera_pipeline::{BoxFuture, Guard, GuardOutcome, Request};
///
/// struct RequireApiKey;
///
/// impl Guard for RequireApiKey {
///     fn name(&self) -> &'static str {
///         "require_api_key"
///     }
///
///     fn intercept<'a>(
///         &'a self,
///         request: &'a Request,
///     ) -> BoxFuture<'a, Result<GuardOutcome, HandlerError>> {
///         Box::pin(async move {
///             if request.headers().contains_key("x-api-key") {
///                 Ok(GuardOutcome::Continue)
///             } else {
///                 Err(ProblemDetail::unauthorized("missing API key").into())
///             }
///         })
///     }
/// }
/// ```
pub trait Guard: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Inspects `request` and decides how to proceed.
    fn intercept<'a>(&'a self, request: &'a Request)
        -> BoxFuture<'a, Result<GuardOutcome, HandlerError>>;
}

/// A guard backed by a synchronous closure.
///
/// Created with [`guard_fn`].
pub struct FnGuard<F> {
    name: &'static str,
    f: F,
}

/// Wraps a closure as a [`Guard`].
///
/// # Example
///
/// ```rust
/// use tessera_core::ProblemDetail;
/// use tessera_pipeline::{guard_fn, GuardOutcome};
///
/// let guard = guard_fn("no_admin", |request| {
///     if request.uri().path().starts_with("/admin") {
///         Err(ProblemDetail::forbidden("admin area").into())
///     } else {
///         Ok(GuardOutcome::Continue)
///     }
/// });
/// ```
pub fn guard_fn<F>(name: &'static str, f: F) -> FnGuard<F>
where
    F: Fn(&Request) -> Result<GuardOutcome, HandlerError> + Send + Sync + 'static,
{
    FnGuard { name, f }
}

impl<F> Guard for FnGuard<F>
where
    F: Fn(&Request) -> Result<GuardOutcome, HandlerError> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn intercept<'a>(
        &'a self,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<GuardOutcome, HandlerError>> {
        let outcome = (self.f)(request);
        Box::pin(async move { outcome })
    }
}

/// Result of running a [`GuardChain`].
#[derive(Debug)]
pub enum GuardVerdict {
    /// Every guard let the request through; this is the request to hydrate.
    Proceed(Request),
    /// A guard answered the request.
    Respond(Response),
}

/// Guards run in registration order.
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a guard.
    pub fn push(&mut self, guard: impl Guard) {
        self.guards.push(Arc::new(guard));
    }

    /// Appends a shared guard.
    pub fn push_shared(&mut self, guard: Arc<dyn Guard>) {
        self.guards.push(guard);
    }

    /// Number of guards.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// True if there are no guards.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Runs every guard in order.
    ///
    /// A replaced request is what the next guard sees. The first guard that
    /// responds or fails stops the chain.
    pub async fn run(&self, mut request: Request) -> Result<GuardVerdict, HandlerError> {
        for guard in &self.guards {
            let outcome = guard.intercept(&request).await.map_err(|err| {
                tracing::debug!(guard = guard.name(), "guard rejected request");
                err
            })?;

            match outcome {
                GuardOutcome::Continue => {}
                GuardOutcome::Replace(next) => {
                    tracing::debug!(guard = guard.name(), "guard replaced request");
                    request = next;
                }
                GuardOutcome::Respond(response) => {
                    tracing::debug!(
                        guard = guard.name(),
                        status = response.status().as_u16(),
                        "guard answered request"
                    );
                    return Ok(GuardVerdict::Respond(response));
                }
            }
        }
        Ok(GuardVerdict::Proceed(request))
    }
}

impl std::fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.guards.iter().map(|g| g.name()))
            .finish()
    }
}
