//! Transform hooks.
//!
//! Hooks mutate the hydrated body or parameters before the action runs, or
//! the response payload before it is encoded. A failing hook is a server
//! fault: it is logged and the client sees a generic 500.

use std::sync::Arc;

use tessera_core::{HandlerError, RequestContext};

/// A transform applied to a value in place.
pub type Hook<T> = Arc<dyn Fn(&mut T, &RequestContext) -> anyhow::Result<()> + Send + Sync>;

/// The optional hooks of one handler.
pub struct Hooks<D, P, R> {
    pub(crate) on_data: Option<Hook<D>>,
    pub(crate) on_params: Option<Hook<P>>,
    pub(crate) on_response: Option<Hook<R>>,
}

impl<D, P, R> Default for Hooks<D, P, R> {
    fn default() -> Self {
        Self {
            on_data: None,
            on_params: None,
            on_response: None,
        }
    }
}

impl<D, P, R> Clone for Hooks<D, P, R> {
    fn clone(&self) -> Self {
        Self {
            on_data: self.on_data.clone(),
            on_params: self.on_params.clone(),
            on_response: self.on_response.clone(),
        }
    }
}

impl<D, P, R> std::fmt::Debug for Hooks<D, P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_data", &self.on_data.is_some())
            .field("on_params", &self.on_params.is_some())
            .field("on_response", &self.on_response.is_some())
            .finish()
    }
}

/// Runs `hook` on `value`, if set.
pub(crate) fn apply<T>(
    hook: Option<&Hook<T>>,
    stage: &'static str,
    value: &mut T,
    ctx: &RequestContext,
) -> Result<(), HandlerError> {
    let Some(hook) = hook else {
        return Ok(());
    };
    hook(value, ctx).map_err(|err| {
        tracing::error!(hook = stage, error = %err, "transform hook failed");
        HandlerError::Internal(err.context(format!("{stage} hook failed")))
    })
}
