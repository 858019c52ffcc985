//! Endpoint registration on top of [`tessera_router`].

use std::sync::Arc;

use http::header::{HeaderValue, ALLOW};
use http::Method;
use tessera_core::ProblemDetail;
use tessera_router::{Lookup, RouteError, Router};

use crate::guard::{Guard, GuardChain, GuardVerdict};
use crate::handler::HttpHandler;
use crate::types::{error_response, BoxFuture, Request, Response, ResponseExt};

/// One method and pattern served by a handler.
pub struct Endpoint {
    method: Method,
    pattern: String,
    handler: Arc<dyn HttpHandler>,
    guards: GuardChain,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(method: Method, pattern: impl Into<String>, handler: impl HttpHandler) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            handler: Arc::new(handler),
            guards: GuardChain::new(),
        }
    }

    /// Adds a guard that runs after routing and before the handler.
    pub fn guard(mut self, guard: impl Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// The method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path pattern, e.g. `/users/{id}`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

/// A set of endpoints, itself an [`HttpHandler`].
///
/// Matched path parameters are stored in the request extensions, where
/// parameter hydration picks them up. Unmatched paths get a 404 problem,
/// matched paths with the wrong method a 405 problem with an `Allow` header.
///
/// # Example
///
/// ```rust
/// use tessera_core::HandlerError;
/// use tessera_extract::Empty;
/// use tessera_pipeline::{HydratedRequest, Reply, Routes, TypedHandler};
///
/// let health = TypedHandler::new(|_: HydratedRequest<Empty, Empty>| async {
///     Ok::<_, HandlerError>(Reply::ok("up"))
/// });
///
/// let routes = Routes::new().get("/health", health).unwrap();
/// assert_eq!(routes.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Routes {
    router: Router<Endpoint>,
}

impl Routes {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an endpoint.
    ///
    /// # Errors
    ///
    /// Fails on an invalid pattern, a duplicate method and pattern, or a
    /// parameter name that conflicts with an existing route.
    pub fn add(&mut self, endpoint: Endpoint) -> Result<(), RouteError> {
        let method = endpoint.method.clone();
        let pattern = endpoint.pattern.clone();
        self.router.insert(method.clone(), &pattern, endpoint)?;
        tracing::debug!(http.method = %method, pattern = %pattern, "registered endpoint");
        Ok(())
    }

    /// Registers an endpoint, builder style.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Result<Self, RouteError> {
        self.add(endpoint)?;
        Ok(self)
    }

    /// Registers a `GET` handler.
    pub fn get(self, pattern: &str, handler: impl HttpHandler) -> Result<Self, RouteError> {
        self.endpoint(Endpoint::new(Method::GET, pattern, handler))
    }

    /// Registers a `POST` handler.
    pub fn post(self, pattern: &str, handler: impl HttpHandler) -> Result<Self, RouteError> {
        self.endpoint(Endpoint::new(Method::POST, pattern, handler))
    }

    /// Registers a `PUT` handler.
    pub fn put(self, pattern: &str, handler: impl HttpHandler) -> Result<Self, RouteError> {
        self.endpoint(Endpoint::new(Method::PUT, pattern, handler))
    }

    /// Registers a `PATCH` handler.
    pub fn patch(self, pattern: &str, handler: impl HttpHandler) -> Result<Self, RouteError> {
        self.endpoint(Endpoint::new(Method::PATCH, pattern, handler))
    }

    /// Registers a `DELETE` handler.
    pub fn delete(self, pattern: &str, handler: impl HttpHandler) -> Result<Self, RouteError> {
        self.endpoint(Endpoint::new(Method::DELETE, pattern, handler))
    }

    /// Every registered endpoint.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.router.routes().into_iter().map(|(_, _, endpoint)| endpoint)
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    /// Routes `request` to its endpoint.
    pub async fn dispatch(&self, mut request: Request) -> Response {
        let path = request.uri().path().to_string();

        let (endpoint, params) = match self.router.lookup(request.method(), &path) {
            Lookup::Found(found) => (found.value, found.params),
            Lookup::MethodNotAllowed { allowed } => {
                tracing::debug!(http.method = %request.method(), http.path = %path, "method not allowed");
                return method_not_allowed(&allowed, &path);
            }
            Lookup::NotFound => {
                tracing::debug!(http.path = %path, "no route");
                let problem = ProblemDetail::not_found(format!("no route for {path}"))
                    .with_instance(path.as_str());
                return Response::problem(&problem);
            }
        };

        request.extensions_mut().insert(params);

        let request = match endpoint.guards.run(request).await {
            Ok(GuardVerdict::Proceed(request)) => request,
            Ok(GuardVerdict::Respond(response)) => return response,
            Err(err) => return error_response(err, &path),
        };

        endpoint.handler.call(request).await
    }
}

impl HttpHandler for Routes {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(self.dispatch(request))
    }
}

fn method_not_allowed(allowed: &[Method], path: &str) -> Response {
    let list = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let problem = ProblemDetail::method_not_allowed()
        .with_detail(format!("allowed methods: {list}"))
        .with_instance(path);

    let mut response = Response::problem(&problem);
    if let Ok(value) = HeaderValue::from_str(&list) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}
