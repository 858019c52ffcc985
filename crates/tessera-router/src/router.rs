//! Method + pattern route table.

use http::Method;

use crate::error::RouteError;
use crate::node::{Node, Route, Segment};
use crate::params::Params;

/// A successful match: the registered value, its pattern and the captured
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// Value registered for the method and pattern.
    pub value: &'a T,
    /// Pattern the value was registered under, e.g. `/users/{id}`.
    pub pattern: &'a str,
    /// Captured path parameters.
    pub params: Params,
}

/// Result of [`Router::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// A route matched both path and method.
    Found(RouteMatch<'a, T>),
    /// The path matched but not the method.
    MethodNotAllowed {
        /// Methods registered for the path, in registration order.
        allowed: Vec<Method>,
    },
    /// Nothing matched the path.
    NotFound,
}

/// Route table keyed by exact method and `/segment/{param}` pattern.
///
/// Static segments take priority over parameters, so `/users/me` beats
/// `/users/{id}` for the path `/users/me`. Trailing and doubled slashes are
/// ignored on both sides.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use tessera_router::{Lookup, Router};
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/users/{id}", "getUser").unwrap();
///
/// match router.lookup(&Method::GET, "/users/42") {
///     Lookup::Found(m) => {
///         assert_eq!(*m.value, "getUser");
///         assert_eq!(m.params.get("id"), Some("42"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
///
/// assert!(matches!(
///     router.lookup(&Method::DELETE, "/users/42"),
///     Lookup::MethodNotAllowed { .. }
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            len: 0,
        }
    }

    /// Registers `value` for `method` on `pattern`.
    ///
    /// Fails if the pattern is malformed, if the method is already registered
    /// on an equivalent pattern, or if a parameter at the same position was
    /// registered under a different name.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouteError> {
        let segments = Segment::parse_pattern(pattern)?;
        self.root.insert(
            &segments,
            Route {
                method,
                pattern: pattern.to_string(),
                value,
            },
        )?;
        self.len += 1;
        Ok(())
    }

    /// Matches a request method and path.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();

        let Some(node) = self.root.find(&segments, &mut params) else {
            return Lookup::NotFound;
        };

        match node.route_for(method) {
            Some(route) => Lookup::Found(RouteMatch {
                value: &route.value,
                pattern: &route.pattern,
                params,
            }),
            None => Lookup::MethodNotAllowed {
                allowed: node.methods().cloned().collect(),
            },
        }
    }

    /// Lists every registered `(method, pattern, value)`.
    #[must_use]
    pub fn routes(&self) -> Vec<(&Method, &str, &T)> {
        let mut routes = Vec::with_capacity(self.len);
        self.root.collect_routes(&mut routes);
        routes
            .into_iter()
            .map(|r| (&r.method, r.pattern.as_str(), &r.value))
            .collect()
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
