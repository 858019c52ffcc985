//! Segment tree backing the [`Router`](crate::Router).
//!
//! Each node is one path segment. Static children are kept sorted for binary
//! search; at most one parameter child exists per node. Routes hang off the
//! node their pattern ends at, one entry per method.
//!
//! Static segments match the raw path. Captured values are percent-decoded.

use std::borrow::Cow;

use http::Method;
use percent_encoding::percent_decode_str;

use crate::error::RouteError;
use crate::params::Params;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Static(String),
    Param(String),
}

impl Segment {
    /// Splits a pattern like `/users/{id}` into segments.
    ///
    /// Empty segments are ignored, so `/users/` and `/users` are the same
    /// pattern.
    pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<Self>, RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::invalid(pattern, "must start with '/'"));
        }

        let mut segments = Vec::new();
        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            let segment = if let Some(inner) = raw.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| RouteError::invalid(pattern, format!("unclosed '{{' in '{raw}'")))?;
                if name.is_empty() || name.contains(['{', '}']) {
                    return Err(RouteError::invalid(
                        pattern,
                        format!("bad parameter segment '{raw}'"),
                    ));
                }
                if segments
                    .iter()
                    .any(|s| matches!(s, Self::Param(existing) if existing == name))
                {
                    return Err(RouteError::invalid(
                        pattern,
                        format!("parameter '{name}' appears twice"),
                    ));
                }
                Self::Param(name.to_string())
            } else if raw.contains(['{', '}']) {
                return Err(RouteError::invalid(
                    pattern,
                    format!("braces must wrap a whole segment, got '{raw}'"),
                ));
            } else {
                Self::Static(raw.to_string())
            };
            segments.push(segment);
        }
        Ok(segments)
    }
}

/// A value registered for one method on one pattern.
#[derive(Debug, Clone)]
pub(crate) struct Route<T> {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) value: T,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    segment: Segment,
    routes: Vec<Route<T>>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Self::new(Segment::Static(String::new()))
    }

    fn new(segment: Segment) -> Self {
        Self {
            segment,
            routes: Vec::new(),
            static_children: Vec::new(),
            param_child: None,
        }
    }

    fn key(&self) -> &str {
        match &self.segment {
            Segment::Static(s) | Segment::Param(s) => s,
        }
    }

    pub(crate) fn insert(
        &mut self,
        segments: &[Segment],
        route: Route<T>,
    ) -> Result<(), RouteError> {
        let Some((first, rest)) = segments.split_first() else {
            if self.routes.iter().any(|r| r.method == route.method) {
                return Err(RouteError::Duplicate {
                    method: route.method,
                    pattern: route.pattern,
                });
            }
            self.routes.push(route);
            return Ok(());
        };

        match first {
            Segment::Static(name) => {
                let idx = match self
                    .static_children
                    .binary_search_by(|c| c.key().cmp(name.as_str()))
                {
                    Ok(idx) => idx,
                    Err(idx) => {
                        self.static_children.insert(idx, Node::new(first.clone()));
                        idx
                    }
                };
                self.static_children[idx].insert(rest, route)
            }
            Segment::Param(name) => {
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Node::new(first.clone())));
                if let Segment::Param(existing) = &child.segment {
                    if existing != name {
                        return Err(RouteError::ConflictingParam {
                            pattern: route.pattern,
                            name: name.clone(),
                            existing: existing.clone(),
                        });
                    }
                }
                child.insert(rest, route)
            }
        }
    }

    /// Finds the node a concrete path ends at, capturing parameters.
    ///
    /// Static children are preferred over the parameter child; if the static
    /// branch dead-ends the parameter branch is tried with the captures
    /// rolled back.
    pub(crate) fn find<'a>(&'a self, segments: &[&str], params: &mut Params) -> Option<&'a Self> {
        let Some((first, rest)) = segments.split_first() else {
            return (!self.routes.is_empty()).then_some(self);
        };

        if let Ok(idx) = self
            .static_children
            .binary_search_by(|c| c.key().cmp(*first))
        {
            let mark = params.len();
            if let Some(found) = self.static_children[idx].find(rest, params) {
                return Some(found);
            }
            params.truncate(mark);
        }

        if let Some(child) = &self.param_child {
            if let Segment::Param(name) = &child.segment {
                let mark = params.len();
                params.push(name.clone(), decode_segment(first).into_owned());
                if let Some(found) = child.find(rest, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        None
    }

    pub(crate) fn route_for(&self, method: &Method) -> Option<&Route<T>> {
        self.routes.iter().find(|r| r.method == *method)
    }

    pub(crate) fn methods(&self) -> impl Iterator<Item = &Method> {
        self.routes.iter().map(|r| &r.method)
    }

    pub(crate) fn collect_routes<'a>(&'a self, out: &mut Vec<&'a Route<T>>) {
        out.extend(self.routes.iter());
        for child in &self.static_children {
            child.collect_routes(out);
        }
        if let Some(child) = &self.param_child {
            child.collect_routes(out);
        }
    }
}

/// Percent-decodes a captured segment. A value that does not decode to
/// UTF-8 is kept as sent.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: Method, pattern: &str, value: &'static str) -> Route<&'static str> {
        Route {
            method,
            pattern: pattern.to_string(),
            value,
        }
    }

    fn insert(root: &mut Node<&'static str>, method: Method, pattern: &str, value: &'static str) {
        let segments = Segment::parse_pattern(pattern).unwrap();
        root.insert(&segments, route(method, pattern, value)).unwrap();
    }

    #[test]
    fn test_parse_pattern() {
        assert_eq!(
            Segment::parse_pattern("/users/{id}/").unwrap(),
            vec![
                Segment::Static("users".to_string()),
                Segment::Param("id".to_string())
            ]
        );
        assert!(Segment::parse_pattern("/").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pattern_rejects_malformed() {
        for bad in ["users", "/users/{id", "/users/{}", "/a{b}", "/{id}/{id}"] {
            assert!(
                matches!(Segment::parse_pattern(bad), Err(RouteError::InvalidPattern { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_find_backtracks_from_static_branch() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users/me/settings", "settings");
        insert(&mut root, Method::GET, "/users/{id}", "user");

        let mut params = Params::new();
        let node = root.find(&["users", "me"], &mut params).unwrap();
        assert_eq!(node.route_for(&Method::GET).unwrap().value, "user");
        assert_eq!(params.get("id"), Some("me"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users/{id}", "user");

        let mut params = Params::new();
        root.find(&["users", "a%20b"], &mut params).unwrap();
        assert_eq!(params.get("id"), Some("a b"));

        let mut params = Params::new();
        root.find(&["users", "caf%C3%A9+x%2Fy"], &mut params).unwrap();
        assert_eq!(params.get("id"), Some("café+x/y"));

        let mut params = Params::new();
        root.find(&["users", "bad%FF"], &mut params).unwrap();
        assert_eq!(params.get("id"), Some("bad%FF"));
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users", "list");

        let segments = Segment::parse_pattern("/users").unwrap();
        let err = root
            .insert(&segments, route(Method::GET, "/users", "again"))
            .unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_conflicting_param_names_rejected() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users/{id}", "user");

        let segments = Segment::parse_pattern("/users/{userId}/posts").unwrap();
        let err = root
            .insert(&segments, route(Method::GET, "/users/{userId}/posts", "posts"))
            .unwrap_err();
        assert!(matches!(err, RouteError::ConflictingParam { .. }));
    }

    #[test]
    fn test_routes_walks_whole_tree() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/", "root");
        insert(&mut root, Method::GET, "/a", "a");
        insert(&mut root, Method::POST, "/a/{id}", "a-id");

        let mut routes = Vec::new();
        root.collect_routes(&mut routes);
        let mut values: Vec<_> = routes.iter().map(|r| r.value).collect();
        values.sort_unstable();
        assert_eq!(values, vec!["a", "a-id", "root"]);
    }
}
