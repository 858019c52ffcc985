//! Source resolution: turning a descriptor into a raw value.
//!
//! For each bindable field the resolver walks the declared sources in order
//! and keeps the first non-empty value. An explicitly empty value such as
//! `?q=` counts as absent. A `default` pair ends the walk where it stands:
//! its literal is returned even if a later source would have matched.

use crate::bind::{descriptors, BindParams};
use crate::descriptor::{FieldDescriptor, SourceKind, DEFAULT_KEY};

/// Raw lookups the resolver performs against a request.
pub trait ParamSource {
    /// First value of query key `key`.
    fn query(&self, key: &str) -> Option<&str>;

    /// Value of header `name`; lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;

    /// Captured path parameter `name`.
    fn path_param(&self, name: &str) -> Option<&str>;

    /// Dispatches on `kind`. Defaults are not a lookup source and yield `None`.
    fn lookup(&self, kind: SourceKind, key: &str) -> Option<&str> {
        match kind {
            SourceKind::Query => self.query(key),
            SourceKind::Header => self.header(key),
            SourceKind::Path => self.path_param(key),
            SourceKind::Default => None,
        }
    }
}

/// Outcome of resolving one field against one request.
///
/// An empty `value` means nothing was found; `actual_key` and `source` then
/// point at the canonical source so a "required" failure names the right
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    /// Canonical name of the field's descriptor.
    pub canonical_name: String,
    /// Key the value was found under, or `"default"`.
    pub actual_key: String,
    /// Source the value was found in.
    pub source: SourceKind,
    /// Raw value; empty if nothing was found.
    pub value: String,
}

impl ResolvedParam {
    /// True if the value is the declared default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.source == SourceKind::Default
    }

    /// True if the raw value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The name shown to clients: the actual key, else the canonical name,
    /// else the Rust field name.
    #[must_use]
    pub fn report_name<'a>(&'a self, field: &'a str) -> &'a str {
        if !self.actual_key.is_empty() {
            &self.actual_key
        } else if !self.canonical_name.is_empty() {
            &self.canonical_name
        } else {
            field
        }
    }
}

/// Resolves one descriptor against `source`.
///
/// # Example
///
/// ```rust
/// use tessera_extract::{resolve, ExtractionContext, FieldDescriptor, SourceKind};
/// use http::Uri;
///
/// let desc = FieldDescriptor::parse("query=q,header=X-Query,default=all").unwrap();
///
/// let ctx = ExtractionContext::builder()
///     .uri(Uri::from_static("/search?q="))
///     .header("x-query", "rust")
///     .build();
/// let resolved = resolve(&ctx, &desc);
/// assert_eq!(resolved.value, "rust");
/// assert_eq!(resolved.actual_key, "X-Query");
/// assert_eq!(resolved.source, SourceKind::Header);
///
/// let resolved = resolve(&ExtractionContext::builder().build(), &desc);
/// assert_eq!(resolved.value, "all");
/// assert!(resolved.is_default());
/// ```
#[must_use]
pub fn resolve<S: ParamSource + ?Sized>(source: &S, descriptor: &FieldDescriptor) -> ResolvedParam {
    let canonical_name = descriptor.canonical_name().to_string();

    for candidate in descriptor.sources() {
        if candidate.kind == SourceKind::Default {
            return ResolvedParam {
                canonical_name,
                actual_key: DEFAULT_KEY.to_string(),
                source: SourceKind::Default,
                value: candidate.key.clone(),
            };
        }
        match source.lookup(candidate.kind, &candidate.key) {
            Some(value) if !value.is_empty() => {
                return ResolvedParam {
                    canonical_name,
                    actual_key: candidate.key.clone(),
                    source: candidate.kind,
                    value: value.to_string(),
                };
            }
            _ => {}
        }
    }

    ResolvedParam {
        actual_key: canonical_name.clone(),
        canonical_name,
        source: descriptor.canonical_source(),
        value: String::new(),
    }
}

/// Resolves every bindable field of `P`, in declaration order.
///
/// Pure with respect to the request: calling it twice on the same source
/// yields identical results.
#[must_use]
pub fn resolve_all<P: BindParams, S: ParamSource + ?Sized>(
    source: &S,
) -> Vec<(&'static str, ResolvedParam)> {
    descriptors::<P>()
        .bindable()
        .map(|(field, descriptor)| (field, resolve(source, descriptor)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContext;
    use http::Uri;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapSource {
        query: HashMap<String, String>,
        headers: HashMap<String, String>,
        path: HashMap<String, String>,
    }

    impl ParamSource for MapSource {
        fn query(&self, key: &str) -> Option<&str> {
            self.query.get(key).map(String::as_str)
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
        }

        fn path_param(&self, name: &str) -> Option<&str> {
            self.path.get(name).map(String::as_str)
        }
    }

    fn desc(tag: &str) -> FieldDescriptor {
        FieldDescriptor::parse(tag).unwrap()
    }

    #[test]
    fn test_default_when_query_absent_or_empty() {
        let d = desc("query=page,default=1");

        let absent = resolve(&ExtractionContext::builder().build(), &d);
        assert_eq!(absent.value, "1");
        assert_eq!(absent.actual_key, DEFAULT_KEY);
        assert!(absent.is_default());

        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/?page="))
            .build();
        let empty = resolve(&ctx, &d);
        assert_eq!(empty.value, "1");
        assert!(empty.is_default());
        assert_eq!(empty.canonical_name, "page");
    }

    #[test]
    fn test_leading_default_shadows_later_sources() {
        let d = desc("default=1,query=page");
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/?page=5"))
            .build();

        let resolved = resolve(&ctx, &d);
        assert_eq!(resolved.value, "1");
        assert!(resolved.is_default());
        assert_eq!(resolved.canonical_name, "page");
    }

    #[test]
    fn test_default_between_sources() {
        let d = desc("query=a,default=x,header=X-B");

        let header_only = ExtractionContext::builder().header("x-b", "hdr").build();
        let resolved = resolve(&header_only, &d);
        assert_eq!(resolved.value, "x");
        assert_eq!(resolved.actual_key, DEFAULT_KEY);

        let query = ExtractionContext::builder()
            .uri(Uri::from_static("/?a=q"))
            .header("x-b", "hdr")
            .build();
        assert_eq!(resolve(&query, &d).value, "q");
    }

    #[test]
    fn test_empty_default_resolves_from_default() {
        let resolved = resolve(&ExtractionContext::builder().build(), &desc("default="));
        assert!(resolved.is_default());
        assert!(resolved.is_empty());
        assert_eq!(resolved.report_name("x"), DEFAULT_KEY);
    }

    #[test]
    fn test_empty_lookup_key_reports_field_name() {
        let resolved = resolve(&ExtractionContext::builder().build(), &desc("header="));
        assert!(resolved.is_empty());
        assert_eq!(resolved.source, SourceKind::Header);
        assert_eq!(resolved.report_name("trace"), "trace");
    }

    #[test]
    fn test_first_non_empty_source_wins() {
        let d = desc("path=id,query=id,header=X-Id");
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/?id=from-query"))
            .header("x-id", "from-header")
            .build();

        let resolved = resolve(&ctx, &d);
        assert_eq!(resolved.value, "from-query");
        assert_eq!(resolved.source, SourceKind::Query);
        assert_eq!(resolved.actual_key, "id");
    }

    #[test]
    fn test_nothing_found_points_at_canonical_source() {
        let d = desc("header=X-Correlation-Id");
        let resolved = resolve(&ExtractionContext::builder().build(), &d);

        assert!(resolved.is_empty());
        assert!(!resolved.is_default());
        assert_eq!(resolved.actual_key, "X-Correlation-Id");
        assert_eq!(resolved.source, SourceKind::Header);
        assert_eq!(resolved.report_name("correlation_id"), "X-Correlation-Id");
    }

    #[test]
    fn test_report_name_falls_back_to_field() {
        let resolved = ResolvedParam {
            canonical_name: String::new(),
            actual_key: String::new(),
            source: SourceKind::Query,
            value: String::new(),
        };
        assert_eq!(resolved.report_name("page"), "page");
    }

    proptest! {
        #[test]
        fn prop_precedence_follows_declaration_order(
            query in proptest::option::of("[a-z0-9]{0,4}"),
            header in proptest::option::of("[a-z0-9]{0,4}"),
            path in proptest::option::of("[a-z0-9]{0,4}"),
            default_at in 0usize..=3,
        ) {
            let mut source = MapSource::default();
            if let Some(v) = &query { source.query.insert("k".into(), v.clone()); }
            if let Some(v) = &header { source.headers.insert("x-k".into(), v.clone()); }
            if let Some(v) = &path { source.path.insert("k".into(), v.clone()); }

            let mut pairs = vec!["header=X-K", "path=k", "query=k"];
            pairs.insert(default_at, "default=dflt");
            let d = desc(&pairs.join(","));
            let resolved = resolve(&source, &d);

            let mut candidates = vec![
                (header.as_deref(), SourceKind::Header),
                (path.as_deref(), SourceKind::Path),
                (query.as_deref(), SourceKind::Query),
            ];
            candidates.insert(default_at, (Some("dflt"), SourceKind::Default));
            let expected = candidates
                .into_iter()
                .find_map(|(v, kind)| v.filter(|v| !v.is_empty()).map(|v| (v.to_string(), kind)));

            prop_assert_eq!(Some((resolved.value.clone(), resolved.source)), expected);
            prop_assert_eq!(resolve(&source, &d), resolved);
        }
    }
}
