//! Parameter hydration: resolve, convert, validate.
//!
//! [`hydrate_params`] fills a fresh `P::default()` from a [`ParamSource`].
//! Every bindable field is resolved and converted; conversion failures are
//! collected rather than returned early. The struct is then validated, with
//! default-resolved and already-failed fields excluded, and every violation
//! is reported together in field declaration order.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::descriptor::{DescriptorTable, FieldTag};
use crate::error::{BindError, HydrationError};
use crate::resolve::{resolve, ParamSource, ResolvedParam};
use crate::validate::param_violations;

/// A struct that can be hydrated from query, header and path parameters.
///
/// Implemented by `#[derive(Params)]`; hand-written impls are possible but
/// rarely useful.
pub trait BindParams: Default + Validate + Send + 'static {
    /// Every field with its raw `#[param]` annotation, in declaration order.
    fn fields() -> &'static [FieldTag];

    /// Converts `resolved` into the field named `field`.
    ///
    /// Unknown field names are ignored.
    fn bind_field(&mut self, field: &str, resolved: &ResolvedParam) -> Result<(), BindError>;
}

/// Marker for "no parameters" or "no body".
///
/// A handler whose body type is `Empty` never reads or decodes the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty;

impl Validate for Empty {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl BindParams for Empty {
    fn fields() -> &'static [FieldTag] {
        &[]
    }

    fn bind_field(&mut self, _field: &str, _resolved: &ResolvedParam) -> Result<(), BindError> {
        Ok(())
    }
}

type DescriptorCache = RwLock<HashMap<TypeId, Arc<DescriptorTable>>>;

static DESCRIPTORS: OnceLock<DescriptorCache> = OnceLock::new();

/// Returns the descriptor table of `P`, computing it on first use.
///
/// Tables are cached for the life of the process. Readers share a lock; the
/// first computation for a type happens under the write lock, so it runs
/// once even when many requests race on a cold cache.
#[must_use]
pub fn descriptors<P: BindParams>() -> Arc<DescriptorTable> {
    let cache = DESCRIPTORS.get_or_init(DescriptorCache::default);
    let id = TypeId::of::<P>();

    if let Some(table) = cache.read().get(&id) {
        return Arc::clone(table);
    }

    let mut guard = cache.write();
    let table = guard.entry(id).or_insert_with(|| {
        let table = DescriptorTable::from_fields(P::fields());
        tracing::debug!(
            params_type = std::any::type_name::<P>(),
            fields = table.entries().len(),
            bindable = table.bindable().count(),
            "computed parameter descriptors"
        );
        Arc::new(table)
    });
    Arc::clone(table)
}

/// Hydrates and validates `P` from `source`.
///
/// # Errors
///
/// - [`HydrationError::Invalid`] with every conversion and validation
///   violation when the client sent bad parameters.
/// - [`HydrationError::Setup`] as soon as a field turns out to be
///   misdeclared (unsupported type, malformed default).
pub fn hydrate_params<P: BindParams, S: ParamSource + ?Sized>(
    source: &S,
) -> Result<P, HydrationError> {
    let table = descriptors::<P>();
    let mut params = P::default();
    let mut violations = Vec::new();
    let mut skip: HashSet<&'static str> = HashSet::new();
    let mut resolved_by_field: HashMap<&'static str, ResolvedParam> = HashMap::new();

    for (position, entry) in table.entries().iter().enumerate() {
        let Some(descriptor) = &entry.descriptor else {
            continue;
        };
        let resolved = resolve(source, descriptor);

        match params.bind_field(entry.field, &resolved) {
            Ok(()) => {}
            Err(BindError::Conversion(err)) => {
                tracing::debug!(
                    field = entry.field,
                    parameter = %err.parameter,
                    reason = %err.reason,
                    "parameter conversion failed"
                );
                violations.push((position, err.violation()));
                skip.insert(entry.field);
            }
            Err(BindError::Setup(err)) => return Err(err.into()),
        }

        if resolved.is_default() {
            skip.insert(entry.field);
        }
        resolved_by_field.insert(entry.field, resolved);
    }

    if let Err(errors) = params.validate() {
        violations.extend(param_violations(&errors, &table, &resolved_by_field, &skip));
    }

    if violations.is_empty() {
        return Ok(params);
    }

    violations.sort_by_key(|(position, _)| *position);
    Err(HydrationError::Invalid(
        violations.into_iter().map(|(_, v)| v).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::assign;
    use crate::error::SetupError;
    use crate::ExtractionContext;
    use http::Uri;
    use tessera_core::Violation;

    // Hand-written to keep this crate free of its own derive.
    #[derive(Debug, Default, Validate)]
    struct ListQuery {
        #[validate(range(min = 1, max = 100))]
        page: i64,
        #[validate(required)]
        correlation_id: Option<String>,
        #[validate(length(min = 2))]
        filter: String,
        #[validate(length(max = 3))]
        unbound: String,
    }

    impl BindParams for ListQuery {
        fn fields() -> &'static [FieldTag] {
            const FIELDS: &[FieldTag] = &[
                FieldTag::new("page", Some("query=page,default=1")),
                FieldTag::new("correlation_id", Some("header=X-Correlation-Id")),
                FieldTag::new("filter", Some("query=q,query=filter")),
                FieldTag::new("unbound", None),
            ];
            FIELDS
        }

        fn bind_field(&mut self, field: &str, resolved: &ResolvedParam) -> Result<(), BindError> {
            match field {
                "page" => assign(&mut self.page, "page", resolved),
                "correlation_id" => assign(&mut self.correlation_id, "correlation_id", resolved),
                "filter" => assign(&mut self.filter, "filter", resolved),
                _ => Ok(()),
            }
        }
    }

    fn ctx(uri: &'static str) -> ExtractionContext {
        ExtractionContext::builder()
            .uri(Uri::from_static(uri))
            .header("x-correlation-id", "abc-123")
            .build()
    }

    #[test]
    fn test_hydrates_values() {
        let params: ListQuery = hydrate_params(&ctx("/?page=3&filter=rust")).unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.correlation_id.as_deref(), Some("abc-123"));
        assert_eq!(params.filter, "rust");
    }

    #[test]
    fn test_default_applied() {
        let params: ListQuery = hydrate_params(&ctx("/?page=&filter=ok")).unwrap();
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_collects_every_violation_in_declaration_order() {
        let source = ExtractionContext::builder()
            .uri(Uri::from_static("/?page=invalid&q=x"))
            .build();
        let err = hydrate_params::<ListQuery, _>(&source).unwrap_err();

        assert_eq!(
            err.violations(),
            &[
                Violation::parameter("page", "must be a valid int", Some("query")),
                Violation::parameter("X-Correlation-Id", "X-Correlation-Id is required", Some("header")),
                Violation::parameter("q", "q must have length at least 2", Some("query")),
            ]
        );
    }

    #[test]
    fn test_failed_conversion_not_validated_again() {
        let err = hydrate_params::<ListQuery, _>(&ctx("/?page=0.5&filter=ok")).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].detail, "must be a valid int");
    }

    #[test]
    fn test_client_value_is_validated() {
        let err = hydrate_params::<ListQuery, _>(&ctx("/?page=0&filter=ok")).unwrap_err();
        let [violation] = err.violations() else {
            panic!("expected one violation, got {:?}", err.violations());
        };
        assert_eq!(violation.parameter.as_deref(), Some("page"));
        assert_eq!(violation.source.as_deref(), Some("query"));
        assert!(violation.detail.starts_with("page must be between"), "{}", violation.detail);
    }

    #[derive(Debug, Default, Validate)]
    struct BadDefault {
        limit: u32,
    }

    impl BindParams for BadDefault {
        fn fields() -> &'static [FieldTag] {
            const FIELDS: &[FieldTag] = &[FieldTag::new("limit", Some("query=limit,default=ten"))];
            FIELDS
        }

        fn bind_field(&mut self, field: &str, resolved: &ResolvedParam) -> Result<(), BindError> {
            match field {
                "limit" => assign(&mut self.limit, "limit", resolved),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_malformed_default_is_setup_error() {
        let err = hydrate_params::<BadDefault, _>(&ctx("/")).unwrap_err();
        assert!(matches!(
            err,
            HydrationError::Setup(SetupError::MalformedDefault { field: "limit", .. })
        ));

        let ok: BadDefault = hydrate_params(&ctx("/?limit=5")).unwrap();
        assert_eq!(ok.limit, 5);
    }

    #[test]
    fn test_descriptors_cached_per_type() {
        let first = descriptors::<ListQuery>();
        let second = descriptors::<ListQuery>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.entries().len(), 4);

        assert!(descriptors::<Empty>().entries().is_empty());
    }

    #[test]
    fn test_concurrent_first_use_yields_one_table() {
        let tables: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(descriptors::<BadDefault>))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_hydration_is_idempotent() {
        let source = ctx("/?page=7&q=abc");
        let a = crate::resolve_all::<ListQuery, _>(&source);
        let b = crate::resolve_all::<ListQuery, _>(&source);
        assert_eq!(a, b);
    }
}
