//! Conversion of raw parameter strings into typed field values.
//!
//! [`FromParam`] is implemented for the scalar types a query, header or path
//! value can sensibly hold. Collections implement it too, but report
//! themselves unsupported so a misdeclared field fails loudly at request time
//! instead of silently never binding.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{BindError, ConversionError, SetupError};
use crate::resolve::ResolvedParam;

/// A type a raw parameter string can be converted into.
pub trait FromParam: Sized {
    /// Short type name shown to clients, e.g. `int`.
    const TYPE_NAME: &'static str;

    /// False for types that can never be bound from a single string.
    const SUPPORTED: bool = true;

    /// Converts a non-empty raw value. The error is a parser message.
    fn from_param(raw: &str) -> Result<Self, String>;
}

impl FromParam for String {
    const TYPE_NAME: &'static str = "string";

    fn from_param(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

macro_rules! from_param_via_parse {
    ($name:literal => $($ty:ty),+) => {
        $(
            impl FromParam for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_param(raw: &str) -> Result<Self, String> {
                    raw.parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )+
    };
}

from_param_via_parse!("int" => i8, i16, i32, i64, i128, isize);
from_param_via_parse!("uint" => u8, u16, u32, u64, u128, usize);
from_param_via_parse!("float" => f32, f64);

impl FromParam for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_param(raw: &str) -> Result<Self, String> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            other => Err(format!("'{other}' is not a boolean")),
        }
    }
}

impl FromParam for Uuid {
    const TYPE_NAME: &'static str = "uuid";

    fn from_param(raw: &str) -> Result<Self, String> {
        Uuid::parse_str(raw).map_err(|e| e.to_string())
    }
}

impl FromParam for DateTime<Utc> {
    const TYPE_NAME: &'static str = "timestamp";

    fn from_param(raw: &str) -> Result<Self, String> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| e.to_string())
    }
}

impl FromParam for DateTime<FixedOffset> {
    const TYPE_NAME: &'static str = "timestamp";

    fn from_param(raw: &str) -> Result<Self, String> {
        DateTime::parse_from_rfc3339(raw).map_err(|e| e.to_string())
    }
}

impl FromParam for NaiveDate {
    const TYPE_NAME: &'static str = "date";

    fn from_param(raw: &str) -> Result<Self, String> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| e.to_string())
    }
}

impl<T: FromParam> FromParam for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const SUPPORTED: bool = T::SUPPORTED;

    fn from_param(raw: &str) -> Result<Self, String> {
        T::from_param(raw).map(Some)
    }
}

fn unsupported<T>() -> Result<T, String> {
    Err("collections cannot be bound from a single parameter".to_string())
}

impl<T> FromParam for Vec<T> {
    const TYPE_NAME: &'static str = "list";
    const SUPPORTED: bool = false;

    fn from_param(_raw: &str) -> Result<Self, String> {
        unsupported()
    }
}

impl<K, V, S> FromParam for HashMap<K, V, S> {
    const TYPE_NAME: &'static str = "map";
    const SUPPORTED: bool = false;

    fn from_param(_raw: &str) -> Result<Self, String> {
        unsupported()
    }
}

impl<K, V> FromParam for BTreeMap<K, V> {
    const TYPE_NAME: &'static str = "map";
    const SUPPORTED: bool = false;

    fn from_param(_raw: &str) -> Result<Self, String> {
        unsupported()
    }
}

/// Converts `resolved` and stores it in `slot`.
///
/// - An unsupported field type is a [`SetupError`], even when the value is
///   empty.
/// - An empty value leaves `slot` untouched.
/// - A conversion failure on a default is a [`SetupError::MalformedDefault`];
///   on a client value it is a [`ConversionError`].
///
/// This is what `#[derive(Params)]` calls for every bindable field.
pub fn assign<T: FromParam>(
    slot: &mut T,
    field: &'static str,
    resolved: &ResolvedParam,
) -> Result<(), BindError> {
    if !T::SUPPORTED {
        return Err(SetupError::UnsupportedFieldType {
            field,
            type_name: std::any::type_name::<T>(),
        }
        .into());
    }
    if resolved.is_empty() {
        return Ok(());
    }

    match T::from_param(&resolved.value) {
        Ok(value) => {
            *slot = value;
            Ok(())
        }
        Err(reason) if resolved.is_default() => Err(SetupError::MalformedDefault {
            field,
            value: resolved.value.clone(),
            type_name: T::TYPE_NAME,
            reason,
        }
        .into()),
        Err(reason) => Err(ConversionError {
            parameter: resolved.report_name(field).to_string(),
            type_name: T::TYPE_NAME,
            origin: resolved.source,
            reason,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{SourceKind, DEFAULT_KEY};

    fn from_query(key: &str, value: &str) -> ResolvedParam {
        ResolvedParam {
            canonical_name: key.to_string(),
            actual_key: key.to_string(),
            source: SourceKind::Query,
            value: value.to_string(),
        }
    }

    fn from_default(canonical: &str, value: &str) -> ResolvedParam {
        ResolvedParam {
            canonical_name: canonical.to_string(),
            actual_key: DEFAULT_KEY.to_string(),
            source: SourceKind::Default,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(i32::from_param("-42"), Ok(-42));
        assert_eq!(u8::from_param("255"), Ok(255));
        assert!(u8::from_param("256").is_err());
        assert!(u32::from_param("-1").is_err());
        assert_eq!(f64::from_param("1.5"), Ok(1.5));
        assert_eq!(String::from_param("hi"), Ok("hi".to_string()));
        assert_eq!(
            NaiveDate::from_param("2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(NaiveDate::from_param("2023-02-29").is_err());
    }

    #[test]
    fn test_bool_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(bool::from_param(raw), Ok(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(bool::from_param(raw), Ok(false), "{raw}");
        }
        assert!(bool::from_param("yes").is_err());
        assert!(bool::from_param("tRUE").is_err());
    }

    #[test]
    fn test_timestamp_and_uuid() {
        let ts = DateTime::<Utc>::from_param("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert!(DateTime::<Utc>::from_param("yesterday").is_err());

        let id = Uuid::now_v7();
        assert_eq!(Uuid::from_param(&id.to_string()), Ok(id));
        assert_eq!(<Uuid as FromParam>::TYPE_NAME, "uuid");
    }

    #[test]
    fn test_assign_converts() {
        let mut page = 0_i64;
        assign(&mut page, "page", &from_query("page", "3")).unwrap();
        assert_eq!(page, 3);

        let mut filter: Option<String> = None;
        assign(&mut filter, "filter", &from_query("q", "rust")).unwrap();
        assert_eq!(filter.as_deref(), Some("rust"));
    }

    #[test]
    fn test_assign_empty_is_noop() {
        let mut page = 7_i64;
        assign(&mut page, "page", &from_query("page", "")).unwrap();
        assert_eq!(page, 7);
    }

    #[test]
    fn test_assign_conversion_error() {
        let mut page = 0_i64;
        let err = assign(&mut page, "page", &from_query("page", "invalid")).unwrap_err();

        let BindError::Conversion(err) = err else {
            panic!("expected a conversion error, got {err:?}");
        };
        assert_eq!(err.parameter, "page");
        assert_eq!(err.type_name, "int");
        assert_eq!(err.violation().detail, "must be a valid int");
        assert_eq!(page, 0);
    }

    #[test]
    fn test_assign_malformed_default() {
        let mut page = 0_u32;
        let err = assign(&mut page, "page", &from_default("page", "one")).unwrap_err();
        assert!(matches!(
            err,
            BindError::Setup(SetupError::MalformedDefault { field: "page", .. })
        ));
    }

    #[test]
    fn test_assign_unsupported_even_when_empty() {
        let mut tags: Vec<String> = Vec::new();
        let err = assign(&mut tags, "tags", &from_query("tag", "")).unwrap_err();
        assert!(matches!(
            err,
            BindError::Setup(SetupError::UnsupportedFieldType { field: "tags", .. })
        ));

        let mut lookup: Option<HashMap<String, String>> = None;
        let err = assign(&mut lookup, "lookup", &from_query("m", "x")).unwrap_err();
        assert!(matches!(err, BindError::Setup(SetupError::UnsupportedFieldType { .. })));
    }
}
