//! Translation of `validator` failures into client-facing violations.
//!
//! Rule evaluation itself belongs to the `validator` crate. This module only
//! maps its field-keyed error tree onto [`Violation`]s: parameter failures
//! are renamed to the parameter the client actually sent, body failures get a
//! JSON-pointer-like locator.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tessera_core::Violation;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::descriptor::DescriptorTable;
use crate::resolve::ResolvedParam;

/// Key `validator` uses for struct-level (schema) failures.
const STRUCT_LEVEL_KEY: &str = "__all__";

/// Renders one rule failure as client text.
///
/// A custom `message` on the rule always wins. Otherwise the text is derived
/// from the rule code and its parameters.
///
/// # Example
///
/// ```rust
/// use validator::ValidationError;
///
/// let err = ValidationError::new("required");
/// assert_eq!(tessera_extract::describe("X-Correlation-Id", &err), "X-Correlation-Id is required");
///
/// let err = ValidationError::new("required").with_message("send a trace id".into());
/// assert_eq!(tessera_extract::describe("X-Trace", &err), "send a trace id");
/// ```
#[must_use]
pub fn describe(name: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let param = |key: &str| error.params.get(key).map(render);

    match &*error.code {
        "required" => format!("{name} is required"),
        "length" => match (param("equal"), param("min"), param("max")) {
            (Some(equal), _, _) => format!("{name} must have length {equal}"),
            (None, Some(min), Some(max)) => {
                format!("{name} must have length between {min} and {max}")
            }
            (None, Some(min), None) => format!("{name} must have length at least {min}"),
            (None, None, Some(max)) => format!("{name} must have length at most {max}"),
            (None, None, None) => format!("{name} has an invalid length"),
        },
        "range" => match (
            param("min").or_else(|| param("exclusive_min")),
            param("max").or_else(|| param("exclusive_max")),
        ) {
            (Some(min), Some(max)) => format!("{name} must be between {min} and {max}"),
            (Some(min), None) => format!("{name} must be at least {min}"),
            (None, Some(max)) => format!("{name} must be at most {max}"),
            (None, None) => format!("{name} is out of range"),
        },
        "email" => format!("{name} must be a valid email address"),
        "url" => format!("{name} must be a valid URL"),
        "contains" => match param("needle").or_else(|| param("pattern")) {
            Some(needle) => format!("{name} must contain '{needle}'"),
            None => format!("{name} is missing a required substring"),
        },
        "does_not_contain" => match param("needle").or_else(|| param("pattern")) {
            Some(needle) => format!("{name} must not contain '{needle}'"),
            None => format!("{name} contains a forbidden substring"),
        },
        "must_match" => match param("other") {
            Some(other) => format!("{name} must match {other}"),
            None => format!("{name} must match its confirmation"),
        },
        "regex" => format!("{name} has an invalid format"),
        code => format!("{name} failed the '{code}' check"),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Maps parameter validation failures to violations.
///
/// Fields in `skip` (resolved from a default, or already failed conversion)
/// are dropped. Fields without a descriptor are reported under their Rust
/// name with no source. Each violation is paired with the field's
/// declaration position; unknown keys sort last.
pub(crate) fn param_violations(
    errors: &ValidationErrors,
    table: &DescriptorTable,
    resolved: &HashMap<&'static str, ResolvedParam>,
    skip: &HashSet<&'static str>,
) -> Vec<(usize, Violation)> {
    let mut out = Vec::new();

    for (key, kind) in errors.errors() {
        let field: &str = key;
        if skip.contains(field) {
            continue;
        }

        let position = table.position(field).unwrap_or(usize::MAX);
        let (name, origin) = match (table.descriptor(field), resolved.get(field)) {
            (Some(_), Some(param)) => (
                param.report_name(field).to_string(),
                Some(param.source.as_str()),
            ),
            _ => (field.to_string(), None),
        };

        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    out.push((
                        position,
                        Violation::parameter(name.clone(), describe(&name, failure), origin),
                    ));
                }
            }
            ValidationErrorsKind::Struct(_) | ValidationErrorsKind::List(_) => {
                out.push((
                    position,
                    Violation::parameter(name.clone(), format!("{name} is invalid"), origin),
                ));
            }
        }
    }

    out.sort_by(|(a, va), (b, vb)| a.cmp(b).then_with(|| va.parameter.cmp(&vb.parameter)));
    out
}

/// Flattens body validation failures into pointer violations.
///
/// Nested structs extend the pointer with the field name (`/inner/thing`),
/// list items with their index (`/items/0/name`); struct-level failures sit
/// at the pointer of the struct they belong to, `/` for the root. The result
/// is sorted by pointer.
///
/// Pointers use the names `validator` reports, which are the Rust field
/// names.
#[must_use]
pub fn body_violations(errors: &ValidationErrors) -> Vec<Violation> {
    let mut out = Vec::new();
    collect_body(errors, "", &mut out);
    out.sort_by(|a, b| a.pointer.cmp(&b.pointer));
    out
}

fn collect_body(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Violation>) {
    for (key, kind) in errors.errors() {
        let key: &str = key;
        let (pointer, name) = if key == STRUCT_LEVEL_KEY {
            let pointer = if prefix.is_empty() { "/".to_string() } else { prefix.to_string() };
            let name = prefix.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or("body");
            (pointer, name.to_string())
        } else {
            (format!("{prefix}/{key}"), key.to_string())
        };

        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    out.push(Violation::pointer(pointer.clone(), describe(&name, failure)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_body(inner, &pointer, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_body(inner, &format!("{pointer}/{index}"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::borrow::Cow;
    use validator::Validate;

    #[test]
    fn test_describe_rules() {
        let mut len = ValidationError::new("length");
        len.add_param(Cow::from("min"), &3);
        len.add_param(Cow::from("max"), &10);
        assert_eq!(describe("name", &len), "name must have length between 3 and 10");

        let mut range = ValidationError::new("range");
        range.add_param(Cow::from("min"), &1);
        assert_eq!(describe("limit", &range), "limit must be at least 1");

        assert_eq!(
            describe("email", &ValidationError::new("email")),
            "email must be a valid email address"
        );
        assert_eq!(
            describe("slug", &ValidationError::new("lowercase")),
            "slug failed the 'lowercase' check"
        );
    }

    #[derive(Debug, Default, Deserialize, Validate)]
    struct Inner {
        #[validate(required)]
        thing: Option<String>,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Item {
        #[validate(length(min = 1))]
        name: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[serde(default)]
        #[validate(nested)]
        inner: Inner,
        #[serde(default)]
        #[validate(nested)]
        items: Vec<Item>,
        #[validate(email)]
        contact: Option<String>,
    }

    #[test]
    fn test_body_pointers() {
        let payload: Payload = serde_json::from_str(
            r#"{"items":[{"name":"ok"},{"name":""}],"contact":"nope"}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();

        let violations = body_violations(&errors);
        let pointers: Vec<_> = violations
            .iter()
            .map(|v| v.pointer.as_deref().unwrap())
            .collect();
        assert_eq!(pointers, vec!["/contact", "/inner/thing", "/items/1/name"]);

        assert_eq!(violations[1].detail, "thing is required");
        assert_eq!(violations[2].detail, "name must have length at least 1");
        assert!(violations.iter().all(|v| v.parameter.is_none() && v.source.is_none()));
    }

    #[test]
    fn test_struct_level_error_at_root() {
        let mut errors = ValidationErrors::new();
        errors.add("__all__", ValidationError::new("dates").with_message("end before start".into()));

        let violations = body_violations(&errors);
        assert_eq!(violations, vec![Violation::pointer("/", "end before start")]);
    }
}
