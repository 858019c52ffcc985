//! Binding annotations and the per-type descriptor table.
//!
//! A parameter struct field opts into binding with an annotation such as
//! `#[param("query=page,header=X-Page,default=1")]`. The text is a
//! comma-separated list of `source=key` pairs, parsed here into a
//! [`FieldDescriptor`]. Malformed pairs are skipped rather than rejected so a
//! typo in one pair never disables the others.

use std::fmt;

/// The reserved key reported for values that came from a default.
pub const DEFAULT_KEY: &str = "default";

/// Where a parameter value is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// URL query string.
    Query,
    /// Request header (case-insensitive name).
    Header,
    /// Captured path parameter.
    Path,
    /// Literal fallback declared in the annotation.
    Default,
}

impl SourceKind {
    /// Parses a source name as written in an annotation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "path" => Some(Self::Path),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    /// Returns the name used in annotations and problem documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lookup location: source kind plus key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    /// Where to look.
    pub kind: SourceKind,
    /// The query key, header name or path parameter name.
    pub key: String,
}

/// Parsed binding annotation of one field.
///
/// `sources` keeps every well-formed pair, defaults included, in the order
/// they were written. The resolver walks that order, so a `default` placed
/// before a lookup pair shadows it.
///
/// # Example
///
/// ```rust
/// use tessera_extract::{FieldDescriptor, SourceKind};
///
/// let desc = FieldDescriptor::parse("query=page, header=X-Page, default=1").unwrap();
/// assert_eq!(desc.canonical_name(), "page");
/// assert_eq!(desc.canonical_source(), SourceKind::Query);
/// assert_eq!(desc.sources().len(), 3);
/// assert_eq!(desc.default_value(), Some("1"));
///
/// assert!(FieldDescriptor::parse("nonsense").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    canonical_name: String,
    canonical_source: SourceKind,
    sources: Vec<Source>,
}

impl FieldDescriptor {
    /// Parses an annotation.
    ///
    /// Returns `None` when no pair is well-formed. A pair is skipped when it
    /// has no `=`, more than one `=` or an unknown source. Empty keys are
    /// kept: `default=` declares an empty literal.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let mut sources: Vec<Source> = Vec::new();

        for part in tag.split(',') {
            let mut pieces = part.split('=');
            let (Some(kind), Some(key), None) = (pieces.next(), pieces.next(), pieces.next()) else {
                continue;
            };
            let Some(kind) = SourceKind::parse(kind.trim()) else {
                continue;
            };
            sources.push(Source {
                kind,
                key: key.trim().to_string(),
            });
        }

        let (canonical_name, canonical_source) =
            match sources.iter().find(|s| s.kind != SourceKind::Default) {
                Some(first) => (first.key.clone(), first.kind),
                None if !sources.is_empty() => (DEFAULT_KEY.to_string(), SourceKind::Default),
                None => return None,
            };

        Some(Self {
            canonical_name,
            canonical_source,
            sources,
        })
    }

    /// Key of the first lookup source, or `"default"` for default-only fields.
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Kind of the first lookup source, or [`SourceKind::Default`].
    #[must_use]
    pub const fn canonical_source(&self) -> SourceKind {
        self.canonical_source
    }

    /// Every well-formed pair in declaration order, defaults included.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Literal of the first declared default, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.kind == SourceKind::Default)
            .map(|s| s.key.as_str())
    }
}

/// Field name and raw annotation, as emitted by `#[derive(Params)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    /// Rust field name.
    pub name: &'static str,
    /// Text of the `#[param("...")]` annotation, if present.
    pub tag: Option<&'static str>,
}

impl FieldTag {
    /// Creates a field tag.
    #[must_use]
    pub const fn new(name: &'static str, tag: Option<&'static str>) -> Self {
        Self { name, tag }
    }
}

/// One row of a [`DescriptorTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// Rust field name.
    pub field: &'static str,
    /// Parsed annotation; `None` for fields that are not bindable.
    pub descriptor: Option<FieldDescriptor>,
}

/// Descriptors of every field of a parameter type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorTable {
    entries: Vec<FieldEntry>,
}

impl DescriptorTable {
    /// Builds a table by parsing each field's annotation.
    #[must_use]
    pub fn from_fields(fields: &[FieldTag]) -> Self {
        let entries = fields
            .iter()
            .map(|f| FieldEntry {
                field: f.name,
                descriptor: f.tag.and_then(FieldDescriptor::parse),
            })
            .collect();
        Self { entries }
    }

    /// All rows, in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Rows that carry a descriptor.
    pub fn bindable(&self) -> impl Iterator<Item = (&'static str, &FieldDescriptor)> {
        self.entries
            .iter()
            .filter_map(|e| e.descriptor.as_ref().map(|d| (e.field, d)))
    }

    /// Declaration position of `field`.
    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.field == field)
    }

    /// Descriptor of `field`, if it is bindable.
    #[must_use]
    pub fn descriptor(&self, field: &str) -> Option<&FieldDescriptor> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .and_then(|e| e.descriptor.as_ref())
    }
}
