//! Domain types: content rows, source columns and annotation dictionaries

use crate::error::ResponseError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::io;
use std::str::FromStr;

/// A content row as read by the selector
///
/// The store owns the row; this is the in-memory copy held while one row is
/// processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    /// Primary key
    pub id: String,
    /// Value of the selected source column
    pub source_text: Option<String>,
}

impl ContentRow {
    /// Create new row
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, source_text: Option<String>) -> Self {
        Self {
            id: id.into(),
            source_text,
        }
    }

    /// Source text, if present and not blank after trimming
    #[must_use]
    pub fn usable_text(&self) -> Option<&str> {
        self.source_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Source column a run reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceColumn {
    /// `short_blurb`
    #[default]
    ShortBlurb,
    /// `short_description`
    ShortDescription,
}

impl SourceColumn {
    /// Column name as it appears in the table
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortBlurb => "short_blurb",
            Self::ShortDescription => "short_description",
        }
    }

    /// Resolve a column name, falling back to `short_blurb` for anything unknown
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "short_blurb" => Self::ShortBlurb,
            "short_description" => Self::ShortDescription,
            other => {
                tracing::debug!(requested = other, "unrecognized source column, using short_blurb");
                Self::ShortBlurb
            }
        }
    }
}

impl FromStr for SourceColumn {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for SourceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from lowercase source term to its translation
///
/// Key order follows the service response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationDictionary(Map<String, Value>);

impl AnnotationDictionary {
    /// Accept a parsed JSON value, rejecting anything that is not an object
    pub fn from_value(value: Value) -> Result<Self, ResponseError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ResponseError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    /// Number of terms
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the dictionary has no terms
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Translation for a term
    #[must_use]
    pub fn get(&self, term: &str) -> Option<&Value> {
        self.0.get(term)
    }

    /// Iterate terms in response order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Serialize for storage: `", "` and `": "` separators, non-ASCII kept as-is
    pub fn to_json_text(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::with_capacity(64);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.0.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| serde::ser::Error::custom(e.to_string()))
    }
}

impl From<Map<String, Value>> for AnnotationDictionary {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for AnnotationDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_text() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<unserializable dictionary>"),
        }
    }
}

/// Single-line JSON with a space after every separator
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
