#![forbid(unsafe_code)]

//! Wire shapes as delivered by the host process.
//!
//! Coordinates in these shapes are 0-based. A position is either a raw
//! character offset or a `[line, column]` pair; a range is a two-element
//! array `[start, endExclusive]`. Nothing downstream of
//! [`crate::document`] sees these types.

use serde::{Deserialize, Serialize};

/// `number | [line, column]`, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionShape {
    Offset(usize),
    LineColumn(u32, u32),
}

/// `[start, endExclusive]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeShape(pub PositionShape, pub PositionShape);

impl RangeShape {
    #[must_use]
    pub const fn offsets(start: usize, end: usize) -> Self {
        Self(PositionShape::Offset(start), PositionShape::Offset(end))
    }

    #[must_use]
    pub const fn line_columns(start: (u32, u32), end: (u32, u32)) -> Self {
        Self(
            PositionShape::LineColumn(start.0, start.1),
            PositionShape::LineColumn(end.0, end.1),
        )
    }
}

/// One highlighted span: an explicit color or a heat value in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationShape {
    pub range: RangeShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_percent: Option<f64>,
}

/// Object form of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedDocumentShape {
    pub value: String,
    #[serde(default)]
    pub decorations: Vec<DecorationShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
}

/// `string | {value, decorations?, fileName?, languageId?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentShape {
    PlainText(String),
    Annotated(AnnotatedDocumentShape),
}

impl DocumentShape {
    /// Document text regardless of form.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::PlainText(text) => text,
            Self::Annotated(doc) => &doc.value,
        }
    }
}

impl From<&str> for DocumentShape {
    fn from(text: &str) -> Self {
        Self::PlainText(text.to_string())
    }
}

/// Explicit correspondence between an original and a modified span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingShape {
    pub original: RangeShape,
    pub modified: RangeShape,
}

/// Syntax tree node as sent on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNodeShape {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_marked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_map_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNodeShape>,
}
