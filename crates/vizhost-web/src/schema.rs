//! Inbound and outbound payload schemas.
//!
//! Inbound coordinates are 0-based wire shapes (see
//! [`vizhost_text::RangeShape`]). The text-range payload is the exception:
//! it travels in both directions and uses 1-based editor positions.

use serde::{Deserialize, Serialize};
use vizhost_text::{
    AstNodeShape, DocumentShape, MappingShape, PositionOffsetTransformer, TextRange,
};

use crate::error::ControllerError;

/// Payload of the `text` editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInput {
    pub source: DocumentShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
}

/// Payload of the `diff` editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffInput {
    pub original: DocumentShape,
    pub modified: DocumentShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Vec<MappingShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_unchanged_regions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Payload of the AST viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstInput {
    pub root: AstNodeShape,
    pub source: DocumentShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<DocumentShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DocumentShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Vec<MappingShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// `[min, max]` of heat scores, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_map_score_range: Option<(f64, f64)>,
}

/// `{text, range, comment?}` exchanged with the text-range editor.
///
/// `range` uses 1-based `{lineNumber, column}` positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRangePayload {
    pub text: String,
    pub range: TextRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TextRangePayload {
    #[must_use]
    pub fn new(text: impl Into<String>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
            comment: None,
        }
    }

    /// The range, checked for order and against the bounds of `text`.
    pub fn checked_range(&self) -> Result<TextRange, ControllerError> {
        let t = PositionOffsetTransformer::new(&self.text);
        let start = t.validate(self.range.start)?;
        let end = t.validate(self.range.end)?;
        Ok(TextRange::new(start, end)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vizhost_text::Position;

    #[test]
    fn text_range_payload_wire_form() {
        let payload = TextRangePayload::new(
            "ab",
            TextRange::new(Position::new(1, 1), Position::new(1, 2)).unwrap(),
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "text": "ab",
                "range": {
                    "start": {"lineNumber": 1, "column": 1},
                    "end": {"lineNumber": 1, "column": 2}
                }
            })
        );
    }

    #[test]
    fn checked_range_rejects_reversed_and_out_of_bounds() {
        let reversed: TextRangePayload = serde_json::from_value(json!({
            "text": "abc",
            "range": {"start": {"lineNumber": 1, "column": 3}, "end": {"lineNumber": 1, "column": 1}}
        }))
        .unwrap();
        assert!(matches!(
            reversed.checked_range(),
            Err(ControllerError::Normalization(_))
        ));

        let outside: TextRangePayload = serde_json::from_value(json!({
            "text": "abc",
            "range": {"start": {"lineNumber": 2, "column": 1}, "end": {"lineNumber": 2, "column": 1}}
        }))
        .unwrap();
        assert!(outside.checked_range().is_err());
    }

    #[test]
    fn ast_input_with_score_range() {
        let input: AstInput = serde_json::from_value(json!({
            "root": {"label": "root", "children": [{"label": "a", "range": [0, 1]}]},
            "source": "abc",
            "heatMapScoreRange": [0.0, 10.0]
        }))
        .unwrap();
        assert_eq!(input.heat_map_score_range, Some((0.0, 10.0)));
        assert_eq!(input.root.children.len(), 1);
    }

    #[test]
    fn diff_input_optional_fields() {
        let input: DiffInput = serde_json::from_value(json!({
            "original": "a",
            "modified": {"value": "b", "decorations": []}
        }))
        .unwrap();
        assert!(input.mappings.is_none());
        assert!(input.hide_unchanged_regions.is_none());
    }
}
