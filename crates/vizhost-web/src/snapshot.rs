//! Normalized snapshots, one per controller kind.
//!
//! A snapshot is built from a validated payload in one step and either
//! fully succeeds or is rejected; nothing partial ever reaches the
//! observable state.

use std::rc::Rc;

use vizhost_text::{AstNode, DiffDocument, RangeError, RangeMapping, TextDocument};

use crate::schema::{AstInput, DiffInput, TextInput};

#[derive(Debug, Clone, PartialEq)]
pub struct TextSnapshot {
    pub document: TextDocument,
    pub language_id: Option<String>,
}

impl TextSnapshot {
    pub fn from_input(input: &TextInput) -> Result<Self, RangeError> {
        let document = TextDocument::from_shape(&input.source)?;
        let language_id = input
            .language_id
            .clone()
            .or_else(|| document.language_id().map(str::to_owned));
        let file_name = input
            .file_name
            .clone()
            .or_else(|| document.file_name().map(str::to_owned));
        Ok(Self {
            document: document.with_file_name(file_name),
            language_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffSnapshot {
    pub diff: DiffDocument,
    pub hide_unchanged_regions: Option<bool>,
    pub file_name: Option<String>,
}

impl DiffSnapshot {
    pub fn from_input(input: &DiffInput) -> Result<Self, RangeError> {
        let diff = DiffDocument::from_shapes(
            &input.original,
            &input.modified,
            input.mappings.as_deref(),
        )?;
        Ok(Self {
            diff,
            hide_unchanged_regions: input.hide_unchanged_regions,
            file_name: input.file_name.clone(),
        })
    }
}

/// A syntax tree over its source, optionally shown as a diff.
#[derive(Debug, Clone, PartialEq)]
pub struct AstSnapshot {
    pub root: Rc<AstNode>,
    pub source: TextDocument,
    pub original: Option<TextDocument>,
    pub modified: Option<TextDocument>,
    pub mappings: Option<Vec<RangeMapping>>,
    pub file_name: Option<String>,
    pub heat_map_score_range: Option<(f64, f64)>,
}

impl AstSnapshot {
    /// Tree ranges are converted with the source text. A missing diff side
    /// is the source itself.
    pub fn from_input(input: &AstInput) -> Result<Self, RangeError> {
        let source = TextDocument::from_shape(&input.source)?;
        let root = AstNode::from_shape(&input.root, source.transformer())?;

        let has_diff =
            input.original.is_some() || input.modified.is_some() || input.mappings.is_some();
        let (original, modified, mappings) = if has_diff {
            let diff = DiffDocument::against_base(
                &source,
                input.original.as_ref(),
                input.modified.as_ref(),
                input.mappings.as_deref(),
            )?;
            (
                input.original.as_ref().map(|_| diff.original),
                input.modified.as_ref().map(|_| diff.modified),
                diff.mappings,
            )
        } else {
            (None, None, None)
        };

        Ok(Self {
            root: Rc::new(root),
            source,
            original,
            modified,
            mappings,
            file_name: input.file_name.clone(),
            heat_map_score_range: input.heat_map_score_range,
        })
    }
}
