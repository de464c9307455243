#![forbid(unsafe_code)]

//! Canonical documents.
//!
//! Every wire document is normalized here, once, into a [`TextDocument`]:
//! the text, its decorations with 1-based editor ranges, and the
//! transformer built from the text. Code further down the pipeline never
//! branches on the wire form again.
//!
//! # Failure Modes
//!
//! - **Reversed or out-of-bounds range**: normalization fails with
//!   [`RangeError`] and no document is produced. Callers keep whatever
//!   they had before.

use std::rc::Rc;

use tracing::trace;

use crate::error::RangeError;
use crate::mapping::RangeMapping;
use crate::position::{Position, TextRange};
use crate::shape::{DocumentShape, MappingShape, PositionShape, RangeShape};
use crate::transformer::PositionOffsetTransformer;

/// Convert a 0-based wire position into a validated 1-based position.
pub fn normalize_position(
    shape: PositionShape,
    transformer: &PositionOffsetTransformer,
) -> Result<Position, RangeError> {
    match shape {
        PositionShape::Offset(offset) => transformer.get_position(offset),
        PositionShape::LineColumn(line, column) => transformer.validate(Position::new(
            line.saturating_add(1),
            column.saturating_add(1),
        )),
    }
}

/// Convert a wire range. The start must not lie after the end.
pub fn normalize_range(
    shape: &RangeShape,
    transformer: &PositionOffsetTransformer,
) -> Result<TextRange, RangeError> {
    TextRange::new(
        normalize_position(shape.0, transformer)?,
        normalize_position(shape.1, transformer)?,
    )
}

/// A highlighted span. `color` wins over `heat` when both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub range: TextRange,
    pub color: Option<String>,
    pub heat: Option<f64>,
}

impl Decoration {
    #[must_use]
    pub fn colored(range: TextRange, color: impl Into<String>) -> Self {
        Self {
            range,
            color: Some(color.into()),
            heat: None,
        }
    }

    #[must_use]
    pub fn heat(range: TextRange, value: f64) -> Self {
        Self {
            range,
            color: None,
            heat: Some(value),
        }
    }
}

/// Text plus decorations, with coordinates already in editor form.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDocument {
    value: String,
    decorations: Vec<Decoration>,
    transformer: Rc<PositionOffsetTransformer>,
    file_name: Option<String>,
    language_id: Option<String>,
}

impl TextDocument {
    /// Undecorated document.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        let transformer = Rc::new(PositionOffsetTransformer::new(&value));
        Self {
            value,
            decorations: Vec::new(),
            transformer,
            file_name: None,
            language_id: None,
        }
    }

    /// Normalize a wire document. A bare string becomes an undecorated
    /// document; the object form has every decoration range converted
    /// with a transformer built from its own text.
    pub fn from_shape(shape: &DocumentShape) -> Result<Self, RangeError> {
        match shape {
            DocumentShape::PlainText(text) => Ok(Self::plain(text.clone())),
            DocumentShape::Annotated(doc) => {
                let mut result = Self::plain(doc.value.clone());
                result.decorations = doc
                    .decorations
                    .iter()
                    .map(|d| -> Result<Decoration, RangeError> {
                        Ok(Decoration {
                            range: normalize_range(&d.range, &result.transformer)?,
                            color: d.color.clone(),
                            heat: d.heat_percent,
                        })
                    })
                    .collect::<Result<_, _>>()?;
                result.file_name = doc.file_name.clone();
                result.language_id = doc.language_id.clone();
                trace!(
                    chars = result.transformer.len(),
                    decorations = result.decorations.len(),
                    "normalized document"
                );
                Ok(result)
            }
        }
    }

    #[must_use]
    pub fn with_decorations(mut self, decorations: Vec<Decoration>) -> Self {
        self.decorations = decorations;
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    #[must_use]
    pub fn transformer(&self) -> &PositionOffsetTransformer {
        &self.transformer
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    #[must_use]
    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::plain("")
    }
}

/// Two sides of a diff plus optional explicit mappings between them.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffDocument {
    pub original: TextDocument,
    pub modified: TextDocument,
    /// When present, the displayed changes come from these and nothing else.
    pub mappings: Option<Vec<RangeMapping>>,
}

impl DiffDocument {
    /// Normalize both sides independently. Mapping ranges are converted
    /// with the transformer of the side they point into.
    pub fn from_shapes(
        original: &DocumentShape,
        modified: &DocumentShape,
        mappings: Option<&[MappingShape]>,
    ) -> Result<Self, RangeError> {
        let original = TextDocument::from_shape(original)?;
        let modified = TextDocument::from_shape(modified)?;
        Self::assemble(original, modified, mappings)
    }

    /// Diff against `base`: a missing side is `base` itself.
    pub fn against_base(
        base: &TextDocument,
        original: Option<&DocumentShape>,
        modified: Option<&DocumentShape>,
        mappings: Option<&[MappingShape]>,
    ) -> Result<Self, RangeError> {
        let side = |shape: Option<&DocumentShape>| match shape {
            Some(shape) => TextDocument::from_shape(shape),
            None => Ok(base.clone()),
        };
        let original = side(original)?;
        let modified = side(modified)?;
        Self::assemble(original, modified, mappings)
    }

    fn assemble(
        original: TextDocument,
        modified: TextDocument,
        mappings: Option<&[MappingShape]>,
    ) -> Result<Self, RangeError> {
        let mappings = mappings
            .map(|shapes| {
                shapes
                    .iter()
                    .map(|m| {
                        RangeMapping::from_shape(m, original.transformer(), modified.transformer())
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Self {
            original,
            modified,
            mappings,
        })
    }
}
