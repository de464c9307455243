#![forbid(unsafe_code)]

//! Text model for vizhost.
//!
//! Positions and ranges in editor coordinates, the offset transformer,
//! the JSON wire shapes documents arrive in, and normalization from the
//! latter into canonical [`TextDocument`]s, [`DiffDocument`]s and
//! [`AstNode`] trees.
//!
//! # Coordinates
//!
//! The wire is 0-based (`[line, column]` pairs or raw character offsets).
//! Everything past normalization is 1-based, matching the editor widget.
//! Values of the two systems never share a type.

pub mod ast;
pub mod document;
pub mod error;
pub mod mapping;
pub mod position;
pub mod shape;
pub mod transformer;

pub use ast::{AstNode, AstNodeId};
pub use document::{Decoration, DiffDocument, TextDocument, normalize_position, normalize_range};
pub use error::RangeError;
pub use mapping::{
    DetailedLineRangeMapping, LineRange, RangeMapping, line_range_mapping, line_range_mappings,
};
pub use position::{Position, TextRange};
pub use shape::{
    AnnotatedDocumentShape, AstNodeShape, DecorationShape, DocumentShape, MappingShape,
    PositionShape, RangeShape,
};
pub use transformer::PositionOffsetTransformer;
