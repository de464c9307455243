//! Errors raised while normalizing wire coordinates.

use std::fmt;

use crate::position::Position;

/// A range or position that does not describe a span of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The start lies after the end in document order.
    Reversed { start: Position, end: Position },
    /// A raw character offset past the end of the text.
    OffsetOutOfBounds { offset: usize, len: usize },
    /// A line/column pair outside the document (1-based, as normalized).
    PositionOutOfBounds { line: u32, column: u32 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reversed { start, end } => {
                write!(f, "range start {start} lies after its end {end}")
            }
            Self::OffsetOutOfBounds { offset, len } => {
                write!(f, "offset {offset} is outside the document (length {len})")
            }
            Self::PositionOutOfBounds { line, column } => {
                write!(f, "position {line}:{column} is outside the document")
            }
        }
    }
}

impl std::error::Error for RangeError {}
