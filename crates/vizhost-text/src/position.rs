#![forbid(unsafe_code)]

//! Editor coordinates.
//!
//! [`Position`] and [`TextRange`] use the editor convention: line numbers
//! and columns both start at 1. Wire payloads are 0-based and are
//! converted at the normalization boundary only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line_number: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    #[must_use]
    pub const fn new(line_number: u32, column: u32) -> Self {
        Self {
            line_number,
            column,
        }
    }

    /// First position of a document.
    pub const START: Self = Self::new(1, 1);
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_number, self.column)
    }
}

/// An ordered pair of positions with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    /// Build a range, rejecting a start that lies after the end.
    pub fn new(start: Position, end: Position) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Empty range at `position`.
    #[inline]
    #[must_use]
    pub const fn collapsed(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Build a range from two positions in either order.
    #[must_use]
    pub fn spanning(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `position` lies inside the range. Both ends are inclusive,
    /// matching how editors treat a cursor touching a range boundary.
    #[inline]
    #[must_use]
    pub fn contains_position(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    #[must_use]
    pub fn contains_range(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[inline]
    #[must_use]
    pub const fn start_line_number(&self) -> u32 {
        self.start.line_number
    }

    #[inline]
    #[must_use]
    pub const fn end_line_number(&self) -> u32 {
        self.end.line_number
    }
}

impl Default for TextRange {
    fn default() -> Self {
        Self::collapsed(Position::START)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_order_by_line_then_column() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 5));
    }

    #[test]
    fn reversed_range_rejected() {
        let err = TextRange::new(Position::new(2, 1), Position::new(1, 4)).unwrap_err();
        assert!(matches!(err, RangeError::Reversed { .. }));
    }

    #[test]
    fn spanning_orders_endpoints() {
        let r = TextRange::spanning(Position::new(4, 1), Position::new(2, 3));
        assert_eq!(r.start, Position::new(2, 3));
        assert_eq!(r.end, Position::new(4, 1));
    }

    #[test]
    fn contains_is_inclusive() {
        let r = TextRange::new(Position::new(1, 3), Position::new(1, 6)).unwrap();
        assert!(r.contains_position(Position::new(1, 3)));
        assert!(r.contains_position(Position::new(1, 6)));
        assert!(!r.contains_position(Position::new(1, 7)));
        assert!(!r.contains_position(Position::new(2, 1)));
    }

    #[test]
    fn collapsed_is_empty() {
        assert!(TextRange::collapsed(Position::new(5, 5)).is_empty());
        assert_eq!(TextRange::default(), TextRange::collapsed(Position::START));
    }

    #[test]
    fn serializes_in_editor_shape() {
        let r = TextRange::new(Position::new(1, 2), Position::new(3, 4)).unwrap();
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start": {"lineNumber": 1, "column": 2},
                "end": {"lineNumber": 3, "column": 4}
            })
        );
    }
}
