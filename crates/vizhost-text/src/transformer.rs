#![forbid(unsafe_code)]

//! Offset ↔ line/column conversion.
//!
//! # Design
//!
//! [`PositionOffsetTransformer`] records the character offset at which each
//! line starts. Converting an offset to a position is a binary search over
//! those starts; converting back is one lookup plus a bounds check.
//!
//! Offsets and columns count Unicode scalar values (`char`s). Only `\n`
//! terminates a line; a preceding `\r` belongs to the line's content.
//!
//! # Invariants
//!
//! 1. `line_starts[0] == 0` and the starts are strictly increasing.
//! 2. For every offset `o` in `0..=len`,
//!    `get_offset(get_position(o)) == o`.
//! 3. Column `line_length + 1` (just past the last character) is valid;
//!    anything further is out of bounds.

use crate::error::RangeError;
use crate::position::Position;

/// Line-start index over a text snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOffsetTransformer {
    line_starts: Vec<usize>,
    len: usize,
}

impl PositionOffsetTransformer {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for ch in text.chars() {
            len += 1;
            if ch == '\n' {
                line_starts.push(len);
            }
        }
        Self { line_starts, len }
    }

    /// Text length in characters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lines. An empty text has one (empty) line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Length in characters of a 1-based line, excluding its `\n`.
    /// Lines outside the document have length 0.
    #[must_use]
    pub fn line_length(&self, line_number: u32) -> usize {
        let Some(index) = (line_number as usize).checked_sub(1) else {
            return 0;
        };
        let Some(&start) = self.line_starts.get(index) else {
            return 0;
        };
        match self.line_starts.get(index + 1) {
            Some(&next) => next - start - 1,
            None => self.len - start,
        }
    }

    /// Position of a character offset.
    pub fn get_position(&self, offset: usize) -> Result<Position, RangeError> {
        if offset > self.len {
            return Err(RangeError::OffsetOutOfBounds {
                offset,
                len: self.len,
            });
        }
        let index = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[index] + 1;
        Ok(Position::new(index as u32 + 1, column as u32))
    }

    /// Character offset of a position.
    pub fn get_offset(&self, position: Position) -> Result<usize, RangeError> {
        let out_of_bounds = RangeError::PositionOutOfBounds {
            line: position.line_number,
            column: position.column,
        };
        if position.line_number == 0 || position.column == 0 {
            return Err(out_of_bounds);
        }
        let index = position.line_number as usize - 1;
        let Some(&start) = self.line_starts.get(index) else {
            return Err(out_of_bounds);
        };
        let column = position.column as usize - 1;
        if column > self.line_length(position.line_number) {
            return Err(out_of_bounds);
        }
        Ok(start + column)
    }

    /// Check that `position` addresses a character slot of the document.
    pub fn validate(&self, position: Position) -> Result<Position, RangeError> {
        self.get_offset(position).map(|_| position)
    }

    /// Position just past the last character.
    #[must_use]
    pub fn end_position(&self) -> Position {
        let last = self.line_count();
        Position::new(last, self.line_length(last) as u32 + 1)
    }
}
