#![forbid(unsafe_code)]

//! Explicit diff correspondences.
//!
//! A [`RangeMapping`] says "this span of the original became that span of
//! the modified text". A diff view fed with mappings shows exactly those
//! changes; it never compares the two texts itself. Renderers work in
//! whole lines, so [`line_range_mappings`] lifts character mappings to
//! [`DetailedLineRangeMapping`]s, merging mappings whose line spans
//! overlap or touch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::normalize_range;
use crate::error::RangeError;
use crate::position::TextRange;
use crate::shape::MappingShape;
use crate::transformer::PositionOffsetTransformer;

/// Character-level correspondence between two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeMapping {
    pub original: TextRange,
    pub modified: TextRange,
}

impl RangeMapping {
    #[must_use]
    pub const fn new(original: TextRange, modified: TextRange) -> Self {
        Self { original, modified }
    }

    /// Normalize a wire mapping, each side with its own transformer.
    pub fn from_shape(
        shape: &MappingShape,
        original: &PositionOffsetTransformer,
        modified: &PositionOffsetTransformer,
    ) -> Result<Self, RangeError> {
        Ok(Self {
            original: normalize_range(&shape.original, original)?,
            modified: normalize_range(&shape.modified, modified)?,
        })
    }
}

/// Half-open span of 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    pub start_line_number: u32,
    pub end_line_number_exclusive: u32,
}

impl LineRange {
    #[must_use]
    pub const fn new(start_line_number: u32, end_line_number_exclusive: u32) -> Self {
        Self {
            start_line_number,
            end_line_number_exclusive,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_line_number >= self.end_line_number_exclusive
    }

    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end_line_number_exclusive
            .saturating_sub(self.start_line_number)
    }

    /// True when the spans share a line or one ends where the other starts.
    #[must_use]
    pub const fn overlap_or_touch(&self, other: &LineRange) -> bool {
        self.start_line_number <= other.end_line_number_exclusive
            && other.start_line_number <= self.end_line_number_exclusive
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn join(&self, other: &LineRange) -> LineRange {
        LineRange::new(
            self.start_line_number.min(other.start_line_number),
            self.end_line_number_exclusive
                .max(other.end_line_number_exclusive),
        )
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{})",
            self.start_line_number, self.end_line_number_exclusive
        )
    }
}

/// Line-level change with the character mappings it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedLineRangeMapping {
    pub original: LineRange,
    pub modified: LineRange,
    pub inner_changes: Vec<RangeMapping>,
}

/// Lines touched by a single character mapping.
///
/// A mapping ending at column 1 does not touch its last line, and a
/// mapping starting at the very end of a line does not touch its first
/// line, as long as the span does not become empty on either side.
#[must_use]
pub fn line_range_mapping(
    mapping: &RangeMapping,
    original: &PositionOffsetTransformer,
    modified: &PositionOffsetTransformer,
) -> DetailedLineRangeMapping {
    let (o, m) = (&mapping.original, &mapping.modified);

    let trim_end = m.end.column == 1
        && o.end.column == 1
        && o.start.line_number <= o.end.line_number
        && m.start.line_number <= m.end.line_number;
    let end_delta = u32::from(trim_end);

    let at_line_end = |range: &TextRange, t: &PositionOffsetTransformer| {
        (range.start.column - 1) as usize >= t.line_length(range.start.line_number)
    };
    let trim_start = at_line_end(m, modified)
        && at_line_end(o, original)
        && o.start.line_number + end_delta <= o.end.line_number
        && m.start.line_number + end_delta <= m.end.line_number;
    let start_delta = u32::from(trim_start);

    DetailedLineRangeMapping {
        original: LineRange::new(
            o.start.line_number + start_delta,
            o.end.line_number + 1 - end_delta,
        ),
        modified: LineRange::new(
            m.start.line_number + start_delta,
            m.end.line_number + 1 - end_delta,
        ),
        inner_changes: vec![*mapping],
    }
}

/// Lift character mappings to line changes, merging neighbours.
///
/// `mappings` must be sorted by position; adjacent entries whose line
/// spans overlap or touch on either side end up in one change.
#[must_use]
pub fn line_range_mappings(
    mappings: &[RangeMapping],
    original: &PositionOffsetTransformer,
    modified: &PositionOffsetTransformer,
) -> Vec<DetailedLineRangeMapping> {
    let mut changes: Vec<DetailedLineRangeMapping> = Vec::new();
    for mapping in mappings {
        let next = line_range_mapping(mapping, original, modified);
        match changes.last_mut() {
            Some(last)
                if last.original.overlap_or_touch(&next.original)
                    || last.modified.overlap_or_touch(&next.modified) =>
            {
                last.original = last.original.join(&next.original);
                last.modified = last.modified.join(&next.modified);
                last.inner_changes.extend(next.inner_changes);
            }
            _ => changes.push(next),
        }
    }
    changes
}
