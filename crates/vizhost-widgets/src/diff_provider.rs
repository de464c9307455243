#![forbid(unsafe_code)]

//! A diff provider that reports caller-supplied mappings instead of
//! comparing text.

use tracing::debug;
use vizhost_text::{PositionOffsetTransformer, RangeMapping, line_range_mappings};

use crate::host::{DiffProvider, DiffResult};

/// Displays exactly the given mappings, grouped into line changes. The
/// texts are only used to measure lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedDiffProvider {
    mappings: Vec<RangeMapping>,
}

impl MappedDiffProvider {
    #[must_use]
    pub fn new(mappings: Vec<RangeMapping>) -> Self {
        Self { mappings }
    }

    #[must_use]
    pub fn mappings(&self) -> &[RangeMapping] {
        &self.mappings
    }
}

impl DiffProvider for MappedDiffProvider {
    fn compute_diff(&self, original: &[String], modified: &[String]) -> DiffResult {
        let original = PositionOffsetTransformer::new(&original.join("\n"));
        let modified = PositionOffsetTransformer::new(&modified.join("\n"));
        let changes = line_range_mappings(&self.mappings, &original, &modified);
        debug!(
            target: "vizhost.diff",
            mappings = self.mappings.len(),
            changes = changes.len(),
            "synthetic diff"
        );
        DiffResult {
            identical: false,
            quit_early: false,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizhost_text::{LineRange, Position, TextRange};

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_owned).collect()
    }

    #[test]
    fn ignores_text_content() {
        // Identical texts, yet the mapping claims line 2 changed.
        let mapping = RangeMapping::new(
            TextRange::new(Position::new(2, 1), Position::new(2, 2)).unwrap(),
            TextRange::new(Position::new(2, 1), Position::new(2, 2)).unwrap(),
        );
        let provider = MappedDiffProvider::new(vec![mapping]);
        let result = provider.compute_diff(&lines("a\nb\nc"), &lines("a\nb\nc"));
        assert!(!result.identical);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].original, LineRange::new(2, 3));
        assert_eq!(result.changes[0].inner_changes, vec![mapping]);
    }

    #[test]
    fn no_mappings_no_changes() {
        let provider = MappedDiffProvider::new(Vec::new());
        let result = provider.compute_diff(&lines("a"), &lines("b"));
        assert!(result.changes.is_empty());
    }
}
