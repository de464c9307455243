#![forbid(unsafe_code)]

//! Immutable syntax trees.
//!
//! An [`AstNode`] tree is built wholesale from the wire shape of each
//! snapshot and never mutated afterwards. Nodes get a preorder
//! [`AstNodeId`] so views can refer to them without holding references
//! into a tree that the next snapshot replaces.

use crate::document::{Decoration, normalize_range};
use crate::error::RangeError;
use crate::position::{Position, TextRange};
use crate::shape::AstNodeShape;
use crate::transformer::PositionOffsetTransformer;

/// Preorder index of a node within its tree. The root is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstNodeId(u32);

impl AstNodeId {
    pub const ROOT: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// A syntax tree node with its source range in editor coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    id: AstNodeId,
    pub label: String,
    /// Path segment such as `".name"` or `"[0]"`.
    pub segment: Option<String>,
    pub is_marked: bool,
    pub codicon: Option<String>,
    pub range: Option<TextRange>,
    /// Raw heat score; see [`AstNode::heat_decorations`].
    pub heat_map_score: Option<f64>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// Build a tree from its wire shape, converting every range with `t`.
    /// Any malformed range rejects the whole tree.
    pub fn from_shape(
        shape: &AstNodeShape,
        t: &PositionOffsetTransformer,
    ) -> Result<Self, RangeError> {
        let mut next = 0;
        Self::build(shape, t, &mut next)
    }

    fn build(
        shape: &AstNodeShape,
        t: &PositionOffsetTransformer,
        next: &mut u32,
    ) -> Result<Self, RangeError> {
        let id = AstNodeId(*next);
        *next += 1;
        let range = shape
            .range
            .as_ref()
            .map(|r| normalize_range(r, t))
            .transpose()?;
        let children = shape
            .children
            .iter()
            .map(|child| Self::build(child, t, next))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id,
            label: shape.label.clone(),
            segment: shape.segment.clone(),
            is_marked: shape.is_marked.unwrap_or(false),
            codicon: shape.codicon.clone(),
            range,
            heat_map_score: shape.heat_map_score,
            children,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> AstNodeId {
        self.id
    }

    /// Deepest node whose range contains `position`.
    ///
    /// Walks down through the first child containing the position until no
    /// child does. Falls back to `self` even when `self` has no range.
    #[must_use]
    pub fn find_smallest_node_at(&self, position: Position) -> &AstNode {
        let mut current = self;
        while let Some(child) = current
            .children
            .iter()
            .find(|c| c.range.is_some_and(|r| r.contains_position(position)))
        {
            current = child;
        }
        current
    }

    /// Node with the given id, if it belongs to this subtree.
    #[must_use]
    pub fn find(&self, id: AstNodeId) -> Option<&AstNode> {
        self.iter().find(|node| node.id == id)
    }

    /// Preorder traversal.
    pub fn iter(&self) -> impl Iterator<Item = &AstNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Heat decorations for every node that has both a score and a range.
    ///
    /// With `score_range = Some((min, max))` scores are rescaled to
    /// `(score - min) / (max - min)`; a degenerate range maps every score
    /// to 0. Without it, scores are used as given.
    #[must_use]
    pub fn heat_decorations(&self, score_range: Option<(f64, f64)>) -> Vec<Decoration> {
        self.iter()
            .filter_map(|node| {
                let score = node.heat_map_score?;
                let range = node.range?;
                let value = match score_range {
                    Some((min, max)) if max > min => (score - min) / (max - min),
                    Some(_) => 0.0,
                    None => score,
                };
                Some(Decoration::heat(range, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(text: &str, shape: serde_json::Value) -> AstNode {
        let shape: AstNodeShape = serde_json::from_value(shape).unwrap();
        AstNode::from_shape(&shape, &PositionOffsetTransformer::new(text)).unwrap()
    }

    fn nested() -> AstNode {
        tree(
            "0123456789ab",
            json!({
                "label": "top", "range": [0, 10],
                "children": [
                    {"label": "child", "range": [2, 5], "children": [
                        {"label": "grandchild", "range": [3, 4]}
                    ]},
                    {"label": "sibling", "range": [8, 9]}
                ]
            }),
        )
    }

    fn at(node: &AstNode, offset: usize) -> String {
        let t = PositionOffsetTransformer::new("0123456789ab");
        node.find_smallest_node_at(t.get_position(offset).unwrap())
            .label
            .clone()
    }

    #[test]
    fn smallest_node_walks_down() {
        let root = nested();
        assert_eq!(at(&root, 3), "grandchild");
        assert_eq!(at(&root, 2), "child");
        assert_eq!(at(&root, 6), "top");
        assert_eq!(at(&root, 8), "sibling");
    }

    #[test]
    fn rangeless_root_is_fallback() {
        let root = tree(
            "abc",
            json!({"label": "root", "children": [{"label": "a", "range": [0, 1]}]}),
        );
        let pos = Position::new(1, 3);
        assert_eq!(root.find_smallest_node_at(pos).label, "root");
    }

    #[test]
    fn preorder_ids() {
        let root = nested();
        let labels: Vec<_> = root
            .iter()
            .map(|n| (n.id().get(), n.label.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![(0, "top"), (1, "child"), (2, "grandchild"), (3, "sibling")]
        );
        assert_eq!(root.find(AstNodeId(2)).unwrap().label, "grandchild");
        assert!(root.find(AstNodeId(9)).is_none());
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn bad_child_range_rejects_tree() {
        let shape: AstNodeShape = serde_json::from_value(json!({
            "label": "root",
            "children": [{"label": "bad", "range": [5, 2]}]
        }))
        .unwrap();
        let t = PositionOffsetTransformer::new("0123456");
        assert!(AstNode::from_shape(&shape, &t).is_err());
    }

    #[test]
    fn markers_and_segments_carried() {
        let root = tree(
            "x",
            json!({"label": "root", "segment": "[0]", "isMarked": true, "codicon": "symbol-class"}),
        );
        assert!(root.is_marked);
        assert_eq!(root.segment.as_deref(), Some("[0]"));
        assert_eq!(root.codicon.as_deref(), Some("symbol-class"));
    }

    #[test]
    fn heat_decorations_rescale() {
        let root = tree(
            "abcdef",
            json!({
                "label": "root", "range": [0, 6], "heatMapScore": 10.0,
                "children": [
                    {"label": "a", "range": [0, 2], "heatMapScore": 20.0},
                    {"label": "b", "range": [2, 4]},
                    {"label": "c", "heatMapScore": 15.0}
                ]
            }),
        );
        let decorations = root.heat_decorations(Some((10.0, 20.0)));
        let heats: Vec<_> = decorations.iter().filter_map(|d| d.heat).collect();
        assert_eq!(heats, vec![0.0, 1.0]);

        let raw = root.heat_decorations(None);
        assert_eq!(raw[0].heat, Some(10.0));
        assert!(root.heat_decorations(Some((3.0, 3.0))).iter().all(|d| d.heat == Some(0.0)));
    }
}
