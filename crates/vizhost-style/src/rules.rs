//! Color to CSS class mapping for one decoration pass.
//!
//! # Design
//!
//! A [`DecorationClassCache`] lives for exactly one synchronization pass.
//! The first request for a color allocates `decoration-{n}` and appends a
//! rule; later requests for the same color reuse it. The synchronizer
//! builds a new cache on every pass, so unique heat colors never
//! accumulate.
//!
//! # Invariants
//!
//! 1. Class indices are dense, starting at 0, in first-request order.
//! 2. Each distinct color yields exactly one rule.

use ahash::AHashMap;
use tracing::trace;

/// Opacity written into every decoration rule unless configured otherwise.
pub const DEFAULT_DECORATION_OPACITY: f64 = 0.5;

/// One `.class { ... }` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub class_name: String,
    pub background: String,
    pub opacity: f64,
}

impl StyleRule {
    /// CSS text of the rule.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            ".{} {{ background-color: {}; opacity: {}; }}",
            self.class_name, self.background, self.opacity
        )
    }
}

#[derive(Debug)]
pub struct DecorationClassCache {
    by_color: AHashMap<String, usize>,
    rules: Vec<StyleRule>,
    opacity: f64,
}

impl Default for DecorationClassCache {
    fn default() -> Self {
        Self::new(DEFAULT_DECORATION_OPACITY)
    }
}

impl DecorationClassCache {
    #[must_use]
    pub fn new(opacity: f64) -> Self {
        Self {
            by_color: AHashMap::new(),
            rules: Vec::new(),
            opacity,
        }
    }

    /// Class name for `color`, allocating a rule on first use.
    pub fn class_for(&mut self, color: &str) -> &str {
        let index = match self.by_color.get(color) {
            Some(&index) => index,
            None => {
                let index = self.rules.len();
                self.rules.push(StyleRule {
                    class_name: format!("decoration-{index}"),
                    background: color.to_owned(),
                    opacity: self.opacity,
                });
                self.by_color.insert(color.to_owned(), index);
                trace!(index, color, "allocated decoration class");
                index
            }
        };
        &self.rules[index].class_name
    }

    #[must_use]
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Full style sheet text, one rule per line.
    #[must_use]
    pub fn css_text(&self) -> String {
        self.rules
            .iter()
            .map(StyleRule::css)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
