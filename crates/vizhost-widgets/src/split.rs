#![forbid(unsafe_code)]

//! Two components side by side with proportional widths.

use std::rc::Rc;

use tracing::trace;
use vizhost_runtime::{Disposable, DisposableStore, DisposeResult};

use crate::component::{Component, Size, SizeBounds};
use crate::host::{EditorHost, ElementHandle};

/// Default proportions of the left and right pane.
pub const DEFAULT_SPLIT_WEIGHTS: [u32; 2] = [1, 2];

/// Horizontal split of two components.
///
/// The width is divided by `weights`; each side is then clamped into its
/// own bounds, with the right side absorbing the remainder. Both sides
/// get the full height.
pub struct HorizontalSplitView {
    element: ElementHandle,
    first: Rc<dyn Component>,
    second: Rc<dyn Component>,
    weights: [u32; 2],
    store: DisposableStore,
}

impl HorizontalSplitView {
    pub fn new(
        host: &Rc<dyn EditorHost>,
        first: Rc<dyn Component>,
        second: Rc<dyn Component>,
        weights: [u32; 2],
    ) -> Self {
        let element = host.create_element();
        host.set_children(element, &[first.element(), second.element()]);
        let store = DisposableStore::new();
        store.add(Rc::clone(&first));
        store.add(Rc::clone(&second));
        Self {
            element,
            first,
            second,
            weights,
            store,
        }
    }

    /// Widths the two panes get for a total of `width`.
    #[must_use]
    pub fn split_widths(&self, width: u32) -> (u32, u32) {
        split_widths(
            width,
            self.weights,
            self.first.size_bounds(),
            self.second.size_bounds(),
        )
    }
}

fn split_widths(width: u32, weights: [u32; 2], first: SizeBounds, second: SizeBounds) -> (u32, u32) {
    let total = u64::from(weights[0]) + u64::from(weights[1]);
    let proportional = if total == 0 {
        width / 2
    } else {
        // Fits: the quotient is at most `width`.
        u32::try_from(u64::from(width) * u64::from(weights[0]) / total).unwrap_or(width)
    };
    let mut left = first.clamp_width(proportional).min(width);
    let right_wanted = width - left;
    let right = second.clamp_width(right_wanted);
    if right != right_wanted {
        left = first.clamp_width(width.saturating_sub(right)).min(width);
    }
    (left, width - left)
}

impl Component for HorizontalSplitView {
    fn element(&self) -> ElementHandle {
        self.element
    }

    fn layout(&self, size: Size) {
        let (left, right) = self.split_widths(size.width);
        trace!(target: "vizhost.layout", left, right, height = size.height, "split");
        self.first.layout(Size::new(left, size.height));
        self.second.layout(Size::new(right, size.height));
    }

    fn size_bounds(&self) -> SizeBounds {
        let a = self.first.size_bounds();
        let b = self.second.size_bounds();
        SizeBounds {
            min_width: a.min_width.saturating_add(b.min_width),
            max_width: a.max_width.saturating_add(b.max_width),
            min_height: a.min_height.max(b.min_height),
            max_height: a.max_height.min(b.max_height),
        }
    }
}

impl Disposable for HorizontalSplitView {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}
