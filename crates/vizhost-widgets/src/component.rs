#![forbid(unsafe_code)]

//! Sizing and layout units.
//!
//! A [`Component`] owns one page element and lays itself out when told
//! its size. Composite components forward layout and size bounds to their
//! children by delegation; nothing here inherits behavior.
//!
//! # Invariants
//!
//! 1. A component owns its children: disposing it disposes them.
//! 2. [`DynamicDelegatingComponent`] never forwards the same size twice in
//!    a row, and a child swapped in is laid out at the last known size.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;
use vizhost_runtime::{
    Autorun, Disposable, DisposableStore, DisposeResult, FnDisposable, autorun_simple,
    to_disposable,
};

use crate::host::{EditorHost, ElementHandle};

/// Pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Minimum and maximum size a component accepts. `u32::MAX` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl SizeBounds {
    pub const UNBOUNDED: Self = Self {
        min_width: 0,
        max_width: u32::MAX,
        min_height: 0,
        max_height: u32::MAX,
    };

    pub const ZERO: Self = Self {
        min_width: 0,
        max_width: 0,
        min_height: 0,
        max_height: 0,
    };

    #[must_use]
    pub fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(self.min_width, self.max_width.max(self.min_width))
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

pub trait Component: Disposable {
    fn element(&self) -> ElementHandle;
    fn layout(&self, size: Size);
    fn size_bounds(&self) -> SizeBounds {
        SizeBounds::UNBOUNDED
    }
}

/// Append `component`'s element to `parent`; disposing the guard removes it.
pub fn mount(
    host: &Rc<dyn EditorHost>,
    parent: ElementHandle,
    component: &dyn Component,
) -> FnDisposable {
    let child = component.element();
    host.append_child(parent, child);
    let host = Rc::clone(host);
    to_disposable(move || host.remove_child(parent, child))
}

/// A component that is another component plus extra owned resources.
pub struct DelegatingComponent {
    inner: Rc<dyn Component>,
    store: DisposableStore,
}

impl DelegatingComponent {
    #[must_use]
    pub fn new(inner: Rc<dyn Component>) -> Self {
        let store = DisposableStore::new();
        store.add(Rc::clone(&inner));
        Self { inner, store }
    }

    /// Scope for resources that live as long as this component.
    #[must_use]
    pub fn store(&self) -> &DisposableStore {
        &self.store
    }

    #[must_use]
    pub fn inner(&self) -> &Rc<dyn Component> {
        &self.inner
    }
}

impl Component for DelegatingComponent {
    fn element(&self) -> ElementHandle {
        self.inner.element()
    }

    fn layout(&self, size: Size) {
        self.inner.layout(size);
    }

    fn size_bounds(&self) -> SizeBounds {
        self.inner.size_bounds()
    }
}

impl Disposable for DelegatingComponent {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}

/// A component whose child can be swapped at any time.
pub struct DynamicDelegatingComponent {
    host: Rc<dyn EditorHost>,
    element: ElementHandle,
    inner: RefCell<Option<Rc<dyn Component>>>,
    last_size: Cell<Option<Size>>,
    store: DisposableStore,
}

impl DynamicDelegatingComponent {
    #[must_use]
    pub fn new(host: Rc<dyn EditorHost>) -> Self {
        let element = host.create_element();
        Self {
            host,
            element,
            inner: RefCell::new(None),
            last_size: Cell::new(None),
            store: DisposableStore::new(),
        }
    }

    /// Show `component` instead of the current child, which is disposed.
    pub fn set_component(&self, component: Rc<dyn Component>) {
        self.store.clear();
        self.store.add(Rc::clone(&component));
        self.host.set_children(self.element, &[component.element()]);
        if let Some(size) = self.last_size.get() {
            component.layout(size);
        }
        self.inner.replace(Some(component));
    }

    #[must_use]
    pub fn has_component(&self) -> bool {
        self.inner.borrow().is_some()
    }
}

impl Component for DynamicDelegatingComponent {
    fn element(&self) -> ElementHandle {
        self.element
    }

    fn layout(&self, size: Size) {
        if self.last_size.get() == Some(size) {
            return;
        }
        self.last_size.set(Some(size));
        let inner = self.inner.borrow().clone();
        if let Some(inner) = inner {
            inner.layout(size);
        }
    }

    fn size_bounds(&self) -> SizeBounds {
        self.inner
            .borrow()
            .as_ref()
            .map_or(SizeBounds::ZERO, |inner| inner.size_bounds())
    }
}

impl Disposable for DynamicDelegatingComponent {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        self.inner.replace(None);
        Ok(())
    }
}

/// Binds a component to a page element and lays it out on every size
/// change the page reports.
pub struct SizedHost {
    component: Rc<dyn Component>,
    store: DisposableStore,
}

impl SizedHost {
    pub fn new(host: &Rc<dyn EditorHost>, element: ElementHandle, component: Rc<dyn Component>) -> Self {
        let store = DisposableStore::new();
        store.add(Rc::clone(&component));
        store.add(mount(host, element, &*component));

        let size = host.element_size(element);
        let target = Rc::clone(&component);
        let layout: Autorun = autorun_simple(move |r| {
            let size = size.read(r);
            debug!(target: "vizhost.layout", %element, %size, "layout");
            target.layout(size);
        });
        store.add(layout);
        Self { component, store }
    }

    #[must_use]
    pub fn component(&self) -> &Rc<dyn Component> {
        &self.component
    }
}

impl Disposable for SizedHost {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_width_respects_bounds() {
        let bounds = SizeBounds {
            min_width: 10,
            max_width: 20,
            ..SizeBounds::UNBOUNDED
        };
        assert_eq!(bounds.clamp_width(5), 10);
        assert_eq!(bounds.clamp_width(15), 15);
        assert_eq!(bounds.clamp_width(25), 20);
        assert_eq!(SizeBounds::UNBOUNDED.clamp_width(7), 7);
    }

    #[test]
    fn size_display() {
        assert_eq!(Size::new(800, 600).to_string(), "800x600");
    }
}
