#![forbid(unsafe_code)]

//! Mutable observable cell with version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted storage.
//! When the value changes (by its equality function, `PartialEq` by
//! default) the version is bumped and every observer is marked stale
//! inside the current transaction, or a one-shot transaction opened for
//! the write.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `get()`       | O(1)                       |
//! | `read()`      | O(D) where D = reader deps |
//! | `set()`       | O(O) where O = observers   |
//!
//! # Failure Modes
//!
//! - **Write from inside `with()`**: calling `set()` while a `with()`
//!   closure holds the value panics (RefCell borrow rules).
//! - **Observer leak**: observers are weak; a dropped autorun or derived
//!   value stops receiving marks and is pruned on the next write.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::derived::Derived;
use super::graph::{NodeId, ObserverList, ObserverRef, Reader, Source, Staleness};
use super::transaction::{Transaction, record_write};

/// Equality used to suppress no-op writes.
type EqualsFn<T> = fn(&T, &T) -> bool;

/// Shared node behind an [`Observable<T>`].
pub(crate) struct CellNode<T> {
    id: NodeId,
    value: RefCell<T>,
    version: Cell<u64>,
    observers: ObserverList,
    equals: EqualsFn<T>,
}

impl<T: 'static> Source for CellNode<T> {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn change_version(&self) -> u64 {
        self.version.get()
    }

    fn settle(&self) {}

    fn add_observer(&self, observer: ObserverRef) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, id: NodeId) {
        self.observers.remove(id);
    }
}

/// A shared, version-tracked mutable value.
///
/// Cloning an `Observable` creates a new handle to the **same** cell.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. `set(v)` where `v` equals the current value is a no-op: no version
///    bump, no observer is marked.
/// 3. Observers are marked in registration order.
pub struct Observable<T> {
    node: Rc<CellNode<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("id", &self.node.id)
            .field("value", &self.node.value.borrow())
            .field("version", &self.node.version.get())
            .field("observer_count", &self.node.observers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a cell with the given initial value at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_equality(value, |a, b| a == b)
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create a cell that compares values with `equals` instead of
    /// `PartialEq`. Useful for handles such as `Rc<dyn Trait>` where
    /// pointer identity is the meaningful equality.
    #[must_use]
    pub fn with_equality(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            node: Rc::new(CellNode {
                id: NodeId::next(),
                value: RefCell::new(value),
                version: Cell::new(0),
                observers: ObserverList::default(),
                equals,
            }),
        }
    }

    /// Current value, untracked.
    #[must_use]
    pub fn get(&self) -> T {
        self.node.value.borrow().clone()
    }

    /// Current value, recorded as a dependency of the reader's evaluation.
    pub fn read(&self, reader: &Reader) -> T {
        reader.record(Rc::clone(&self.node) as Rc<dyn Source>);
        self.get()
    }

    /// Access the current value by reference without cloning. Untracked.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.node.value.borrow())
    }

    /// Replace the value. If it differs from the current one the version
    /// is bumped and observers are marked stale; dependent autoruns run
    /// when the enclosing transaction ends.
    pub fn set(&self, value: T) {
        let changed = {
            let mut slot = self.node.value.borrow_mut();
            if (self.node.equals)(&*slot, &value) {
                false
            } else {
                *slot = value;
                true
            }
        };
        if changed {
            self.publish();
        }
    }

    /// Modify the value in place. Observers are marked only if the
    /// result differs from a snapshot taken before `f` ran.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut slot = self.node.value.borrow_mut();
            let before = slot.clone();
            f(&mut *slot);
            !(self.node.equals)(&before, &*slot)
        };
        if changed {
            self.publish();
        }
    }

    /// Current version. Starts at 0; +1 per value-changing write.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.node.version.get()
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.node.observers.len()
    }

    /// Identity of this cell in the reactive graph.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Derived value computed from this cell.
    pub fn map<U: Clone + PartialEq + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Derived<U> {
        let source = self.clone();
        Derived::new(move |r| {
            source.read(r);
            source.with(&f)
        })
    }

    fn publish(&self) {
        self.node.version.set(self.node.version.get() + 1);
        let _tx = Transaction::begin();
        record_write();
        self.node.observers.mark_all(Staleness::Stale);
    }
}
