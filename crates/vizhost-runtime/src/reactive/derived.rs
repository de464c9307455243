#![forbid(unsafe_code)]

//! Memoized values computed from other observables.
//!
//! # Design
//!
//! [`Derived<T>`] wraps a compute function that reads its inputs through a
//! [`Reader`]. Whatever it reads becomes its dependency set for the next
//! evaluation; the set is rebuilt on every recomputation, so conditional
//! reads subscribe and unsubscribe naturally.
//!
//! Evaluation is lazy. A write upstream only marks the node; the next
//! `get()` (or an observer settling it during a flush) decides whether
//! to recompute. A node that is only *maybe* stale asks its dependencies
//! to settle first and recomputes only if one of them actually changed.
//!
//! # Invariants
//!
//! 1. `get()` never observes an intermediate state of a transaction in
//!    progress: it sees every write made so far.
//! 2. The compute function runs at most once per change of its inputs.
//! 3. `version` increments only when a recomputation produced a value
//!    that differs from the cached one. Observers of an unchanged derived
//!    value are not re-run.
//!
//! # Failure Modes
//!
//! - **Compute function panics**: the cached value remains from the last
//!   successful computation and the node stays stale, so the next `get()`
//!   retries.
//! - **Cycles**: a compute function that (transitively) reads its own
//!   node panics instead of recursing forever.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::graph::{
    Dependency, NodeId, Observer, ObserverList, ObserverRef, Reader, Source, Staleness,
    any_dependency_changed, rewire,
};

type EqualsFn<T> = fn(&T, &T) -> bool;

/// Shared node behind a [`Derived<T>`].
struct DerivedNode<T> {
    id: NodeId,
    compute: Box<dyn Fn(&Reader) -> T>,
    equals: EqualsFn<T>,
    /// `None` only before the first computation.
    cached: RefCell<Option<T>>,
    state: Cell<Staleness>,
    version: Cell<u64>,
    computations: Cell<u64>,
    computing: Cell<bool>,
    deps: RefCell<Vec<Dependency>>,
    observers: ObserverList,
    self_ref: Weak<DerivedNode<T>>,
}

/// Clears the in-progress flag even when the compute function unwinds.
struct ComputingGuard<'a>(&'a Cell<bool>);

impl Drop for ComputingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T: 'static> DerivedNode<T> {
    fn observer_ref(&self) -> ObserverRef {
        ObserverRef {
            id: self.id,
            target: self.self_ref.clone() as Weak<dyn Observer>,
        }
    }

    fn refresh(&self) {
        let has_value = self.cached.borrow().is_some();
        match self.state.get() {
            Staleness::Fresh if has_value => return,
            Staleness::MaybeStale if has_value => {
                if !any_dependency_changed(&self.deps) {
                    self.state.set(Staleness::Fresh);
                    return;
                }
            }
            _ => {}
        }
        self.recompute();
    }

    fn recompute(&self) {
        if self.computing.replace(true) {
            panic!("derived value {} depends on itself", self.id.get());
        }
        let _computing = ComputingGuard(&self.computing);

        let reader = Reader::new(self.id);
        let next = (self.compute)(&reader);
        rewire(&self.observer_ref(), &self.deps, reader.into_dependencies());

        let changed = {
            let mut slot = self.cached.borrow_mut();
            match slot.as_ref() {
                Some(previous) if (self.equals)(previous, &next) => false,
                _ => {
                    *slot = Some(next);
                    true
                }
            }
        };
        if changed {
            self.version.set(self.version.get() + 1);
        }
        self.computations.set(self.computations.get() + 1);
        self.state.set(Staleness::Fresh);
        tracing::trace!(node = self.id.get(), changed, "derived recomputed");
    }
}

impl<T: 'static> Source for DerivedNode<T> {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn change_version(&self) -> u64 {
        self.version.get()
    }

    fn settle(&self) {
        self.refresh();
    }

    fn add_observer(&self, observer: ObserverRef) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, id: NodeId) {
        self.observers.remove(id);
    }
}

impl<T: 'static> Observer for DerivedNode<T> {
    fn mark(&self, staleness: Staleness) {
        let previous = self.state.get();
        if staleness > previous {
            self.state.set(staleness);
        }
        if previous == Staleness::Fresh {
            self.observers.mark_all(Staleness::MaybeStale);
        }
    }
}

/// A lazily-evaluated, memoized value derived from other observables.
///
/// Cloning a `Derived` creates a new handle to the **same** node.
pub struct Derived<T> {
    node: Rc<DerivedNode<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("id", &self.node.id)
            .field("cached", &self.node.cached.borrow())
            .field("state", &self.node.state.get())
            .field("version", &self.node.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Derived<T> {
    /// Create a derived value. `compute` reads its inputs through the
    /// reader it is given; nothing runs until the first read.
    #[must_use]
    pub fn new(compute: impl Fn(&Reader) -> T + 'static) -> Self {
        Self::with_equality(compute, |a, b| a == b)
    }

    /// A derived value with no inputs.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self::new(move |_| value.clone())
    }
}

impl<T: Clone + 'static> Derived<T> {
    /// Like [`Derived::new`] with a custom change test.
    #[must_use]
    pub fn with_equality(compute: impl Fn(&Reader) -> T + 'static, equals: EqualsFn<T>) -> Self {
        let node = Rc::new_cyclic(|self_ref| DerivedNode {
            id: NodeId::next(),
            compute: Box::new(compute),
            equals,
            cached: RefCell::new(None),
            state: Cell::new(Staleness::Stale),
            version: Cell::new(0),
            computations: Cell::new(0),
            computing: Cell::new(false),
            deps: RefCell::new(Vec::new()),
            observers: ObserverList::default(),
            self_ref: self_ref.clone(),
        });
        Self { node }
    }

    /// Current value, recomputing first if an input changed. Untracked.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Current value, recorded as a dependency of the reader's evaluation.
    pub fn read(&self, reader: &Reader) -> T {
        self.node.refresh();
        reader.record(Rc::clone(&self.node) as Rc<dyn Source>);
        self.get()
    }

    /// Access the up-to-date value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.node.refresh();
        let cached = self.node.cached.borrow();
        f(cached
            .as_ref()
            .expect("derived value is computed after refresh"))
    }

    /// Whether the next read may recompute.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.node.state.get() != Staleness::Fresh || self.node.cached.borrow().is_none()
    }

    /// Force the next read to recompute and tell observers.
    pub fn invalidate(&self) {
        self.node.mark(Staleness::Stale);
    }

    /// Increments each time a recomputation produced a different value.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.node.version.get()
    }

    /// Number of times the compute function has run.
    #[must_use]
    pub fn computation_count(&self) -> u64 {
        self.node.computations.get()
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.node.observers.len()
    }

    /// Identity of this node in the reactive graph.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Chain another derived value off this one.
    pub fn map<U: Clone + PartialEq + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Derived<U> {
        let source = self.clone();
        Derived::new(move |r| {
            source.read(r);
            source.with(&f)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Observable, autorun, transaction};
    use std::cell::Cell;

    fn counted<T: Clone + PartialEq + 'static>(
        f: impl Fn(&Reader) -> T + 'static,
    ) -> (Derived<T>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&calls);
        let derived = Derived::new(move |r| {
            c.set(c.get() + 1);
            f(r)
        });
        (derived, calls)
    }

    #[test]
    fn single_dep_derived() {
        let source = Observable::new(10);
        let s = source.clone();
        let doubled = Derived::new(move |r| s.read(r) * 2);
        assert_eq!(doubled.get(), 20);

        source.set(5);
        assert_eq!(doubled.get(), 10);
    }

    #[test]
    fn lazy_until_first_read() {
        let source = Observable::new(1);
        let s = source.clone();
        let (derived, calls) = counted(move |r| s.read(r) + 1);
        assert_eq!(calls.get(), 0);
        assert!(derived.is_stale());

        assert_eq!(derived.get(), 2);
        assert_eq!(calls.get(), 1);
        assert!(!derived.is_stale());
    }

    #[test]
    fn memoization() {
        let source = Observable::new(1);
        let s = source.clone();
        let (derived, calls) = counted(move |r| s.read(r) * 3);

        assert_eq!(derived.get(), 3);
        assert_eq!(derived.get(), 3);
        assert_eq!(derived.get(), 3);
        assert_eq!(calls.get(), 1);

        source.set(2);
        assert_eq!(derived.get(), 6);
        assert_eq!(derived.get(), 6);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn unchanged_result_keeps_version() {
        let source = Observable::new(3);
        let s = source.clone();
        let parity = Derived::new(move |r| s.read(r) % 2);
        assert_eq!(parity.get(), 1);
        let v = parity.version();

        source.set(5);
        assert_eq!(parity.get(), 1);
        assert_eq!(parity.version(), v);
        assert_eq!(parity.computation_count(), 2);
    }

    #[test]
    fn unchanged_intermediate_skips_downstream() {
        let source = Observable::new(3);
        let s = source.clone();
        let parity = Derived::new(move |r| s.read(r) % 2);
        let p = parity.clone();
        let (label, label_calls) = counted(move |r| format!("parity {}", p.read(r)));
        assert_eq!(label.get(), "parity 1");

        source.set(7);
        assert_eq!(label.get(), "parity 1");
        assert_eq!(label_calls.get(), 1);

        source.set(8);
        assert_eq!(label.get(), "parity 0");
        assert_eq!(label_calls.get(), 2);
    }

    #[test]
    fn diamond_dependency() {
        let a = Observable::new(1);
        let (a1, a2) = (a.clone(), a.clone());
        let plus = Derived::new(move |r| a1.read(r) + 1);
        let times = Derived::new(move |r| a2.read(r) * 10);
        let (p, t) = (plus.clone(), times.clone());
        let (sum, calls) = counted(move |r| p.read(r) + t.read(r));

        assert_eq!(sum.get(), 12);
        a.set(2);
        assert_eq!(sum.get(), 23);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn conditional_dependencies_are_rewired() {
        let use_left = Observable::new(true);
        let left = Observable::new("l");
        let right = Observable::new("r");
        let (u, l, rt) = (use_left.clone(), left.clone(), right.clone());
        let (pick, calls) = counted(move |r| if u.read(r) { l.read(r) } else { rt.read(r) });

        assert_eq!(pick.get(), "l");
        assert_eq!(right.observer_count(), 0);
        assert_eq!(left.observer_count(), 1);

        use_left.set(false);
        assert_eq!(pick.get(), "r");
        assert_eq!(left.observer_count(), 0);
        assert_eq!(right.observer_count(), 1);

        left.set("changed");
        assert_eq!(pick.get(), "r");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn constant_never_recomputes() {
        let c = Derived::constant(7);
        assert_eq!(c.get(), 7);
        assert_eq!(c.get(), 7);
        assert_eq!(c.computation_count(), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let (derived, calls) = counted(|_| 1);
        assert_eq!(derived.get(), 1);
        derived.invalidate();
        assert!(derived.is_stale());
        assert_eq!(derived.get(), 1);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn map_chains() {
        let source = Observable::new(2);
        let squared = source.map(|v| v * v);
        let text = squared.map(|v| v.to_string());
        assert_eq!(text.get(), "4");
        source.set(3);
        assert_eq!(text.get(), "9");
    }

    #[test]
    fn with_access() {
        let source = Observable::new(vec![1, 2, 3]);
        let s = source.clone();
        let derived = Derived::new(move |r| s.read(r).into_iter().map(|v| v * 2).collect::<Vec<_>>());
        assert_eq!(derived.with(|v| v.len()), 3);
    }

    #[test]
    fn read_inside_transaction_sees_latest() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        let (a1, b1) = (a.clone(), b.clone());
        let sum = Derived::new(move |r| a1.read(r) + b1.read(r));
        assert_eq!(sum.get(), 2);

        transaction(|_| {
            a.set(10);
            assert_eq!(sum.get(), 11);
            b.set(10);
            assert_eq!(sum.get(), 20);
        });
    }

    #[test]
    fn compute_panic_keeps_previous_value_and_retries() {
        let source = Observable::new(1);
        let s = source.clone();
        let derived = Derived::new(move |r| {
            let v = s.read(r);
            assert!(v != 2, "two is rejected");
            v
        });
        assert_eq!(derived.get(), 1);

        source.set(2);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| derived.get()));
        assert!(result.is_err());
        assert!(derived.is_stale());

        source.set(3);
        assert_eq!(derived.get(), 3);
    }

    #[test]
    fn autorun_over_derived_sees_only_changes() {
        let source = Observable::new(1);
        let s = source.clone();
        let parity = Derived::new(move |r| s.read(r) % 2);
        let runs = Rc::new(Cell::new(0u32));
        let (p, c) = (parity.clone(), Rc::clone(&runs));
        let _run = autorun(move |r, _| {
            p.read(r);
            c.set(c.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        source.set(3);
        assert_eq!(runs.get(), 1);

        source.set(4);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn debug_format() {
        let d = Derived::constant(5);
        let _ = d.get();
        let dbg = format!("{d:?}");
        assert!(dbg.contains("Derived"));
        assert!(dbg.contains('5'));
    }
}
