#![forbid(unsafe_code)]

//! Dependency-graph plumbing shared by cells, derived values and autoruns.
//!
//! # Design
//!
//! Every node carries a [`NodeId`]. Value-holding nodes implement
//! [`Source`]: they expose a change version and a list of observers.
//! Nodes that re-evaluate implement [`Observer`]: they get marked when an
//! upstream source changes.
//!
//! Propagation is two-phase. A write marks direct observers
//! [`Staleness::Stale`] and everything further downstream
//! [`Staleness::MaybeStale`] (push). Re-evaluation happens lazily, when a
//! value is read or when the transaction flushes pending autoruns (pull).
//! A `MaybeStale` node settles its dependencies first and only recomputes
//! when one of their change versions moved. This is what keeps derived
//! values glitch-free and memoized.
//!
//! # Invariants
//!
//! 1. A node that is not `Fresh` never has a `Fresh` observer that still
//!    depends on it, except transiently during a flush.
//! 2. A dependency list never contains the same source twice.
//! 3. Observer lists hold weak references; dropped observers are pruned
//!    lazily on the next mark.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

thread_local! {
    static NEXT_NODE_ID: Cell<u64> = const { Cell::new(1) };
}

/// Identity of a node in the reactive graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        NEXT_NODE_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            Self(id)
        })
    }

    /// Raw numeric value, useful for log fields.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// How far a node is from its last evaluated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Staleness {
    Fresh,
    MaybeStale,
    Stale,
}

/// A node whose value can be read and depended on.
pub(crate) trait Source {
    fn node_id(&self) -> NodeId;

    /// Incremented each time the observable value actually changes.
    fn change_version(&self) -> u64;

    /// Bring the value up to date. No-op for plain cells.
    fn settle(&self);

    fn add_observer(&self, observer: ObserverRef);

    fn remove_observer(&self, id: NodeId);
}

/// A node that re-evaluates when its sources change.
pub(crate) trait Observer {
    fn mark(&self, staleness: Staleness);
}

/// Weak handle to an observer, keyed by id for removal.
#[derive(Clone)]
pub(crate) struct ObserverRef {
    pub(crate) id: NodeId,
    pub(crate) target: Weak<dyn Observer>,
}

/// Observer list stored on each source.
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: RefCell<Vec<ObserverRef>>,
}

impl ObserverList {
    pub(crate) fn add(&self, observer: ObserverRef) {
        let mut entries = self.entries.borrow_mut();
        if !entries.iter().any(|entry| entry.id == observer.id) {
            entries.push(observer);
        }
    }

    pub(crate) fn remove(&self, id: NodeId) {
        self.entries.borrow_mut().retain(|entry| entry.id != id);
    }

    /// Mark every live observer. The borrow is released before any
    /// observer runs so marks may cascade freely.
    pub(crate) fn mark_all(&self, staleness: Staleness) {
        let live: Vec<Rc<dyn Observer>> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|entry| entry.target.strong_count() > 0);
            entries.iter().filter_map(|entry| entry.target.upgrade()).collect()
        };
        for observer in live {
            observer.mark(staleness);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.target.strong_count() > 0)
            .count()
    }
}

/// A source read during an evaluation, with the version seen at the time.
#[derive(Clone)]
pub(crate) struct Dependency {
    pub(crate) source: Rc<dyn Source>,
    pub(crate) seen_version: u64,
}

/// Tracking context handed to derived computations and autorun bodies.
///
/// Reading a cell or derived value through a `Reader` records it as a
/// dependency of the evaluation in progress. Reading without one (via
/// `get()`) is untracked.
pub struct Reader {
    owner: NodeId,
    deps: RefCell<Vec<Dependency>>,
}

impl Reader {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            owner,
            deps: RefCell::new(Vec::new()),
        }
    }

    /// Record `source` at its current version. The caller settles the
    /// source before recording.
    pub(crate) fn record(&self, source: Rc<dyn Source>) {
        let id = source.node_id();
        if id == self.owner {
            return;
        }
        let mut deps = self.deps.borrow_mut();
        if deps.iter().any(|dep| dep.source.node_id() == id) {
            return;
        }
        let seen_version = source.change_version();
        deps.push(Dependency {
            source,
            seen_version,
        });
    }

    pub(crate) fn into_dependencies(self) -> Vec<Dependency> {
        self.deps.into_inner()
    }

    /// Id of the node being evaluated.
    #[must_use]
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Number of distinct sources read so far.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.deps.borrow().len()
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("owner", &self.owner)
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}

/// Settle each dependency in order and report whether any of them moved
/// past the version recorded at the last evaluation.
pub(crate) fn any_dependency_changed(deps: &RefCell<Vec<Dependency>>) -> bool {
    let snapshot: Vec<Dependency> = deps.borrow().clone();
    snapshot.iter().any(|dep| {
        dep.source.settle();
        dep.source.change_version() != dep.seen_version
    })
}

/// Replace `current` with `next`, moving observer registrations so the
/// node only hears from the sources it read last time.
pub(crate) fn rewire(observer: &ObserverRef, current: &RefCell<Vec<Dependency>>, next: Vec<Dependency>) {
    let previous = std::mem::take(&mut *current.borrow_mut());
    for dep in &previous {
        let id = dep.source.node_id();
        if !next.iter().any(|n| n.source.node_id() == id) {
            dep.source.remove_observer(observer.id);
        }
    }
    for dep in &next {
        dep.source.add_observer(observer.clone());
    }
    *current.borrow_mut() = next;
}

/// Detach `observer` from every source it currently depends on.
pub(crate) fn detach(observer: NodeId, current: &RefCell<Vec<Dependency>>) {
    let previous = std::mem::take(&mut *current.borrow_mut());
    for dep in previous {
        dep.source.remove_observer(observer);
    }
}
