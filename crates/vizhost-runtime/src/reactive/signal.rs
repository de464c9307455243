#![forbid(unsafe_code)]

//! Value-less observables.
//!
//! A [`Signal`] carries no data; triggering it re-runs whatever read it,
//! even though nothing compares equal or unequal. Used for "something
//! happened" notifications such as a selection arriving from outside.

use std::cell::Cell;
use std::rc::Rc;

use super::graph::{NodeId, ObserverList, ObserverRef, Reader, Source, Staleness};
use super::transaction::{Transaction, record_write};

struct SignalNode {
    id: NodeId,
    version: Cell<u64>,
    observers: ObserverList,
}

impl Source for SignalNode {
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

/// An observable event with no value.
#[derive(Clone)]
pub struct Signal {
    node: Rc<SignalNode>,
}

impl Signal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: Rc::new(SignalNode {
                id: NodeId::next(),
                version: Cell::new(0),
                observers: ObserverList::default(),
            }),
        }
    }

    /// Subscribe the reader's evaluation to this signal.
    pub fn read(&self, reader: &Reader) {
        reader.record(Rc::clone(&self.node) as Rc<dyn Source>);
    }

    /// Mark every reader stale. Joins the current transaction if any.
    pub fn trigger(&self) {
        self.node.version.set(self.node.version.get() + 1);
        let _tx = Transaction::begin();
        record_write();
        self.node.observers.mark_all(Staleness::Stale);
    }

    /// Number of times the signal has been triggered.
    #[must_use]
    pub fn trigger_count(&self) -> u64 {
        self.node.version.get()
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.node.id)
            .field("triggers", &self.node.version.get())
            .finish()
    }
}
