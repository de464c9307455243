#![forbid(unsafe_code)]

//! Side-effecting reactions that re-run when what they read changes.
//!
//! An autorun executes once immediately, then again at the end of every
//! transaction that changed one of the values it read during its previous
//! run. Each run gets a fresh [`DisposableStore`]; resources registered in
//! it are disposed right before the next run and when the autorun itself
//! is disposed.
//!
//! # Failure Modes
//!
//! - **Body panics**: during a flush the panic is caught, the remaining
//!   autoruns run, and the first panic is re-raised. The failed autorun
//!   keeps its previous dependencies.
//! - **Write to something it read**: the autorun is scheduled again in
//!   the same flush; a body that never converges trips the flush limit.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use super::graph::{
    Dependency, NodeId, Observer, ObserverRef, Reader, Staleness, any_dependency_changed, detach,
    rewire,
};
use super::transaction::{Effect, schedule};
use crate::lifecycle::{Disposable, DisposableStore, DisposeResult};

type Body = Box<dyn FnMut(&Reader, &DisposableStore)>;

struct AutorunNode {
    id: NodeId,
    body: RefCell<Body>,
    state: Cell<Staleness>,
    queued: Cell<bool>,
    disposed: Cell<bool>,
    runs: Cell<u64>,
    deps: RefCell<Vec<Dependency>>,
    store: DisposableStore,
    lifetime: Rc<DisposableStore>,
    self_ref: Weak<AutorunNode>,
}

impl AutorunNode {
    fn observer_ref(&self) -> ObserverRef {
        ObserverRef {
            id: self.id,
            target: self.self_ref.clone() as Weak<dyn Observer>,
        }
    }

    fn run(&self) {
        self.store.clear();
        self.state.set(Staleness::Fresh);

        let reader = Reader::new(self.id);
        {
            let mut body = self.body.borrow_mut();
            (*body)(&reader, &self.store);
        }
        self.runs.set(self.runs.get() + 1);

        let deps = reader.into_dependencies();
        let moved = deps
            .iter()
            .any(|dep| dep.source.change_version() != dep.seen_version);
        if self.disposed.get() {
            return;
        }
        rewire(&self.observer_ref(), &self.deps, deps);
        trace!(node = self.id.get(), runs = self.runs.get(), "autorun ran");

        // Something read during this run was written before the run ended.
        if moved {
            self.mark(Staleness::Stale);
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        detach(self.id, &self.deps);
        self.store.dispose_all();
        self.lifetime.dispose_all();
    }
}

impl Observer for AutorunNode {
    fn mark(&self, staleness: Staleness) {
        if self.disposed.get() {
            return;
        }
        if staleness > self.state.get() {
            self.state.set(staleness);
        }
        if !self.queued.replace(true)
            && let Some(me) = self.self_ref.upgrade()
        {
            schedule(me as Rc<dyn Effect>);
        }
    }
}

impl Effect for AutorunNode {
    fn run_if_stale(&self) -> bool {
        self.queued.set(false);
        if self.disposed.get() {
            return false;
        }
        match self.state.get() {
            Staleness::Fresh => false,
            Staleness::MaybeStale => {
                if any_dependency_changed(&self.deps) {
                    self.run();
                    true
                } else {
                    self.state.set(Staleness::Fresh);
                    false
                }
            }
            Staleness::Stale => {
                self.run();
                true
            }
        }
    }

    fn abandon(&self) {
        self.queued.set(false);
    }
}

/// Handle to a running autorun. Dropping it disposes the autorun.
#[must_use = "dropping an Autorun disposes it immediately"]
pub struct Autorun {
    node: Rc<AutorunNode>,
}

impl Autorun {
    /// Stop re-running and dispose the per-run and lifetime stores.
    /// Idempotent.
    pub fn dispose(&self) {
        self.node.dispose();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.node.disposed.get()
    }

    /// Number of completed runs, the initial one included.
    #[must_use]
    pub fn run_count(&self) -> u64 {
        self.node.runs.get()
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }
}

impl Disposable for Autorun {
    fn dispose(&self) -> DisposeResult {
        self.node.dispose();
        Ok(())
    }
}

impl Drop for Autorun {
    fn drop(&mut self) {
        self.node.dispose();
    }
}

impl std::fmt::Debug for Autorun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autorun")
            .field("id", &self.node.id)
            .field("runs", &self.node.runs.get())
            .field("disposed", &self.node.disposed.get())
            .finish()
    }
}

/// Run `body` now and again whenever something it read changes.
///
/// The second argument is a store scoped to a single run: resources added
/// there are disposed before the next run and on disposal.
pub fn autorun(body: impl FnMut(&Reader, &DisposableStore) + 'static) -> Autorun {
    spawn(Box::new(body), Rc::new(DisposableStore::new()))
}

fn spawn(body: Body, lifetime: Rc<DisposableStore>) -> Autorun {
    let node = Rc::new_cyclic(|self_ref| AutorunNode {
        id: NodeId::next(),
        body: RefCell::new(body),
        state: Cell::new(Staleness::Stale),
        queued: Cell::new(false),
        disposed: Cell::new(false),
        runs: Cell::new(0),
        deps: RefCell::new(Vec::new()),
        store: DisposableStore::new(),
        lifetime,
        self_ref: self_ref.clone(),
    });
    node.run();
    Autorun { node }
}

/// Autorun whose body only needs the reader.
pub fn autorun_simple(mut body: impl FnMut(&Reader) + 'static) -> Autorun {
    autorun(move |reader, _| body(reader))
}

/// Autorun that also gets a store living as long as the reaction itself;
/// `body` receives the per-run store, then the lifetime store. Both are
/// disposed with the autorun.
pub fn autorun_with_store(
    mut body: impl FnMut(&Reader, &DisposableStore, &DisposableStore) + 'static,
) -> Autorun {
    let lifetime = Rc::new(DisposableStore::new());
    let held = Rc::clone(&lifetime);
    spawn(
        Box::new(move |reader: &Reader, per_run: &DisposableStore| {
            body(reader, per_run, &held);
        }),
        lifetime,
    )
}
