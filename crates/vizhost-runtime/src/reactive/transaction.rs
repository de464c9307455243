#![forbid(unsafe_code)]

//! Transactions: grouped writes with a single propagation pass.
//!
//! Writes inside a transaction update cell values immediately, but
//! autoruns only re-evaluate when the outermost transaction ends. Every
//! write opens an implicit one-shot transaction when none is active, so
//! propagation always goes through the same flush.
//!
//! # Usage
//!
//! ```ignore
//! use vizhost_runtime::reactive::{transaction, Observable};
//!
//! let x = Observable::new(0);
//! let y = Observable::new(0);
//!
//! transaction(|_tx| {
//!     x.set(1);  // value visible immediately, autoruns deferred
//!     y.set(2);
//! });  // dependent autoruns run here, each at most once
//! ```
//!
//! # Invariants
//!
//! 1. Nested transactions are supported: only the outermost one flushes.
//! 2. Within a transaction, `get()` always returns the latest value.
//! 3. After a transaction ends, every affected autorun has observed the
//!    final state, never an intermediate one.
//! 4. Autoruns scheduled during the flush (by writes inside other
//!    autoruns) run in the same flush, in scheduling order.
//!
//! # Failure Modes
//!
//! - **Autorun panics during flush**: remaining autoruns still run. The
//!   first panic is re-raised once the queue is drained.
//! - **Panic inside the transaction body**: written values stay written.
//!   Pending autoruns are not run during unwinding; they stay stale and
//!   re-evaluate on the next change that reaches them.
//! - **Runaway feedback**: an autorun that keeps re-triggering itself is
//!   cut off after [`MAX_FLUSH_ITERATIONS`] runs with a panic.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, error, info_span, warn};
use web_time::Instant;

/// Upper bound on autorun executions within one flush.
pub const MAX_FLUSH_ITERATIONS: usize = 100_000;

/// Something the flush loop can re-evaluate.
pub(crate) trait Effect {
    /// Settle dependencies and run if something actually changed.
    /// Returns `true` when the body executed.
    fn run_if_stale(&self) -> bool;

    /// The pending run was dropped without executing; allow rescheduling.
    fn abandon(&self);
}

/// Thread-local transaction context.
struct TransactionContext {
    /// Nesting depth. Flush when the outermost scope ends.
    depth: u32,
    /// Autoruns waiting for the flush.
    pending: VecDeque<Rc<dyn Effect>>,
    /// Value-changing writes recorded in this transaction.
    writes: u64,
    /// Set while the outermost scope drains `pending`.
    flushing: bool,
}

thread_local! {
    static TX_CTX: RefCell<Option<TransactionContext>> = const { RefCell::new(None) };
}

/// Returns true if a transaction is open on this thread.
pub fn in_transaction() -> bool {
    TX_CTX.with(|ctx| ctx.borrow().is_some())
}

/// Queue an autorun for the current flush. Opens a one-shot transaction
/// when called outside of one.
pub(crate) fn schedule(effect: Rc<dyn Effect>) {
    let rejected = TX_CTX.with(|ctx| {
        let mut guard = ctx.borrow_mut();
        match guard.as_mut() {
            Some(tx) => {
                tx.pending.push_back(effect);
                None
            }
            None => Some(effect),
        }
    });
    if let Some(effect) = rejected {
        let _tx = Transaction::begin();
        schedule(effect);
    }
}

/// Count a value-changing write against the current transaction.
pub(crate) fn record_write() {
    TX_CTX.with(|ctx| {
        if let Some(tx) = ctx.borrow_mut().as_mut() {
            tx.writes = tx.writes.saturating_add(1);
        }
    });
}

fn pop_pending() -> Option<Rc<dyn Effect>> {
    TX_CTX.with(|ctx| ctx.borrow_mut().as_mut().and_then(|tx| tx.pending.pop_front()))
}

fn take_context() -> Option<TransactionContext> {
    TX_CTX.with(|ctx| ctx.borrow_mut().take())
}

/// Drain pending autoruns. Called by the outermost `Transaction::drop`.
fn flush() {
    let writes = TX_CTX.with(|ctx| {
        ctx.borrow_mut().as_mut().map_or(0, |tx| {
            tx.flushing = true;
            tx.writes
        })
    });

    let started = Instant::now();
    let _span = info_span!(
        "reactive.flush",
        writes,
        effects_run = tracing::field::Empty,
        duration_us = tracing::field::Empty
    )
    .entered();

    let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;
    let mut effects_run = 0_u64;
    let mut iterations = 0_usize;

    while let Some(effect) = pop_pending() {
        iterations += 1;
        if iterations > MAX_FLUSH_ITERATIONS {
            let leftover = abandon_context();
            error!(
                target: "vizhost.reactive",
                iterations,
                leftover,
                "autorun feedback loop did not settle"
            );
            panic!("reactive flush exceeded {MAX_FLUSH_ITERATIONS} autorun runs");
        }
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| effect.run_if_stale()));
        match result {
            Ok(true) => effects_run += 1,
            Ok(false) => {}
            Err(payload) => {
                if first_panic.is_none() {
                    first_panic = Some(payload);
                }
            }
        }
    }

    take_context();

    let duration_us = started.elapsed().as_micros() as u64;
    let span = tracing::Span::current();
    span.record("effects_run", effects_run);
    span.record("duration_us", duration_us);
    debug!(writes, effects_run, duration_us, "reactive flush complete");

    if let Some(payload) = first_panic {
        std::panic::resume_unwind(payload);
    }
}

/// Drop the context and release every queued autorun. Returns how many
/// were pending.
fn abandon_context() -> usize {
    let pending: Vec<Rc<dyn Effect>> = take_context()
        .map(|tx| tx.pending.into_iter().collect())
        .unwrap_or_default();
    let count = pending.len();
    for effect in pending {
        effect.abandon();
    }
    count
}

/// RAII guard for a transaction.
///
/// While a `Transaction` is alive, autoruns affected by writes are queued
/// instead of run. When the outermost guard drops, the queue is drained.
#[must_use = "dropping the guard ends the transaction immediately"]
pub struct Transaction {
    is_root: bool,
}

impl Transaction {
    /// Open a transaction, or join the one already open on this thread.
    pub fn begin() -> Self {
        let is_root = TX_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(tx) => {
                    tx.depth += 1;
                    false
                }
                None => {
                    *guard = Some(TransactionContext {
                        depth: 1,
                        pending: VecDeque::new(),
                        writes: 0,
                        flushing: false,
                    });
                    true
                }
            }
        });
        Self { is_root }
    }

    /// Whether this guard opened the transaction (and will flush it).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Number of autoruns queued so far.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        TX_CTX.with(|ctx| ctx.borrow().as_ref().map_or(0, |tx| tx.pending.len()))
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let should_flush = TX_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(tx) => {
                    tx.depth = tx.depth.saturating_sub(1);
                    tx.depth == 0 && !tx.flushing
                }
                None => false,
            }
        });

        if !should_flush {
            return;
        }

        if std::thread::panicking() {
            let leftover = abandon_context();
            if leftover > 0 {
                warn!(leftover, "transaction unwound before flush; autoruns left stale");
            }
            return;
        }

        flush();
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("is_root", &self.is_root)
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Run `f` inside a transaction and flush when it returns.
pub fn transaction<R>(f: impl FnOnce(&Transaction) -> R) -> R {
    let tx = Transaction::begin();
    f(&tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Observable, autorun};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn transaction_defers_autoruns() {
        let obs = Observable::new(0);
        let runs = Rc::new(Cell::new(0u32));
        let runs_clone = Rc::clone(&runs);
        let obs_clone = obs.clone();
        let _run = autorun(move |r, _| {
            obs_clone.read(r);
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        {
            let tx = Transaction::begin();
            obs.set(1);
            obs.set(2);
            obs.set(3);
            assert_eq!(runs.get(), 1);
            assert!(tx.pending_count() >= 1);
        }
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn values_visible_inside_transaction() {
        let obs = Observable::new(0);
        transaction(|_| {
            obs.set(42);
            assert_eq!(obs.get(), 42);
        });
    }

    #[test]
    fn nested_only_outermost_flushes() {
        let obs = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let obs_clone = obs.clone();
        let _run = autorun(move |r, _| seen_clone.borrow_mut().push(obs_clone.read(r)));

        {
            let outer = Transaction::begin();
            assert!(outer.is_root());
            obs.set(1);
            {
                let inner = Transaction::begin();
                assert!(!inner.is_root());
                obs.set(2);
            }
            assert_eq!(*seen.borrow(), vec![0]);
        }
        assert_eq!(*seen.borrow(), vec![0, 2]);
    }

    #[test]
    fn context_cleared_after_flush() {
        let obs = Observable::new(0);
        transaction(|_| obs.set(1));
        assert!(!in_transaction());
    }

    #[test]
    fn transaction_returns_closure_value() {
        let value = transaction(|tx| if tx.is_root() { 7 } else { 0 });
        assert_eq!(value, 7);
    }

    #[test]
    fn writes_from_autorun_flush_in_same_pass() {
        let source = Observable::new(1);
        let mirror = Observable::new(0);
        let seen = Rc::new(Cell::new(0));

        let (s, m) = (source.clone(), mirror.clone());
        let _copy = autorun(move |r, _| m.set(s.read(r) * 10));
        let (m2, seen2) = (mirror.clone(), Rc::clone(&seen));
        let _watch = autorun(move |r, _| seen2.set(m2.read(r)));
        assert_eq!(seen.get(), 10);

        source.set(2);
        assert_eq!(seen.get(), 20);
        assert!(!in_transaction());
    }

    #[test]
    fn panic_in_autorun_still_runs_others() {
        let obs = Observable::new(0);
        let other_runs = Rc::new(Cell::new(0u32));

        let o1 = obs.clone();
        let _bad = autorun(move |r, _| {
            if o1.read(r) == 1 {
                panic!("boom");
            }
        });
        let (o2, runs) = (obs.clone(), Rc::clone(&other_runs));
        let _good = autorun(move |r, _| {
            o2.read(r);
            runs.set(runs.get() + 1);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| obs.set(1)));
        assert!(result.is_err());
        assert_eq!(other_runs.get(), 2);
        assert!(!in_transaction());
    }

    #[test]
    fn panic_in_body_leaves_graph_usable() {
        let obs = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        let (o, s) = (obs.clone(), Rc::clone(&seen));
        let _run = autorun(move |r, _| s.set(o.read(r)));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            transaction(|_| {
                obs.set(5);
                panic!("abort");
            })
        }));
        assert!(result.is_err());
        assert!(!in_transaction());
        assert_eq!(obs.get(), 5);
        assert_eq!(seen.get(), 0);

        obs.set(6);
        assert_eq!(seen.get(), 6);
    }

    #[test]
    fn runaway_feedback_is_cut_off() {
        let counter = Observable::new(0u64);
        let c = counter.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let run = autorun(move |r, _| {
                let v = c.read(r);
                c.set(v + 1);
            });
            drop(run);
        }));
        assert!(result.is_err());
        assert!(!in_transaction());
    }
}
