#![forbid(unsafe_code)]

//! Reactive primitives: cells, derived values, autoruns, transactions.
//!
//! # Architecture
//!
//! - [`Observable`]: mutable cell with version tracking.
//! - [`Derived`]: lazy, memoized value computed from other observables.
//! - [`Signal`]: value-less observable, used as a trigger.
//! - [`map_out_none`]: optional cell to optional stable derived value.
//! - [`autorun`]: side effect re-run when what it read changes.
//! - [`Transaction`] / [`transaction`]: group writes so dependents run once
//!   on the final state.
//!
//! Dependencies are discovered dynamically: whatever a computation reads
//! through its [`Reader`] during an evaluation is what it depends on for
//! the next change.
//!
//! # Invariants
//!
//! 1. No autorun observes a state where some writes of a transaction are
//!    applied and others are not.
//! 2. A derived value recomputes at most once per change of its inputs,
//!    and only when read or when an observer needs it.
//! 3. Writes that do not change the value do not re-run anything.
//! 4. All graph state is thread-local. Handles are `!Send`.

mod autorun;
mod derived;
mod graph;
mod observable;
mod optional;
mod signal;
pub mod transaction;

pub use autorun::{Autorun, autorun, autorun_simple, autorun_with_store};
pub use derived::Derived;
pub use graph::{NodeId, Reader};
pub use observable::Observable;
pub use optional::map_out_none;
pub use signal::Signal;
pub use transaction::{Transaction, in_transaction, transaction};
