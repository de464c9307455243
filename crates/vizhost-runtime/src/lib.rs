#![forbid(unsafe_code)]

//! Runtime core for vizhost.
//!
//! The single-threaded reactive graph ([`reactive`]), disposable scopes
//! ([`lifecycle`]) and callback events ([`event`]) that every view and
//! controller in the host is built on.

pub mod event;
pub mod lifecycle;
pub mod reactive;

pub use event::{Emitter, Listener};
pub use lifecycle::{
    Disposable, DisposableStore, DisposeError, DisposeResult, FnDisposable, to_disposable,
};
pub use reactive::{
    Autorun, Derived, NodeId, Observable, Reader, Signal, Transaction, autorun, autorun_simple,
    autorun_with_store, in_transaction, map_out_none, transaction,
};
