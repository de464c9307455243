#![forbid(unsafe_code)]

//! Disposable resources and scoped ownership.
//!
//! Every long-lived resource in the host (editor models, autoruns, event
//! listeners, DOM sections, style sheets) implements [`Disposable`].
//! Components own a [`DisposableStore`]; disposing the component disposes
//! the store, which releases everything registered in it in reverse
//! registration order.
//!
//! # Invariants
//!
//! 1. Every resource added to a store is disposed exactly once, either by
//!    `clear()`, by `dispose_all()`, or immediately if the store was
//!    already disposed when it was added.
//! 2. Disposal order is the reverse of registration order.
//! 3. A failure (error or panic) while disposing one resource never
//!    prevents the others from being disposed. Failures are logged under
//!    the `vizhost.lifecycle` target.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use tracing::{error, warn};

/// Error reported by a resource that could not be released cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposeError {
    /// What was being disposed.
    pub resource: String,
    /// Why it failed.
    pub message: String,
}

impl DisposeError {
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DisposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to dispose {}: {}", self.resource, self.message)
    }
}

impl std::error::Error for DisposeError {}

pub type DisposeResult = Result<(), DisposeError>;

/// A resource that must be released explicitly.
///
/// Implementations should be idempotent: a second `dispose()` is a no-op.
pub trait Disposable {
    fn dispose(&self) -> DisposeResult;
}

impl<T: Disposable + ?Sized> Disposable for Rc<T> {
    fn dispose(&self) -> DisposeResult {
        (**self).dispose()
    }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
    fn dispose(&self) -> DisposeResult {
        (**self).dispose()
    }
}

/// A disposable backed by a one-shot closure.
pub struct FnDisposable {
    action: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Disposable for FnDisposable {
    fn dispose(&self) -> DisposeResult {
        let action = self.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
        Ok(())
    }
}

impl fmt::Debug for FnDisposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDisposable")
            .field("pending", &self.action.borrow().is_some())
            .finish()
    }
}

/// Wrap a cleanup closure as a [`Disposable`]. The closure runs at most once.
pub fn to_disposable(action: impl FnOnce() + 'static) -> FnDisposable {
    FnDisposable {
        action: RefCell::new(Some(Box::new(action))),
    }
}

/// A scope owning a set of disposables.
#[derive(Default)]
pub struct DisposableStore {
    items: RefCell<Vec<Box<dyn Disposable>>>,
    disposed: Cell<bool>,
}

impl DisposableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `item`. If the store is already disposed the
    /// item is disposed right away. Use [`register`](Self::register) to
    /// keep a handle to a shared resource.
    pub fn add<D: Disposable + 'static>(&self, item: D) {
        if self.disposed.get() {
            warn!(
                target: "vizhost.lifecycle",
                "resource added to a disposed store; disposing it immediately"
            );
            release(&item);
            return;
        }
        self.items.borrow_mut().push(Box::new(item));
    }

    /// Register a shared resource and hand it back.
    pub fn register<D: Disposable + ?Sized + 'static>(&self, item: Rc<D>) -> Rc<D> {
        self.add(Rc::clone(&item));
        item
    }

    /// Dispose everything registered so far, newest first. The store
    /// stays usable. Returns how many resources were released.
    pub fn clear(&self) -> usize {
        let items = std::mem::take(&mut *self.items.borrow_mut());
        let count = items.len();
        for item in items.into_iter().rev() {
            release(&*item);
        }
        count
    }

    /// Dispose everything and refuse further registrations. Idempotent.
    pub fn dispose_all(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.clear();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

/// Dispose one resource, logging instead of propagating failures.
fn release(item: &dyn Disposable) {
    match catch_unwind(AssertUnwindSafe(|| item.dispose())) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!(
                target: "vizhost.lifecycle",
                resource = %err.resource,
                error = %err.message,
                "dispose failed"
            );
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(target: "vizhost.lifecycle", panic = %message, "dispose panicked");
        }
    }
}

impl Disposable for DisposableStore {
    fn dispose(&self) -> DisposeResult {
        self.dispose_all();
        Ok(())
    }
}

impl Drop for DisposableStore {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl fmt::Debug for DisposableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableStore")
            .field("len", &self.len())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    struct Failing;

    impl Disposable for Failing {
        fn dispose(&self) -> DisposeResult {
            Err(DisposeError::new("failing", "refused"))
        }
    }

    struct Panicking;

    impl Disposable for Panicking {
        fn dispose(&self) -> DisposeResult {
            panic!("dispose exploded");
        }
    }

    fn recorder(log: &Rc<RefCell<Vec<u32>>>, id: u32) -> FnDisposable {
        let log = Rc::clone(log);
        to_disposable(move || log.borrow_mut().push(id))
    }

    #[test]
    fn disposes_in_reverse_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = DisposableStore::new();
        store.add(recorder(&log, 1));
        store.add(recorder(&log, 2));
        store.add(recorder(&log, 3));
        store.dispose_all();
        assert_eq!(*log.borrow(), vec![3, 2, 1]);
    }

    #[test]
    fn dispose_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = DisposableStore::new();
        store.add(recorder(&log, 1));
        store.dispose_all();
        store.dispose_all();
        drop(store);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn clear_keeps_store_usable() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = DisposableStore::new();
        store.add(recorder(&log, 1));
        assert_eq!(store.clear(), 1);
        assert!(!store.is_disposed());
        store.add(recorder(&log, 2));
        assert_eq!(store.len(), 1);
        drop(store);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[traced_test]
    #[test]
    fn add_after_dispose_disposes_immediately() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = DisposableStore::new();
        store.dispose_all();
        store.add(recorder(&log, 9));
        assert_eq!(*log.borrow(), vec![9]);
        assert!(store.is_empty());
        assert!(logs_contain("disposed store"));
    }

    #[traced_test]
    #[test]
    fn failures_do_not_stop_others() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = DisposableStore::new();
        store.add(recorder(&log, 1));
        store.add(Failing);
        store.add(Panicking);
        store.add(recorder(&log, 2));
        store.dispose_all();
        assert_eq!(*log.borrow(), vec![2, 1]);
        assert!(logs_contain("dispose failed"));
        assert!(logs_contain("dispose panicked"));
    }

    #[test]
    fn register_returns_shared_handle() {
        let store = DisposableStore::new();
        let resource = Rc::new(DisposableStore::new());
        let inner = store.register(Rc::clone(&resource));
        assert!(Rc::ptr_eq(&inner, &resource));
        assert!(!inner.is_disposed());
        store.dispose_all();
        assert!(inner.is_disposed());
    }

    #[test]
    fn fn_disposable_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let d = to_disposable(move || c.set(c.get() + 1));
        d.dispose().unwrap();
        d.dispose().unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dispose_error_display() {
        let err = DisposeError::new("editor", "already gone");
        assert_eq!(err.to_string(), "failed to dispose editor: already gone");
    }
}
