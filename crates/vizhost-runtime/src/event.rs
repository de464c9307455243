#![forbid(unsafe_code)]

//! Plain callback events.
//!
//! [`Emitter<T>`] is the push-style counterpart to the reactive graph:
//! editor widgets report cursor moves, key presses and content changes
//! through it. Listeners are stored weakly; the [`Listener`] guard keeps
//! the callback alive and removes it when disposed or dropped.
//!
//! # Failure Modes
//!
//! - **Listener added during `fire()`**: it is not called for the event
//!   in flight, only for later ones.
//! - **Listener leak**: dead entries are pruned lazily on the next fire.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::lifecycle::{Disposable, DisposeResult};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct EmitterInner<T> {
    listeners: Vec<CallbackWeak<T>>,
    fired: u64,
}

/// Source of events of type `T`.
///
/// Cloning an `Emitter` creates a new handle to the same listener list.
pub struct Emitter<T> {
    inner: Rc<RefCell<EmitterInner<T>>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Emitter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EmitterInner {
                listeners: Vec::new(),
                fired: 0,
            })),
        }
    }

    /// Register `callback`. It stays registered while the returned
    /// [`Listener`] is alive and not disposed.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Listener {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner.borrow_mut().listeners.push(Rc::downgrade(&strong));
        Listener {
            guard: RefCell::new(Some(Box::new(strong))),
        }
    }

    /// Call every live listener in registration order.
    pub fn fire(&self, event: &T) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.fired += 1;
            inner.listeners.retain(|w| w.strong_count() > 0);
            inner.listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Number of events fired so far.
    #[must_use]
    pub fn fire_count(&self) -> u64 {
        self.inner.borrow().fired
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Emitter")
            .field("listeners", &inner.listeners.len())
            .field("fired", &inner.fired)
            .finish()
    }
}

/// Guard for a registered event callback.
pub struct Listener {
    /// Type-erased strong reference keeping the callback alive.
    guard: RefCell<Option<Box<dyn Any>>>,
}

impl Listener {
    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.borrow().is_some()
    }
}

impl Disposable for Listener {
    fn dispose(&self) -> DisposeResult {
        let guard = self.guard.borrow_mut().take();
        drop(guard);
        Ok(())
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fire_reaches_listeners_in_order() {
        let emitter = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2) = (Rc::clone(&log), Rc::clone(&log));
        let _a = emitter.subscribe(move |v: &i32| l1.borrow_mut().push(("a", *v)));
        let _b = emitter.subscribe(move |v: &i32| l2.borrow_mut().push(("b", *v)));

        emitter.fire(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
        assert_eq!(emitter.fire_count(), 1);
    }

    #[test]
    fn dispose_unsubscribes() {
        let emitter = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let listener = emitter.subscribe(move |_: &()| c.set(c.get() + 1));

        emitter.fire(&());
        listener.dispose().unwrap();
        assert!(!listener.is_active());
        emitter.fire(&());
        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn drop_unsubscribes() {
        let emitter: Emitter<u8> = Emitter::new();
        let listener = emitter.subscribe(|_| {});
        assert_eq!(emitter.listener_count(), 1);
        drop(listener);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn subscribe_during_fire_is_deferred() {
        let emitter: Emitter<u8> = Emitter::new();
        let late = Rc::new(RefCell::new(Vec::new()));
        let count = Rc::new(Cell::new(0));
        let (em, l, c) = (emitter.clone(), Rc::clone(&late), Rc::clone(&count));
        let _outer = emitter.subscribe(move |_| {
            if l.borrow().is_empty() {
                let c = Rc::clone(&c);
                l.borrow_mut().push(em.subscribe(move |_| c.set(c.get() + 1)));
            }
        });
        emitter.fire(&1);
        assert_eq!(count.get(), 0);
        emitter.fire(&2);
        assert_eq!(count.get(), 1);
    }
}
