#![forbid(unsafe_code)]

//! Lifting an optional cell into an optional stable derived value.

use std::cell::RefCell;
use std::rc::Rc;

use super::derived::Derived;
use super::observable::Observable;

/// Split `source` into "is there a value yet" and "the value".
///
/// The result is `None` while `source` is `None`. Once a value arrives it
/// is `Some(inner)`, and `inner` is the same [`Derived`] from then on: it
/// follows every later value of `source` and keeps the last one while
/// `source` is `None` again. Consumers that mount a view on the first
/// `Some` therefore mount once and are never rebuilt by later values.
pub fn map_out_none<T: Clone + PartialEq + 'static>(
    source: &Observable<Option<T>>,
) -> Derived<Option<Derived<T>>> {
    let inner: Rc<RefCell<Option<Derived<T>>>> = Rc::new(RefCell::new(None));
    let source = source.clone();
    Derived::with_equality(
        move |r| {
            let first = source.read(r)?;
            let mut slot = inner.borrow_mut();
            let derived = slot.get_or_insert_with(|| {
                let source = source.clone();
                let last = RefCell::new(first);
                Derived::new(move |r| match source.read(r) {
                    Some(value) => {
                        *last.borrow_mut() = value.clone();
                        value
                    }
                    None => last.borrow().clone(),
                })
            });
            Some(derived.clone())
        },
        |a, b| a.as_ref().map(Derived::id) == b.as_ref().map(Derived::id),
    )
}
