//! Property tests for the reactive core.
//!
//! 1. **Glitch freedom**: for any batch of writes applied in one
//!    transaction, an autorun over a derived sum runs exactly once and
//!    sees the sum of the final values.
//! 2. **Memoization**: a derived value's compute count equals the number
//!    of reads that followed an actual change of its input.
//! 3. **Disposal completeness**: resources an autorun registers per run
//!    are released once per re-run, and the last one on disposal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use vizhost_runtime::{Derived, Observable, autorun, autorun_simple, to_disposable, transaction};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transaction_runs_autorun_once_with_final_values(
        writes in prop::collection::vec((0usize..4, -100i64..100), 1..32)
    ) {
        let cells: Vec<Observable<i64>> = (0..4).map(|_| Observable::new(0)).collect();
        let cs = cells.clone();
        let sum = Derived::new(move |r| cs.iter().map(|c| c.read(r)).sum::<i64>());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let (s, out) = (sum.clone(), Rc::clone(&seen));
        let _run = autorun_simple(move |r| out.borrow_mut().push(s.read(r)));

        let mut expected = [0i64; 4];
        transaction(|_| {
            for (index, value) in &writes {
                cells[*index].set(*value);
                expected[*index] = *value;
            }
        });
        let total: i64 = expected.iter().sum();

        let seen = seen.borrow();
        prop_assert!(seen.len() <= 2);
        prop_assert_eq!(*seen.last().unwrap_or(&0), total);
        if total == 0 {
            prop_assert_eq!(seen.len(), 1);
        } else {
            prop_assert_eq!(seen.len(), 2);
        }
    }

    #[test]
    fn derived_recomputes_only_after_changes(values in prop::collection::vec(0u8..4, 1..40)) {
        let source = Observable::new(0u8);
        let calls = Rc::new(Cell::new(0u32));
        let (s, c) = (source.clone(), Rc::clone(&calls));
        let derived = Derived::new(move |r| {
            c.set(c.get() + 1);
            u32::from(s.read(r)) * 3
        });
        prop_assert_eq!(derived.get(), 0);

        let mut expected_calls = 1;
        let mut current = 0u8;
        for v in values {
            source.set(v);
            if v != current {
                expected_calls += 1;
                current = v;
            }
            prop_assert_eq!(derived.get(), u32::from(v) * 3);
        }
        prop_assert_eq!(calls.get(), expected_calls);
    }

    #[test]
    fn per_run_resources_released_once(values in prop::collection::vec(0u8..4, 0..40)) {
        let source = Observable::new(0u8);
        let released = Rc::new(Cell::new(0u64));
        let (s, rel) = (source.clone(), Rc::clone(&released));
        let run = autorun(move |r, store| {
            s.read(r);
            let rel = Rc::clone(&rel);
            store.add(to_disposable(move || rel.set(rel.get() + 1)));
        });

        for v in values {
            source.set(v);
            prop_assert_eq!(released.get(), run.run_count() - 1);
        }

        let runs = run.run_count();
        run.dispose();
        prop_assert_eq!(released.get(), runs);
        drop(run);
        prop_assert_eq!(released.get(), runs);
    }
}
