//! Property-based invariant tests for observed data and watchers.
//!
//! 1. A watcher fires exactly once per write that changes the value.
//! 2. Every watcher on a property sees the same sequence of values.
//! 3. The snapshot after a write sequence holds the last written values.
//! 4. Writes to one property never notify watchers of another.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use serde_json::json;
use tvue_reactive::{Data, Watcher, observe};

fn recorder() -> (Rc<RefCell<Vec<i64>>>, impl Fn(&Data) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |value: &Data| {
        let n = value.to_json().as_i64().expect("integer payload");
        sink.borrow_mut().push(n);
    })
}

/// Values that survive deduplication of consecutive equal writes.
fn distinct_runs(initial: i64, writes: &[i64]) -> Vec<i64> {
    let mut current = initial;
    let mut out = Vec::new();
    for &w in writes {
        if w != current {
            out.push(w);
            current = w;
        }
    }
    out
}

proptest! {
    #[test]
    fn fires_once_per_changing_write(writes in proptest::collection::vec(0i64..4, 0..40)) {
        let data = observe(json!({ "n": 0 })).unwrap();
        let (seen, cb) = recorder();
        let _w = Watcher::new(&data, "n", cb).unwrap();

        for &w in &writes {
            data.set("n", w).unwrap();
        }

        prop_assert_eq!(seen.borrow().clone(), distinct_runs(0, &writes));
    }

    #[test]
    fn all_watchers_agree(writes in proptest::collection::vec(0i64..4, 0..20), watchers in 1usize..5) {
        let data = observe(json!({ "n": 0 })).unwrap();
        let mut logs = Vec::new();
        let mut handles = Vec::new();
        for _ in 0..watchers {
            let (seen, cb) = recorder();
            handles.push(Watcher::new(&data, "n", cb).unwrap());
            logs.push(seen);
        }

        for &w in &writes {
            data.set("n", w).unwrap();
        }

        let expected = distinct_runs(0, &writes);
        for log in &logs {
            prop_assert_eq!(log.borrow().clone(), expected.clone());
        }
    }

    #[test]
    fn snapshot_holds_last_writes(
        writes in proptest::collection::vec((prop::bool::ANY, -100i64..100), 1..30)
    ) {
        let data = observe(json!({ "a": 0, "b": 0 })).unwrap();
        let mut a = 0;
        let mut b = 0;
        for &(to_a, value) in &writes {
            if to_a {
                data.set("a", value).unwrap();
                a = value;
            } else {
                data.set("b", value).unwrap();
                b = value;
            }
        }
        prop_assert_eq!(data.to_json(), json!({ "a": a, "b": b }));
    }

    #[test]
    fn writes_are_isolated_per_property(writes in proptest::collection::vec(1i64..50, 1..20)) {
        let data = observe(json!({ "a": 0, "b": 0 })).unwrap();
        let (seen_b, cb) = recorder();
        let _w = Watcher::new(&data, "b", cb).unwrap();

        for &w in &writes {
            data.set("a", w).unwrap();
        }
        prop_assert!(seen_b.borrow().is_empty());
    }
}
