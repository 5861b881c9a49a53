//! Tests for `KeyedStore`.

use less_store::types::into_record;
use less_store::{DestroySignal, KeyedStore, Observer, Record};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helpers
// ============================================================================

fn rec(v: Value) -> Record {
    into_record(v).unwrap()
}

fn make_log() -> Arc<Mutex<Vec<Value>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Subscribe to a field and collect values plus a completion counter.
fn watch(store: &KeyedStore, key: &str) -> (Arc<Mutex<Vec<Value>>>, Arc<AtomicUsize>) {
    let log = make_log();
    let completed = Arc::new(AtomicUsize::new(0));
    let l = Arc::clone(&log);
    let c = Arc::clone(&completed);
    let _unsub = store.select(key).subscribe_observer(
        Observer::new(move |v: &Value| l.lock().unwrap().push(v.clone()))
            .on_complete(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
    );
    (log, completed)
}

// ============================================================================
// setState / getState
// ============================================================================

#[test]
fn set_state_is_a_shallow_merge() {
    let store = KeyedStore::new(rec(json!({ "a": 0, "b": 2 })));
    store.set_state(rec(json!({ "a": 1 })));
    assert_eq!(Value::Object(store.get_state()), json!({ "a": 1, "b": 2 }));
}

#[test]
fn set_state_replaces_nested_fields_wholesale() {
    let store = KeyedStore::new(rec(json!({ "filter": { "x": 1, "y": 2 } })));
    store.set_state(rec(json!({ "filter": { "x": 9 } })));
    assert_eq!(store.get_state()["filter"], json!({ "x": 9 }));
}

#[test]
fn side_effect_sees_merged_state_before_subscribers() {
    let store = KeyedStore::new(rec(json!({ "a": 0, "b": 2 })));
    let order = Arc::new(Mutex::new(Vec::<String>::new()));

    let o = Arc::clone(&order);
    let _unsub = store
        .select_all()
        .subscribe(move |s| o.lock().unwrap().push(format!("emit:{}", s["a"])));

    let o = Arc::clone(&order);
    store.set_state_with(rec(json!({ "a": 1 })), |next| {
        assert_eq!(Value::Object(next.clone()), json!({ "a": 1, "b": 2 }));
        o.lock().unwrap().push("side".to_string());
    });

    assert_eq!(*order.lock().unwrap(), vec!["emit:0", "side", "emit:1"]);
}

#[test]
fn side_effect_runs_even_when_nothing_changes() {
    let store = KeyedStore::new(rec(json!({ "a": 0 })));
    let calls = AtomicUsize::new(0);
    store.set_state_with(rec(json!({ "a": 0 })), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[derive(Debug, Deserialize, PartialEq)]
struct Counter {
    count: u32,
    label: String,
}

#[test]
fn get_state_as_deserializes() {
    let store = KeyedStore::new(rec(json!({ "count": 3, "label": "x" })));
    let c: Counter = store.get_state_as().unwrap();
    assert_eq!(c, Counter { count: 3, label: "x".into() });

    store.set_state(rec(json!({ "count": "nope" })));
    assert!(store.get_state_as::<Counter>().is_err());
}

// ============================================================================
// select / selectAll
// ============================================================================

#[test]
fn select_ignores_unrelated_field_changes() {
    let store = KeyedStore::new(rec(json!({ "a": 0, "b": 2 })));
    let (log, _) = watch(&store, "b");

    store.set_state(rec(json!({ "a": 1 })));
    store.set_state(rec(json!({ "a": 2 })));
    assert_eq!(*log.lock().unwrap(), vec![json!(2)]);

    store.set_state(rec(json!({ "b": 3 })));
    assert_eq!(*log.lock().unwrap(), vec![json!(2), json!(3)]);
}

#[test]
fn select_uses_deep_equality_on_the_field() {
    let store = KeyedStore::new(rec(json!({ "items": ["a"], "n": 0 })));
    let (log, _) = watch(&store, "items");

    store.set_state(rec(json!({ "items": ["a"] })));
    store.set_state(rec(json!({ "items": ["a", "b"] })));

    assert_eq!(*log.lock().unwrap(), vec![json!(["a"]), json!(["a", "b"])]);
}

#[test]
fn select_missing_key_reads_null() {
    let store = KeyedStore::new(rec(json!({ "a": 0 })));
    let (log, _) = watch(&store, "missing");
    store.set_state(rec(json!({ "a": 1 })));
    assert_eq!(*log.lock().unwrap(), vec![Value::Null]);
}

#[test]
fn select_filtered_suppresses_rejected_values() {
    let store = KeyedStore::new(rec(json!({ "n": 1 })));
    let log = make_log();
    let l = Arc::clone(&log);
    let _unsub = store
        .select_filtered("n", |v| v.as_i64().is_some_and(|n| n % 2 == 0))
        .subscribe(move |v| l.lock().unwrap().push(v.clone()));

    for n in 2..=5 {
        store.set_state(rec(json!({ "n": n })));
    }

    assert_eq!(*log.lock().unwrap(), vec![json!(2), json!(4)]);
}

#[test]
fn each_selection_subscriber_gets_field_replay() {
    let store = KeyedStore::new(rec(json!({ "a": 0, "b": "x" })));
    store.set_state(rec(json!({ "b": "y" })));

    let selection = store.select("b");
    let first = make_log();
    let second = make_log();
    let f = Arc::clone(&first);
    let _u1 = selection.subscribe(move |v| f.lock().unwrap().push(v.clone()));
    let s = Arc::clone(&second);
    let _u2 = selection.subscribe(move |v| s.lock().unwrap().push(v.clone()));

    assert_eq!(*first.lock().unwrap(), vec![json!("y")]);
    assert_eq!(*second.lock().unwrap(), vec![json!("y")]);
}

#[test]
fn select_all_emits_whole_record_on_any_change() {
    let store = KeyedStore::new(rec(json!({ "a": 0, "b": 0 })));
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&log);
    let _unsub = store
        .select_all()
        .subscribe(move |s| l.lock().unwrap().push(Value::Object(s.clone())));

    store.set_state(rec(json!({ "a": 1 })));
    store.set_state(rec(json!({ "a": 1 })));
    store.set_state(rec(json!({ "b": 1 })));

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            json!({ "a": 0, "b": 0 }),
            json!({ "a": 1, "b": 0 }),
            json!({ "a": 1, "b": 1 }),
        ]
    );
}

#[test]
fn unsubscribe_stops_selection() {
    let store = KeyedStore::new(rec(json!({ "a": 0 })));
    let log = make_log();
    let l = Arc::clone(&log);
    let unsub = store.select("a").subscribe(move |v| l.lock().unwrap().push(v.clone()));
    unsub();
    store.set_state(rec(json!({ "a": 1 })));
    assert_eq!(*log.lock().unwrap(), vec![json!(0)]);
}

// ============================================================================
// reset
// ============================================================================

#[test]
fn reset_restores_initial_record() {
    let store = KeyedStore::new(rec(json!({ "a": 0, "b": 2 })));
    let (log, _) = watch(&store, "a");

    store.set_state(rec(json!({ "a": 5, "c": true })));
    let seen = Arc::new(Mutex::new(None));
    let s = Arc::clone(&seen);
    store.reset_with(move |next| *s.lock().unwrap() = Some(next.clone()));

    assert_eq!(Value::Object(store.get_state()), json!({ "a": 0, "b": 2 }));
    assert_eq!(
        seen.lock().unwrap().clone().map(Value::Object),
        Some(json!({ "a": 0, "b": 2 }))
    );
    assert_eq!(*log.lock().unwrap(), vec![json!(0), json!(5), json!(0)]);
}

// ============================================================================
// destroy
// ============================================================================

#[test]
fn destroy_completes_active_selections() {
    let store = KeyedStore::new(rec(json!({ "a": 0 })));
    let (log_a, done_a) = watch(&store, "a");

    let all_done = Arc::new(AtomicUsize::new(0));
    let d = Arc::clone(&all_done);
    let _unsub = store
        .select_all()
        .subscribe_observer(Observer::new(|_: &Record| {}).on_complete(move || {
            d.fetch_add(1, Ordering::SeqCst);
        }));

    store.destroy();
    store.destroy();
    store.set_state(rec(json!({ "a": 1 })));

    assert!(store.is_destroyed());
    assert_eq!(done_a.load(Ordering::SeqCst), 1);
    assert_eq!(all_done.load(Ordering::SeqCst), 1);
    assert_eq!(*log_a.lock().unwrap(), vec![json!(0)]);
    // State itself is still readable and writable.
    assert_eq!(store.get_state()["a"], json!(1));
}

#[test]
fn select_after_destroy_completes_without_replay() {
    let store = KeyedStore::new(rec(json!({ "a": 0 })));
    store.destroy();
    let (log, done) = watch(&store, "a");
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[test]
fn external_signal_tears_down_streams() {
    let signal = DestroySignal::new();
    let store = KeyedStore::with_signal(rec(json!({ "a": 0 })), signal.clone());
    let (log, done) = watch(&store, "a");

    signal.trigger();
    store.set_state(rec(json!({ "a": 1 })));

    assert!(store.is_destroyed());
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(*log.lock().unwrap(), vec![json!(0)]);
}

#[test]
fn destroy_from_inside_a_subscriber() {
    let store = Arc::new(KeyedStore::new(rec(json!({ "a": 0 }))));
    let log = make_log();
    let l = Arc::clone(&log);
    let s = Arc::clone(&store);
    let _unsub = store.select("a").subscribe(move |v| {
        l.lock().unwrap().push(v.clone());
        if v == &json!(1) {
            s.destroy();
        }
    });

    store.set_state(rec(json!({ "a": 1 })));
    store.set_state(rec(json!({ "a": 2 })));

    assert_eq!(*log.lock().unwrap(), vec![json!(0), json!(1)]);
}

#[test]
fn filter_may_write_back_to_the_store() {
    let store = Arc::new(KeyedStore::new(rec(json!({ "n": 0 }))));
    let log = make_log();

    let s = Arc::clone(&store);
    let l = Arc::clone(&log);
    let _unsub = store
        .select_filtered("n", move |v| {
            if v == &json!(1) {
                s.set_state(rec(json!({ "n": 2 })));
            }
            true
        })
        .subscribe(move |v| l.lock().unwrap().push(v.clone()));

    store.set_state(rec(json!({ "n": 1 })));

    // The nested write wins; the stale outer value is not delivered after it.
    assert_eq!(*log.lock().unwrap(), vec![json!(0), json!(2)]);
    assert_eq!(store.get_state()["n"], json!(2));
}
