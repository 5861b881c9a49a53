//! ChangeGatedEmitter<V> — a value holder that only notifies on real change.
//!
//! `update` always overwrites the current value, but observers hear about it
//! only when it differs (by `PartialEq`, which is structural for JSON values)
//! from the last value actually delivered. New observers immediately receive
//! that last delivered value.
//!
//! The internal `parking_lot::Mutex` is never held while observers run, so an
//! observer may call back into the emitter.

use std::sync::Arc;

use parking_lot::Mutex;

use super::listeners::Listeners;
use super::observable::{Observable, Observer, Unsubscribe};

struct GateState<V> {
    current: V,
    last_emitted: V,
    observers: Listeners<Observer<V>>,
}

/// Equality-gated, replay-latest value emitter.
///
/// Clones share state.
pub struct ChangeGatedEmitter<V> {
    initial: Arc<V>,
    state: Arc<Mutex<GateState<V>>>,
}

impl<V> Clone for ChangeGatedEmitter<V> {
    fn clone(&self) -> Self {
        Self {
            initial: Arc::clone(&self.initial),
            state: Arc::clone(&self.state),
        }
    }
}

impl<V> ChangeGatedEmitter<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: V) -> Self {
        Self {
            initial: Arc::new(initial.clone()),
            state: Arc::new(Mutex::new(GateState {
                current: initial.clone(),
                last_emitted: initial,
                observers: Listeners::new(),
            })),
        }
    }

    /// Replace the current value; notify observers if it changed.
    pub fn update(&self, value: V) {
        let observers = {
            let mut st = self.state.lock();
            st.current = value.clone();
            if st.last_emitted == value {
                return;
            }
            st.last_emitted = value.clone();
            st.observers.snapshot()
        };

        tracing::trace!(observers = observers.len(), "change gate emitting");
        for observer in observers {
            observer.next(&value);
        }
    }

    /// Restore the construction-time value, under the same gating rule.
    pub fn reset(&self) {
        self.update((*self.initial).clone());
    }

    /// The value last passed to `update` (or the initial value).
    pub fn value(&self) -> V {
        self.state.lock().current.clone()
    }

    /// The value observers last received.
    pub fn last_emitted(&self) -> V {
        self.state.lock().last_emitted.clone()
    }

    pub fn initial(&self) -> &V {
        &self.initial
    }

    /// Register `observer` and immediately replay the last delivered value.
    pub fn subscribe(&self, observer: Observer<V>) -> Unsubscribe {
        let (id, replay) = {
            let mut st = self.state.lock();
            let id = st.observers.add(observer.clone());
            (id, st.last_emitted.clone())
        };
        observer.next(&replay);

        let state = Arc::clone(&self.state);
        Box::new(move || {
            state.lock().observers.remove(id);
        })
    }

    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// View this emitter as an [`Observable`].
    pub fn as_observable(&self) -> Observable<V> {
        let gate = self.clone();
        Observable::new(move |observer| gate.subscribe(observer))
    }
}
