//! KeyedStore — a JSON record behind a [`ChangeGatedEmitter`].
//!
//! Writes are shallow merges. Reads are synchronous. Every derived stream
//! (`select*`) is bound to the store's [`DestroySignal`] and completes when
//! the store is destroyed.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::reactive::{ChangeGatedEmitter, DestroySignal, Observable, Observer, Unsubscribe};
use crate::types::{field, from_record, shallow_merge, Record};

type FilterFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Reactive record store with per-field selection.
pub struct KeyedStore {
    state: ChangeGatedEmitter<Record>,
    destroy: DestroySignal,
}

impl KeyedStore {
    /// Create a store owning its own destroy signal.
    pub fn new(initial: Record) -> Self {
        Self::with_signal(initial, DestroySignal::new())
    }

    /// Create a store bound to an externally owned signal. Triggering the
    /// signal from outside tears the store's streams down just like
    /// [`destroy`](Self::destroy).
    pub fn with_signal(initial: Record, destroy: DestroySignal) -> Self {
        Self {
            state: ChangeGatedEmitter::new(initial),
            destroy,
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn set_state(&self, partial: Record) {
        self.set_state_with(partial, |_| {});
    }

    /// Merge `partial` into the state, run `side_effect` with the merged
    /// state, then hand the merged state to the gate.
    pub fn set_state_with(&self, partial: Record, side_effect: impl FnOnce(&Record)) {
        let next = shallow_merge(&self.state.value(), partial);
        side_effect(&next);
        self.state.update(next);
    }

    /// Restore the construction-time record.
    pub fn reset(&self) {
        self.reset_with(|_| {});
    }

    pub fn reset_with(&self, side_effect: impl FnOnce(&Record)) {
        let initial = self.state.initial().clone();
        side_effect(&initial);
        self.state.update(initial);
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_state(&self) -> Record {
        self.state.value()
    }

    /// Deserialize the whole state into `T`.
    pub fn get_state_as<T: DeserializeOwned>(&self) -> Result<T> {
        from_record(&self.state.value())
    }

    // -----------------------------------------------------------------------
    // Streams
    // -----------------------------------------------------------------------

    /// Stream of the whole record.
    pub fn select_all(&self) -> Observable<Record> {
        self.state.as_observable().take_until(&self.destroy)
    }

    /// Stream of one field, re-emitting only when that field changes.
    ///
    /// Missing fields read as `Value::Null`.
    pub fn select(&self, key: &str) -> Observable<Value> {
        self.select_field(key, None)
    }

    /// Like [`select`](Self::select), additionally dropping values for which
    /// `filter` returns `false`.
    pub fn select_filtered(
        &self,
        key: &str,
        filter: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Observable<Value> {
        self.select_field(key, Some(Arc::new(filter)))
    }

    fn select_field(&self, key: &str, filter: Option<Arc<FilterFn>>) -> Observable<Value> {
        let gate = self.state.clone();
        let key = key.to_string();

        Observable::new(move |observer: Observer<Value>| -> Unsubscribe {
            // Last value delivered to this subscriber.
            let last: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
            let key = key.clone();
            let filter = filter.clone();
            let forward = observer.clone();

            let upstream = Observer::new(move |record: &Record| {
                let value = field(record, &key);
                let previous = {
                    let last = last.lock();
                    if last.as_ref() == Some(&value) {
                        return;
                    }
                    last.clone()
                };
                // No lock held: the filter may write back to the store.
                if let Some(filter) = &filter {
                    if !filter(&value) {
                        return;
                    }
                }
                {
                    let mut last = last.lock();
                    // A nested emission from inside the filter already
                    // delivered a newer value; this one is stale.
                    if *last != previous {
                        return;
                    }
                    *last = Some(value.clone());
                }
                forward.next(&value);
            })
            .on_complete(move || observer.complete());

            gate.subscribe(upstream)
        })
        .take_until(&self.destroy)
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Complete every derived stream. Idempotent.
    pub fn destroy(&self) {
        if self.destroy.trigger() {
            tracing::debug!("keyed store destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroy.is_triggered()
    }

    /// The signal that [`destroy`](Self::destroy) triggers.
    pub fn signal(&self) -> &DestroySignal {
        &self.destroy
    }
}

impl std::fmt::Debug for KeyedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedStore")
            .field("state", &self.state.value())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
