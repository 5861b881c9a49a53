//! DestroySignal — a level-triggered, shareable cancellation signal.
//!
//! Once triggered it stays triggered. Listeners registered before the trigger
//! run exactly once when it fires; listeners registered afterwards run
//! immediately on registration.

use std::sync::Arc;

use parking_lot::Mutex;

use super::listeners::{ListenerId, Listeners};

type TriggerFn = dyn Fn() + Send + Sync;

struct SignalState {
    triggered: bool,
    listeners: Listeners<Arc<TriggerFn>>,
}

/// Cloneable cancellation signal; clones share the same state.
#[derive(Clone)]
pub struct DestroySignal {
    state: Arc<Mutex<SignalState>>,
}

impl DestroySignal {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SignalState {
                triggered: false,
                listeners: Listeners::new(),
            })),
        }
    }

    /// Fire the signal.
    ///
    /// Returns `true` for the call that performed the transition, `false` if
    /// the signal was already triggered (listeners are not run again).
    pub fn trigger(&self) -> bool {
        let listeners = {
            let mut st = self.state.lock();
            if st.triggered {
                return false;
            }
            st.triggered = true;
            st.listeners.drain()
        };
        for cb in listeners {
            cb();
        }
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.state.lock().triggered
    }

    /// Register `callback` to run when the signal fires.
    ///
    /// If the signal has already fired, `callback` runs before this returns
    /// and the returned ID refers to nothing.
    pub fn on_trigger(&self, callback: impl Fn() + Send + Sync + 'static) -> ListenerId {
        let mut st = self.state.lock();
        if st.triggered {
            drop(st);
            callback();
            return 0;
        }
        st.listeners.add(Arc::new(callback))
    }

    /// Remove a pending listener. Safe to call with stale IDs.
    pub fn off(&self, id: ListenerId) {
        self.state.lock().listeners.remove(id);
    }

    /// Number of listeners still waiting for the trigger.
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}

impl Default for DestroySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DestroySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestroySignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
