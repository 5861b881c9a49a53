//! Listeners<L> — an ordered listener list with snapshot-on-emit semantics.
//!
//! The list itself has no lock; owners keep it inside their own
//! `parking_lot::Mutex` and call [`Listeners::snapshot`] under that lock, then
//! release the lock before invoking anything. That gives:
//!   - A listener removed *during* emission is still called in that round.
//!   - A listener added *during* emission is NOT called until the next round.

/// ID handed out by [`Listeners::add`], used to remove the listener later.
pub type ListenerId = u64;

/// Ordered list of listeners of type `L` (usually an `Arc` or a cheap handle).
pub struct Listeners<L> {
    entries: Vec<(ListenerId, L)>,
    next_id: ListenerId,
}

impl<L: Clone> Listeners<L> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Append `listener` and return its ID. Registration order is call order.
    pub fn add(&mut self, listener: L) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Remove the listener identified by `id`; returns whether it was present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        self.entries.len() != before
    }

    /// Clone the current listeners, in registration order.
    pub fn snapshot(&self) -> Vec<L> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }

    /// Remove every listener, returning them in registration order.
    pub fn drain(&mut self) -> Vec<L> {
        self.entries.drain(..).map(|(_, l)| l).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: Clone> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}
