//! less-store — a small reactive state container.
//!
//! Three layers, leaf first:
//!
//! - [`reactive::ChangeGatedEmitter`] — holds a value and notifies observers
//!   only when a new value is structurally different from the last one sent.
//! - [`store::KeyedStore`] — a JSON record with shallow partial updates and
//!   per-field derived streams.
//! - [`store::QueryResultStore`] — a `{ query, result, transient }` store with
//!   an optional insertion-ordered result cache keyed by the canonical query.

pub mod error;
pub mod reactive;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use reactive::{ChangeGatedEmitter, DestroySignal, Observable, Observer, Unsubscribe};
pub use store::{KeyedStore, QueryResultStore, QueryResultStoreOptions};
pub use types::Record;
