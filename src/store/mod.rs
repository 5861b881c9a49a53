//! Store layer — keyed record store and the query/result/transient store.
//!
//! # Modules
//!
//! - [`keyed`] — [`KeyedStore`], shallow-merge writes and field selection.
//! - [`cache_key`] — [`canonical_key`] for query records.
//! - [`cache`] — [`ResultCache`], insertion-order bounded cache.
//! - [`query_result`] — [`QueryResultStore`] and its options.

pub mod cache;
pub mod cache_key;
pub mod keyed;
pub mod query_result;

pub use cache::{ResultCache, DEFAULT_CACHE_LIMIT};
pub use cache_key::canonical_key;
pub use keyed::KeyedStore;
pub use query_result::{QueryResultStore, QueryResultStoreOptions};
