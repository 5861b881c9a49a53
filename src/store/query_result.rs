//! QueryResultStore — a [`KeyedStore`] over `{ query, result, transient }`
//! with an optional result cache keyed by the canonical query.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::reactive::{DestroySignal, Observable};
use crate::types::{field_record, from_record, shallow_merge, Record};

use super::cache::{ResultCache, DEFAULT_CACHE_LIMIT};
use super::cache_key::canonical_key;
use super::keyed::KeyedStore;

const QUERY: &str = "query";
const RESULT: &str = "result";
const TRANSIENT: &str = "transient";

/// Options for [`QueryResultStore`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryResultStoreOptions {
    /// Start with caching enabled (default: false).
    pub use_caching: bool,
    /// Maximum number of cached results; the absolute value is used
    /// (default: 100).
    pub cache_limit: i64,
}

impl Default for QueryResultStoreOptions {
    fn default() -> Self {
        Self {
            use_caching: false,
            cache_limit: DEFAULT_CACHE_LIMIT,
        }
    }
}

pub struct QueryResultStore {
    store: KeyedStore,
    cache: Mutex<ResultCache>,
}

impl QueryResultStore {
    pub fn new(query: Record, result: Record, transient: Record) -> Self {
        Self::with_options(query, result, transient, QueryResultStoreOptions::default())
    }

    pub fn with_options(
        query: Record,
        result: Record,
        transient: Record,
        options: QueryResultStoreOptions,
    ) -> Self {
        Self::build(query, result, transient, options, DestroySignal::new())
    }

    /// Like [`with_options`](Self::with_options), bound to an external signal.
    pub fn with_signal(
        query: Record,
        result: Record,
        transient: Record,
        options: QueryResultStoreOptions,
        destroy: DestroySignal,
    ) -> Self {
        Self::build(query, result, transient, options, destroy)
    }

    fn build(
        query: Record,
        result: Record,
        transient: Record,
        options: QueryResultStoreOptions,
        destroy: DestroySignal,
    ) -> Self {
        let mut initial = Record::new();
        initial.insert(QUERY.to_string(), Value::Object(query));
        initial.insert(RESULT.to_string(), Value::Object(result));
        initial.insert(TRANSIENT.to_string(), Value::Object(transient));

        Self {
            store: KeyedStore::with_signal(initial, destroy),
            cache: Mutex::new(ResultCache::new(options.cache_limit, options.use_caching)),
        }
    }

    // -----------------------------------------------------------------------
    // Streams
    // -----------------------------------------------------------------------

    pub fn query_stream(&self) -> Observable<Value> {
        self.store.select(QUERY)
    }

    pub fn result_stream(&self) -> Observable<Value> {
        self.store.select(RESULT)
    }

    pub fn transient_stream(&self) -> Observable<Value> {
        self.store.select(TRANSIENT)
    }

    // -----------------------------------------------------------------------
    // Field writes
    // -----------------------------------------------------------------------

    pub fn set_query(&self, partial: Record) {
        self.set_field(QUERY, partial);
    }

    /// Merge `partial` into the result, caching the merged result under the
    /// key of the current query before committing it.
    pub fn set_result(&self, partial: Record) {
        let next = shallow_merge(&self.get_result(), partial);
        let mut update = Record::new();
        update.insert(RESULT.to_string(), Value::Object(next.clone()));
        self.store.set_state_with(update, |_| self.cache_result(next));
    }

    pub fn set_transient(&self, partial: Record) {
        self.set_field(TRANSIENT, partial);
    }

    fn set_field(&self, name: &str, partial: Record) {
        let next = shallow_merge(&field_record(&self.store.get_state(), name), partial);
        let mut update = Record::new();
        update.insert(name.to_string(), Value::Object(next));
        self.store.set_state(update);
    }

    // -----------------------------------------------------------------------
    // Field reads
    // -----------------------------------------------------------------------

    pub fn get_query(&self) -> Record {
        field_record(&self.store.get_state(), QUERY)
    }

    pub fn get_result(&self) -> Record {
        field_record(&self.store.get_state(), RESULT)
    }

    pub fn get_transient(&self) -> Record {
        field_record(&self.store.get_state(), TRANSIENT)
    }

    pub fn get_query_as<Q: DeserializeOwned>(&self) -> Result<Q> {
        from_record(&self.get_query())
    }

    pub fn get_result_as<R: DeserializeOwned>(&self) -> Result<R> {
        from_record(&self.get_result())
    }

    pub fn get_transient_as<T: DeserializeOwned>(&self) -> Result<T> {
        from_record(&self.get_transient())
    }

    // -----------------------------------------------------------------------
    // Cache
    // -----------------------------------------------------------------------

    /// Enable or disable caching. Existing entries survive a disable.
    pub fn should_cache(&self, enabled: bool) {
        self.cache.lock().set_enabled(enabled);
        tracing::debug!(enabled, "result caching toggled");
    }

    pub fn is_caching(&self) -> bool {
        self.cache.lock().is_enabled()
    }

    /// Canonical key of the current query.
    pub fn get_cache_key(&self) -> String {
        canonical_key(&self.get_query())
    }

    /// Cached result for the current query; `None` while caching is off.
    pub fn get_cached_result(&self) -> Option<Record> {
        if !self.is_caching() {
            return None;
        }
        let key = self.get_cache_key();
        let hit = self.cache.lock().get(&key).cloned();
        tracing::trace!(key = %key, hit = hit.is_some(), "result cache lookup");
        hit
    }

    /// Store `result` under the current query's key (no-op while caching is off).
    pub fn cache_result(&self, result: Record) {
        if !self.is_caching() {
            return;
        }
        let key = self.get_cache_key();
        self.cache.lock().insert(key, result);
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    // -----------------------------------------------------------------------
    // Store passthroughs
    // -----------------------------------------------------------------------

    /// The underlying keyed store (for `select_all`, custom selections, ...).
    pub fn store(&self) -> &KeyedStore {
        &self.store
    }

    /// Restore the initial query, result and transient. The cache is kept.
    pub fn reset(&self) {
        self.store.reset();
    }

    pub fn destroy(&self) {
        self.store.destroy();
    }
}

impl std::fmt::Debug for QueryResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResultStore")
            .field("store", &self.store)
            .field("cache", &*self.cache.lock())
            .finish()
    }
}
