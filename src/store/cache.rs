//! ResultCache — bounded result cache with insertion-order eviction.
//!
//! Eviction removes the entry that was inserted first. Reads never change the
//! order, and overwriting an existing key keeps that key's original position.
//! While disabled the cache neither reads nor writes, but keeps its entries.

use indexmap::IndexMap;

use crate::types::Record;

/// Default `cache_limit`.
pub const DEFAULT_CACHE_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: IndexMap<String, Record>,
    limit: usize,
    enabled: bool,
}

impl ResultCache {
    /// `limit` is taken by absolute value.
    pub fn new(limit: i64, enabled: bool) -> Self {
        Self {
            entries: IndexMap::new(),
            limit: limit.unsigned_abs() as usize,
            enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Look up `key`; always `None` while disabled.
    pub fn get(&self, key: &str) -> Option<&Record> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key)
    }

    /// Store `result` under `key`. No-op while disabled or when the limit is 0.
    ///
    /// A new key arriving at capacity first evicts the oldest inserted entry.
    /// Returns the evicted key, if any.
    pub fn insert(&mut self, key: String, result: Record) -> Option<String> {
        if !self.enabled || self.limit == 0 {
            return None;
        }

        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = result;
            return None;
        }

        let evicted = if self.entries.len() >= self.limit {
            self.entries.shift_remove_index(0).map(|(k, _)| k)
        } else {
            None
        };
        if let Some(old) = &evicted {
            tracing::debug!(evicted = %old, limit = self.limit, "result cache evicted oldest entry");
        }

        self.entries.insert(key, result);
        evicted
    }

    /// Keys in insertion order, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_LIMIT, false)
    }
}
