//! Per-key async locks serializing get-or-create sequences.
//!
//! The store exposes no transactions, so a bare lookup-then-insert would let
//! two concurrent resolutions of the same key both miss the cache and both
//! generate. Holding the key's lock across the whole check-generate-store
//! sequence guarantees at most one generated pseudonym per key within this
//! process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Hands out one async mutex per string key, created lazily.
pub(crate) struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for `key`. The caller acquires it with
    /// `.lock().await` and holds the guard across the critical sequence.
    pub(crate) fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Drop locks nobody holds so the map tracks active keys only.
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(map.entry(key.to_string()).or_default())
    }
}
