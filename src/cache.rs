// src/cache.rs
//! # TTL Cache
//! Process-wide expiring map used for enriched event batches.
//!
//! Entries older than the TTL are ignored by reads but never evicted; the next
//! `set` for the same key overwrites them. There is no size bound, so the map
//! grows with the number of distinct keys seen during the process lifetime.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::clock::SharedClock;
use crate::model::EnrichedEvent;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub data: V,
    /// Epoch millis at which the entry was written.
    pub timestamp: i64,
}

pub struct TtlCache<V> {
    inner: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: SharedClock,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: SharedClock) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Fresh entry for `key`, or `None` when absent or stale.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry<V>> {
        let now = self.clock.now_millis();
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let map = self.inner.lock().expect("ttl cache mutex poisoned");
        let entry = map.get(key)?;
        if now.saturating_sub(entry.timestamp) < ttl_ms {
            Some(entry.clone())
        } else {
            tracing::debug!(target: "cache", key, "stale entry ignored");
            None
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_entry(key).map(|e| e.data)
    }

    /// Store `data` stamped with the current clock, replacing any prior entry.
    pub fn set(&self, key: impl Into<String>, data: V) -> i64 {
        let timestamp = self.clock.now_millis();
        let mut map = self.inner.lock().expect("ttl cache mutex poisoned");
        map.insert(key.into(), CacheEntry { data, timestamp });
        timestamp
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("ttl cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Batch cache keyed by `"{keyword}_{YYYYMMDD}"`.
pub type EnrichmentCache = TtlCache<Vec<EnrichedEvent>>;

pub fn batch_key(keyword: &str, date_yyyymmdd: &str) -> String {
    format!("{keyword}_{date_yyyymmdd}")
}
