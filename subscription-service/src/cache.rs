//! Short-lived memoization keyed by id.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default time-to-live for cached calculations.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Map with a fixed expiry per entry and at most one entry per key.
///
/// There is no eviction beyond expiry; stale entries are dropped when read
/// or by [`TtlCache::purge_expired`].
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    ttl: Duration,
    entries: DashMap<K, (Instant, V)>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let hit = self.entries.get(key).and_then(|entry| {
            let (stored_at, value) = entry.value();
            (now.saturating_duration_since(*stored_at) < self.ttl).then(|| value.clone())
        });

        if hit.is_none() {
            self.entries
                .remove_if(key, |_, (stored_at, _)| {
                    now.saturating_duration_since(*stored_at) >= self.ttl
                });
        }
        hit
    }

    /// Store `value`, replacing any previous entry for `key`.
    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    fn insert_at(&self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (now, value));
    }

    /// Drop the entry for `key`. Used by explicit refresh actions.
    pub fn invalidate(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, (_, value))| value)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remove every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, (stored_at, _)| now.saturating_duration_since(*stored_at) < self.ttl);
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
