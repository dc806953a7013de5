use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.created_at) < ttl
    }
}

type Slot<V> = Arc<Mutex<Option<CacheEntry<V>>>>;

/// Memoizing cache for expensive fetches, keyed by a fetch descriptor,
/// with per-entry expiry.
///
/// Safe to share process-wide behind `&self`. Concurrent misses for the
/// same key are coalesced: the key's slot lock is held across `compute`,
/// so at most one `compute` runs per key at a time and waiters observe
/// the freshly stored value instead of recomputing.
pub struct TtlCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the memoized value for `key` if it is younger than `ttl`,
    /// otherwise invoke `compute`, store the result, and return it.
    ///
    /// A failing `compute` propagates unmodified and stores nothing, so
    /// an error never poisons the entry.
    pub fn get_or_compute<E>(
        &self,
        key: &K,
        ttl: Duration,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        self.get_or_compute_at(key, ttl, Instant::now(), compute)
    }

    /// Same as [`get_or_compute`](Self::get_or_compute) with an explicit
    /// evaluation instant.
    pub fn get_or_compute_at<E>(
        &self,
        key: &K,
        ttl: Duration,
        now: Instant,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        // Hold the map lock only long enough to find or create the slot,
        // so a slow compute on one key never blocks other keys.
        let slot = {
            let mut slots = lock_unpoisoned(&self.slots);
            slots.entry(key.clone()).or_default().clone()
        };

        let mut entry = lock_unpoisoned(&slot);
        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(ttl, now) {
                debug!("ttl cache hit");
                return Ok(cached.value.clone());
            }
        }

        debug!("ttl cache miss, recomputing");
        let value = compute()?;
        *entry = Some(CacheEntry {
            value: value.clone(),
            created_at: now,
        });
        Ok(value)
    }

    /// Number of keys currently holding a stored value.
    pub fn len(&self) -> usize {
        let slots = lock_unpoisoned(&self.slots);
        slots
            .values()
            .filter(|slot| lock_unpoisoned(slot).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// A compute that panics in another caller must not take the slot down
// with it; the entry is only written after compute succeeds, so the
// inner state is always coherent.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
