//! Bounded, time-limited memo of transparency verdicts

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::trace;

use crate::config::TransparencyCacheConfig;

/// Content fingerprint used as cache key
///
/// Hex SHA-256 of the full payload, truncated to `length` characters.
pub fn fingerprint(bytes: &[u8], length: usize) -> String {
    let mut digest = hex::encode(Sha256::digest(bytes));
    digest.truncate(length.max(1));
    digest
}

#[derive(Debug, Clone, Copy)]
struct CachedVerdict {
    transparent: bool,
    inserted_at: Instant,
}

/// LRU cache of `fingerprint -> has transparent edges`
///
/// Holds at most `capacity` entries; inserting into a full cache evicts the
/// least recently used one. An entry older than `ttl` is treated as absent
/// and dropped on read. Safe to share between concurrent requests.
pub struct TransparencyCache {
    entries: Mutex<LruCache<String, CachedVerdict>>,
    ttl: Duration,
}

impl TransparencyCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Build from configuration; a zero capacity is clamped to one entry
    pub fn from_config(config: &TransparencyCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity, config.ttl)
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CachedVerdict>> {
        // A panic while holding the lock cannot leave a half-written entry behind
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached verdict for `key`, if present and younger than the TTL
    pub fn get(&self, key: &str) -> Option<bool> {
        let mut entries = self.lock();
        let verdict = *entries.get(key)?;

        if verdict.inserted_at.elapsed() >= self.ttl {
            trace!("Transparency verdict for {} expired", key);
            entries.pop(key);
            return None;
        }

        Some(verdict.transparent)
    }

    /// Store a verdict, replacing any previous one for the same key
    pub fn insert(&self, key: String, transparent: bool) {
        self.lock().put(
            key,
            CachedVerdict {
                transparent,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
