//! In-memory TTL cache for normalized weather data.
//!
//! Uses `DashMap` for concurrent access. Expired entries behave exactly
//! like absent ones; expiry is enforced here, never by callers. The
//! cache is an optimization: serialization failures are logged and
//! absorbed, nothing propagates.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Thread-safe key/value store with per-entry expiration.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Build a deterministic cache key: namespace plus lower-cased,
    /// trimmed, colon-separated components. "Moscow" and " moscow "
    /// collide on purpose.
    pub fn key_for(namespace: &str, components: &[&str]) -> String {
        let mut key = String::from(namespace);
        for part in components {
            key.push(':');
            key.push_str(&part.trim().to_lowercase());
        }
        key
    }

    /// Fetch an unexpired value. Expired entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            drop(entry);
            self.entries.remove(key);
            debug!("cache expired: {}", key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store a value, overwriting any prior entry for the key. A zero
    /// TTL is rejected rather than stored permanently.
    pub fn set(&self, key: &str, value: String, ttl_secs: u64) {
        if ttl_secs == 0 {
            warn!("refusing zero TTL for cache key {}", key);
            return;
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        debug!("cached {} (ttl {}s)", key, ttl_secs);
    }

    /// Typed read: an undecodable entry counts as a miss and is dropped.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("dropping undecodable cache entry {}: {}", key, e);
                self.entries.remove(key);
                None
            }
        }
    }

    /// Typed write: serialization failures are logged, never raised.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw, ttl_secs),
            Err(e) => warn!("failed to serialize cache entry {}: {}", key, e),
        }
    }

    /// Remove every entry whose key starts with `prefix`. Safe to call
    /// when nothing matches.
    pub fn invalidate(&self, prefix: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("invalidated {} cache entries under {}", removed, prefix);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_for_is_case_and_whitespace_insensitive() {
        let a = TtlCache::key_for("weather", &["Moscow"]);
        let b = TtlCache::key_for("weather", &["moscow"]);
        let c = TtlCache::key_for("weather", &[" MOSCOW "]);

        assert_eq!(a, "weather:moscow");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn key_for_joins_components_with_colons() {
        let key = TtlCache::key_for("weather_coords", &["55.75", "37.62"]);
        assert_eq!(key, "weather_coords:55.75:37.62");
    }

    #[test]
    fn set_then_get_round_trips() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), 60);
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn get_misses_on_absent_key() {
        let cache = TtlCache::new();
        assert!(cache.get("nothing").is_none());
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), 1);

        assert!(cache.get("k").is_some());
        std::thread::sleep(Duration::from_millis(1100));
        assert!(cache.get("k").is_none());
        // Lazy eviction actually removed it.
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = TtlCache::new();
        cache.set("k", "old".to_string(), 60);
        cache.set("k", "new".to_string(), 60);
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), 0);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn invalidate_removes_matching_prefix_only() {
        let cache = TtlCache::new();
        cache.set("weather:moscow", "a".to_string(), 60);
        cache.set("weather:paris", "b".to_string(), 60);
        cache.set("forecast:moscow", "c".to_string(), 60);

        cache.invalidate("weather:");

        assert!(cache.get("weather:moscow").is_none());
        assert!(cache.get("weather:paris").is_none());
        assert_eq!(cache.get("forecast:moscow").as_deref(), Some("c"));
    }

    #[test]
    fn invalidate_without_matches_is_a_noop() {
        let cache = TtlCache::new();
        cache.set("weather:moscow", "a".to_string(), 60);
        cache.invalidate("history:");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn undecodable_json_entry_counts_as_miss() {
        let cache = TtlCache::new();
        cache.set("k", "not json".to_string(), 60);
        assert!(cache.get_json::<Vec<u32>>("k").is_none());
        // The bad entry was dropped, not left to fail forever.
        assert!(cache.get("k").is_none());
    }
}
