//! Bounded in-memory response cache
//!
//! Entries expire by TTL and the map is capped: at capacity, expired
//! entries are purged first, then the entry closest to expiry is evicted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thinktank_application::{Fingerprint, ResponseCache};
use tokio::sync::RwLock;
use tracing::debug;

pub const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    expires_at: Instant,
}

pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl InMemoryResponseCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(fingerprint.as_str())?;
        // A hit is valid only strictly before expiry.
        if Instant::now() < entry.expires_at {
            Some(entry.text.clone())
        } else {
            None
        }
    }

    async fn put(&self, fingerprint: Fingerprint, text: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        let key = fingerprint.as_str().to_string();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let now = Instant::now();
            entries.retain(|_, e| e.expires_at > now);

            if entries.len() >= self.max_entries {
                if let Some(evict) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone())
                {
                    debug!("Response cache full, evicting entry closest to expiry");
                    entries.remove(&evict);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                text,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(tag: &str) -> Fingerprint {
        Fingerprint::compute(&[tag])
    }

    #[tokio::test]
    async fn roundtrip_within_ttl() {
        let cache = InMemoryResponseCache::default();
        let fp = fingerprint("a");
        cache
            .put(fp.clone(), "hello".to_string(), Duration::from_secs(1))
            .await;
        assert_eq!(cache.get(&fp).await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = InMemoryResponseCache::default();
        let fp = fingerprint("a");
        cache
            .put(fp.clone(), "hello".to_string(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(&fp).await, None);
    }

    #[tokio::test]
    async fn unknown_fingerprint_is_a_miss() {
        let cache = InMemoryResponseCache::default();
        assert_eq!(cache.get(&fingerprint("missing")).await, None);
    }

    #[tokio::test]
    async fn overwrite_replaces_text() {
        let cache = InMemoryResponseCache::default();
        let fp = fingerprint("a");
        cache
            .put(fp.clone(), "old".to_string(), Duration::from_secs(1))
            .await;
        cache
            .put(fp.clone(), "new".to_string(), Duration::from_secs(1))
            .await;
        assert_eq!(cache.get(&fp).await.as_deref(), Some("new"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn capacity_evicts_entry_closest_to_expiry() {
        let cache = InMemoryResponseCache::new(2);
        let short = fingerprint("short");
        let long = fingerprint("long");
        cache
            .put(short.clone(), "s".to_string(), Duration::from_secs(1))
            .await;
        cache
            .put(long.clone(), "l".to_string(), Duration::from_secs(60))
            .await;

        let extra = fingerprint("extra");
        cache
            .put(extra.clone(), "e".to_string(), Duration::from_secs(60))
            .await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&short).await, None);
        assert!(cache.get(&long).await.is_some());
        assert!(cache.get(&extra).await.is_some());
    }

    #[tokio::test]
    async fn capacity_purges_expired_before_evicting_live() {
        let cache = InMemoryResponseCache::new(2);
        let dead = fingerprint("dead");
        let live = fingerprint("live");
        cache
            .put(dead.clone(), "d".to_string(), Duration::from_millis(5))
            .await;
        cache
            .put(live.clone(), "l".to_string(), Duration::from_secs(60))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache
            .put(fingerprint("extra"), "e".to_string(), Duration::from_secs(60))
            .await;

        // The expired entry made room; the live one survives.
        assert!(cache.get(&live).await.is_some());
        assert_eq!(cache.len().await, 2);
    }
}
