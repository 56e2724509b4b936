use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Rendered listing pages with a fixed time-to-live.
///
/// Writes to the store never touch this cache: a new post shows up on a
/// cached page only after the entry expires or `clear` is called.
pub struct ListingCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Key for a page as seen by one viewer, `None` for guests.
    pub fn key(uri: &str, viewer: Option<&str>) -> String {
        format!("listing:{}:{}", viewer.unwrap_or(""), uri)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                debug!("Cache HIT for key: {}", key);
                Some(entry.body.clone())
            }
            Some(_) => {
                debug!("Cache EXPIRED for key: {}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    pub async fn set(&self, key: String, body: String) {
        let mut store = self.store.write().await;
        // drop dead entries while we hold the lock anyway
        store.retain(|_, entry| !entry.is_expired());
        store.insert(
            key,
            CacheEntry {
                body,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
        debug!("Listing cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_until_cleared() {
        let cache = ListingCache::new(Duration::from_secs(60));
        let key = ListingCache::key("/", None);
        cache.set(key.clone(), "<p>old</p>".into()).await;

        assert_eq!(cache.get(&key).await.as_deref(), Some("<p>old</p>"));

        cache.clear().await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = ListingCache::new(Duration::ZERO);
        let key = ListingCache::key("/", None);
        cache.set(key.clone(), "body".into()).await;
        assert!(cache.get(&key).await.is_none());

        // the next write sweeps the dead entry out
        cache.set(ListingCache::key("/?page=2", None), "other".into()).await;
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn viewers_get_separate_keys() {
        assert_ne!(
            ListingCache::key("/?page=2", None),
            ListingCache::key("/?page=2", Some("auth"))
        );
    }
}
