//! Tag-aware response cache for the list endpoints
//!
//! Stores fully serialized JSON bodies keyed by resource + pagination (and
//! schema version where it changes the body). Every entry carries a set of
//! invalidation tags; mutations drop all entries tagged `booksCache` rather
//! than tracking individual keys.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Cache tag shared by the author and book list entries
pub const BOOKS_CACHE_TAG: &str = "booksCache";

#[derive(Debug, Clone)]
struct CacheEntry {
    body: Value,
    tags: Vec<String>,
    stored_at: Instant,
}

/// In-process response cache with tag-based invalidation
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Option<Duration>,
}

impl ResponseCache {
    /// Create a cache with a TTL in seconds; 0 means entries never expire
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl = if ttl_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(ttl_seconds))
        };
        Self::with_ttl(ttl)
    }

    fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Fetch a cached body; expired entries count as misses
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if let Some(ttl) = self.ttl {
            if entry.stored_at.elapsed() >= ttl {
                debug!("Cache entry expired: {}", key);
                return None;
            }
        }

        debug!("Cache hit: {}", key);
        Some(entry.body.clone())
    }

    /// Store a body under the given invalidation tags
    pub async fn put(&self, key: String, tags: &[&str], body: Value) {
        debug!("Cache store: {}", key);
        let entry = CacheEntry {
            body,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            stored_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Drop every entry carrying the tag
    pub async fn invalidate_tag(&self, tag: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        debug!(
            "Cache invalidated tag '{}': {} entries dropped",
            tag,
            before - entries.len()
        );
    }

    /// Number of stored entries (expired ones linger until overwritten)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = ResponseCache::new(0);

        cache
            .put(
                "getAllAuthors-1-3-anon".to_string(),
                &[BOOKS_CACHE_TAG],
                json!([{"lastname": "Tolkien"}]),
            )
            .await;

        let body = cache.get("getAllAuthors-1-3-anon").await.expect("hit");
        assert_eq!(body[0]["lastname"], "Tolkien");

        assert!(cache.get("getAllAuthors-2-3-anon").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_tag_drops_tagged_entries_only() {
        let cache = ResponseCache::new(0);

        cache
            .put("getAllAuthors-1-3-anon".to_string(), &[BOOKS_CACHE_TAG], json!([]))
            .await;
        cache
            .put("getAllBooks-1-3-v1.0".to_string(), &[BOOKS_CACHE_TAG], json!([]))
            .await;
        cache.put("unrelated".to_string(), &["otherTag"], json!([])).await;

        cache.invalidate_tag(BOOKS_CACHE_TAG).await;

        assert!(cache.get("getAllAuthors-1-3-anon").await.is_none());
        assert!(cache.get("getAllBooks-1-3-v1.0").await.is_none());
        assert!(cache.get("unrelated").await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_is_a_miss() {
        let cache = ResponseCache::with_ttl(Some(Duration::from_millis(50)));

        cache
            .put("short-lived".to_string(), &[BOOKS_CACHE_TAG], json!("x"))
            .await;
        assert!(cache.get("short-lived").await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("short-lived").await.is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let cache = ResponseCache::new(0);

        cache.put("stable".to_string(), &[], json!(1)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("stable").await.is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_key() {
        let cache = ResponseCache::new(0);

        cache.put("key".to_string(), &[BOOKS_CACHE_TAG], json!(1)).await;
        cache.put("key".to_string(), &[BOOKS_CACHE_TAG], json!(2)).await;

        assert_eq!(cache.get("key").await.expect("hit"), json!(2));
        assert_eq!(cache.len().await, 1);
    }
}
