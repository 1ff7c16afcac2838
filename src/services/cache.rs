use crate::models::ExclusionSets;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier exclusion-set cache
///
/// L1 (in-process moka) and L2 (Redis) accelerate queue filtering before the
/// authoritative fetch completes. The cache is never authoritative: every
/// session rebuilds it wholesale from a full fetch, and a corrupt or missing
/// entry degrades to empty sets rather than an error.
pub struct CacheManager {
    // None when Redis was unreachable at startup; the service still runs,
    // reads just fall through to the authoritative store.
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager. A failed Redis connection is logged and
    /// leaves the L2 tier disabled instead of failing startup.
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Self {
        let redis = match Self::connect(redis_url).await {
            Ok(conn) => Some(Arc::new(tokio::sync::Mutex::new(conn))),
            Err(e) => {
                tracing::warn!("Redis unavailable ({}), running with L1 cache only", e);
                None
            }
        };

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis,
            l1_cache,
            ttl_secs,
        }
    }

    async fn connect(redis_url: &str) -> Result<ConnectionManager, CacheError> {
        let client = redis::Client::open(redis_url)?;
        Ok(ConnectionManager::new(client).await?)
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let Some(redis) = &self.redis else {
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);
            let bytes = json.as_bytes().to_vec();
            self.l1_cache.insert(key.to_string(), bytes).await;
            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both L1 and L2)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        let bytes = json.as_bytes().to_vec();
        self.l1_cache.insert(key.to_string(), bytes).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(())
    }

    /// Read an owner's exclusion sets, failing safe on every path.
    ///
    /// A missing key, unreachable Redis, or a corrupt persisted value all
    /// degrade to empty sets; filtering then waits for the authoritative
    /// fetch. This method never returns an error.
    pub async fn exclusion_sets(&self, owner_id: &str) -> ExclusionSets {
        ExclusionSets {
            passed: self.id_set(&CacheKey::passed(owner_id)).await,
            saved: self.id_set(&CacheKey::saved(owner_id)).await,
            pending: self.id_set(&CacheKey::pending(owner_id)).await,
        }
    }

    async fn id_set(&self, key: &str) -> HashSet<String> {
        match self.get::<HashSet<String>>(key).await {
            Ok(set) => set,
            Err(CacheError::SerializationError(e)) => {
                tracing::warn!("Corrupt cached id-set at {}, degrading to empty: {}", key, e);
                drop_corrupt_key(self, key).await;
                HashSet::new()
            }
            Err(_) => HashSet::new(),
        }
    }

    /// Replace an owner's exclusion sets wholesale after an authoritative fetch.
    pub async fn store_exclusion_sets(
        &self,
        owner_id: &str,
        sets: &ExclusionSets,
    ) -> Result<(), CacheError> {
        self.set(&CacheKey::passed(owner_id), &sets.passed).await?;
        self.set(&CacheKey::saved(owner_id), &sets.saved).await?;
        self.set(&CacheKey::pending(owner_id), &sets.pending).await?;
        Ok(())
    }

    /// Drop all cached sets for an owner after a state-changing action.
    pub async fn invalidate_owner(&self, owner_id: &str) -> Result<(), CacheError> {
        self.delete(&CacheKey::passed(owner_id)).await?;
        self.delete(&CacheKey::saved(owner_id)).await?;
        self.delete(&CacheKey::pending(owner_id)).await?;
        Ok(())
    }
}

// Corrupt entries are dropped so the next session starts clean.
async fn drop_corrupt_key(cache: &CacheManager, key: &str) {
    if let Err(e) = cache.delete(key).await {
        tracing::debug!("Failed to drop corrupt cache key {}: {}", key, e);
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for the passed counterpart id-set
    pub fn passed(owner_id: &str) -> String {
        format!("excl:passed:{}", owner_id)
    }

    /// Key for the saved/connected counterpart id-set
    pub fn saved(owner_id: &str) -> String {
        format!("excl:saved:{}", owner_id)
    }

    /// Key for the pending counterpart id-set
    pub fn pending(owner_id: &str) -> String {
        format!("excl:pending:{}", owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_redis_degrades_to_empty_sets() {
        // Nothing listens on this port; the manager must still construct and
        // exclusion-set reads must fail safe to empty.
        let cache = CacheManager::new("redis://127.0.0.1:1", 100, 60).await;

        let sets = cache.exclusion_sets("user123").await;
        assert!(sets.passed.is_empty());
        assert!(sets.saved.is_empty());
        assert!(sets.pending.is_empty());
    }

    #[tokio::test]
    async fn test_l1_round_trip_without_redis() {
        let cache = CacheManager::new("redis://127.0.0.1:1", 100, 60).await;

        let mut sets = ExclusionSets::default();
        sets.passed.insert("p1".to_string());
        sets.pending.insert("q1".to_string());

        // With Redis down the write only lands in the L1 tier
        cache.store_exclusion_sets("user123", &sets).await.unwrap();

        let cached = cache.exclusion_sets("user123").await;
        assert!(cached.contains("p1"));
    }

    #[tokio::test]
    async fn test_corrupt_cached_set_fails_safe_to_empty() {
        let cache = CacheManager::new("redis://127.0.0.1:1", 100, 60).await;

        // A wrong-shaped value under a set key must not surface as an error
        cache
            .set(&CacheKey::passed("user123"), &"not-a-set")
            .await
            .unwrap();

        let sets = cache.exclusion_sets("user123").await;
        assert!(sets.passed.is_empty());
        assert!(sets.saved.is_empty());
        assert!(sets.pending.is_empty());

        // The corrupt entry was dropped; the next read is a clean miss
        let next = cache.get::<HashSet<String>>(&CacheKey::passed("user123")).await;
        assert!(matches!(next, Err(CacheError::CacheMiss(_))));
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60).await;

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::passed("user123"), "excl:passed:user123");
        assert_eq!(CacheKey::saved("user123"), "excl:saved:user123");
        assert_eq!(CacheKey::pending("user123"), "excl:pending:user123");
    }
}
