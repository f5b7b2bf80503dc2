//! Caching layer for slow-changing scheduler state.
//!
//! Quotas, host attributes, deploy records and the framework id are read far more often
//! than they are written, so they are served from a [`CacheService`] once fetched.
//! Jobs, tasks and locks are never cached.

pub mod memory;
pub mod store;

use async_trait::async_trait;
pub use memory::*;
pub use store::*;

use scheduler_domain::{StoreError, StoreResult};

/// Cache key prefix patterns for different data types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachePrefix {
    FrameworkId,
    Quota,
    Host,
    Deploy,
}

impl CachePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePrefix::FrameworkId => "framework_id",
            CachePrefix::Quota => "quota",
            CachePrefix::Host => "host",
            CachePrefix::Deploy => "deploy",
        }
    }
}

/// Cache statistics and metrics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }
}

/// Cache service trait for dependency injection
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Get a value from cache as raw bytes
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Set a value in cache with TTL
    async fn set(&self, key: &str, value: &[u8], ttl: std::time::Duration) -> StoreResult<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Clear all cache entries with a specific prefix
    async fn clear_prefix(&self, prefix: &str) -> StoreResult<usize>;

    async fn clear(&self) -> StoreResult<()>;

    async fn get_stats(&self) -> CacheStats;
}

/// Extension trait for convenient type-safe caching
#[async_trait]
pub trait CacheServiceExt: Send + Sync {
    async fn get_typed<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send + Sync;

    async fn set_typed<T>(&self, key: &str, value: &T, ttl: std::time::Duration) -> StoreResult<()>
    where
        T: serde::Serialize + Send + Sync;
}

#[async_trait]
impl<T: CacheService + ?Sized> CacheServiceExt for T {
    async fn get_typed<U>(&self, key: &str) -> StoreResult<Option<U>>
    where
        U: serde::de::DeserializeOwned + Send + Sync,
    {
        match self.get(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::cache(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set_typed<U>(&self, key: &str, value: &U, ttl: std::time::Duration) -> StoreResult<()>
    where
        U: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value).map_err(|e| StoreError::cache(e.to_string()))?;
        self.set(key, &bytes, ttl).await
    }
}

/// Build cache key with prefix
///
/// Per-key entries live under `<prefix>:key:`, so no id can reach the
/// `<prefix>:all` aggregate slot. Both sit under `<prefix>:` for prefix clears.
pub fn build_cache_key(prefix: CachePrefix, id: &str) -> String {
    format!("{}:key:{}", prefix.as_str(), id)
}

pub fn build_aggregate_key(prefix: CachePrefix) -> String {
    format!("{}:all", prefix.as_str())
}

pub fn framework_id_cache_key() -> String {
    format!("{}:current", CachePrefix::FrameworkId.as_str())
}

pub fn quota_cache_key(role: &str) -> String {
    build_cache_key(CachePrefix::Quota, role)
}

pub fn all_quotas_cache_key() -> String {
    build_aggregate_key(CachePrefix::Quota)
}

pub fn host_cache_key(host: &str) -> String {
    build_cache_key(CachePrefix::Host, host)
}

pub fn all_hosts_cache_key() -> String {
    build_aggregate_key(CachePrefix::Host)
}

pub fn deploy_cache_key(deploy_id: &str) -> String {
    build_cache_key(CachePrefix::Deploy, deploy_id)
}

pub fn all_deploys_cache_key() -> String {
    build_aggregate_key(CachePrefix::Deploy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_building() {
        assert_eq!(quota_cache_key("www-data"), "quota:key:www-data");
        assert_eq!(host_cache_key("host-1"), "host:key:host-1");
        assert_eq!(deploy_cache_key("d-9"), "deploy:key:d-9");
        assert_eq!(framework_id_cache_key(), "framework_id:current");
        assert_eq!(all_quotas_cache_key(), "quota:all");
    }

    #[test]
    fn test_no_id_maps_to_an_aggregate_key() {
        for id in ["all", "*all", ":all", "key:all", ""] {
            assert_ne!(quota_cache_key(id), all_quotas_cache_key());
            assert_ne!(host_cache_key(id), all_hosts_cache_key());
            assert_ne!(deploy_cache_key(id), all_deploys_cache_key());
        }
        assert!(all_quotas_cache_key().starts_with("quota:"));
        assert!(quota_cache_key("root").starts_with("quota:"));
    }

    #[test]
    fn test_cache_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };

        assert!((stats.hit_rate() - 0.8).abs() < f64::EPSILON);
        assert!((stats.miss_rate() - 0.2).abs() < 1e-9);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
