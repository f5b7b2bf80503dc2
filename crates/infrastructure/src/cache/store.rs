//! Read-through caching decorator over the storage facade.

use async_trait::async_trait;
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore, Storage, StoreResult,
    TaskQuery, TaskSet, TaskStore,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{
    all_deploys_cache_key, all_hosts_cache_key, all_quotas_cache_key, deploy_cache_key,
    framework_id_cache_key, host_cache_key, quota_cache_key, CachePrefix, CacheService,
    CacheServiceExt, CacheStats,
};

/// Cached storage wrapper
///
/// Only values that were successfully fetched and present are cached: errors and
/// absent lookups always go back to the inner storage on the next call. A failing
/// cache never fails the read, it is logged and bypassed.
pub struct CachingStore {
    inner: Arc<dyn Storage>,
    cache: Arc<dyn CacheService>,
    ttl: Duration,
    cache_errors: AtomicU64,
}

impl CachingStore {
    pub fn new(inner: Arc<dyn Storage>, cache: Arc<dyn CacheService>, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            cache_errors: AtomicU64::new(0),
        }
    }

    /// Backend statistics, with `errors` counting cache failures seen by this store
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.cache.get_stats().await;
        stats.errors += self.cache_errors.load(Ordering::Relaxed);
        stats
    }

    pub async fn invalidate_framework_id(&self) -> StoreResult<()> {
        self.cache.delete(&framework_id_cache_key()).await?;
        Ok(())
    }

    pub async fn invalidate_quotas(&self) -> StoreResult<()> {
        self.cache.clear_prefix(&prefix_of(CachePrefix::Quota)).await?;
        Ok(())
    }

    pub async fn invalidate_host(&self, host: &str) -> StoreResult<()> {
        self.cache.delete(&host_cache_key(host)).await?;
        self.cache.delete(&all_hosts_cache_key()).await?;
        Ok(())
    }

    pub async fn invalidate_deploys(&self) -> StoreResult<()> {
        self.cache.clear_prefix(&prefix_of(CachePrefix::Deploy)).await?;
        Ok(())
    }

    pub async fn invalidate_all(&self) -> StoreResult<()> {
        self.cache.clear().await
    }

    async fn read_through<T, F, Fut>(
        &self,
        key: String,
        load: F,
        cacheable: fn(&T) -> bool,
    ) -> StoreResult<T>
    where
        F: FnOnce() -> Fut + Send,
        T: Serialize + DeserializeOwned + Send + Sync,
        Fut: Future<Output = StoreResult<T>> + Send,
    {
        match self.cache.get_typed::<T>(&key).await {
            Ok(Some(cached)) => {
                debug!("Cache hit for {}", key);
                return Ok(cached);
            }
            Ok(None) => debug!("Cache miss for {}", key),
            Err(e) => {
                self.cache_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Cache read failed for {}: {}", key, e);
            }
        }

        let value = load().await?;

        if cacheable(&value) {
            if let Err(e) = self.cache.set_typed(&key, &value, self.ttl).await {
                self.cache_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Cache write failed for {}: {}", key, e);
            }
        }

        Ok(value)
    }
}

fn prefix_of(prefix: CachePrefix) -> String {
    format!("{}:", prefix.as_str())
}

fn always<T>(_: &T) -> bool {
    true
}

#[async_trait]
impl SchedulerStore for CachingStore {
    #[instrument(skip(self))]
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.read_through(
            framework_id_cache_key(),
            || self.inner.fetch_framework_id(),
            Option::is_some,
        )
        .await
    }
}

#[async_trait]
impl JobStore for CachingStore {
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        self.inner.fetch_jobs(manager_id).await
    }

    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        self.inner.fetch_job(manager_id, job_key).await
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        self.inner.fetch_manager_ids().await
    }
}

#[async_trait]
impl TaskStore for CachingStore {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        self.inner.fetch_tasks(query).await
    }
}

#[async_trait]
impl LockStore for CachingStore {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.inner.fetch_locks().await
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        self.inner.fetch_lock(lock_key).await
    }
}

#[async_trait]
impl QuotaStore for CachingStore {
    #[instrument(skip(self))]
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.read_through(all_quotas_cache_key(), || self.inner.fetch_quotas(), always)
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        self.read_through(
            quota_cache_key(role),
            || self.inner.fetch_quota(role),
            Option::is_some,
        )
        .await
    }
}

#[async_trait]
impl AttributeStore for CachingStore {
    #[instrument(skip(self))]
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        self.read_through(
            host_cache_key(host),
            || self.inner.get_host_attributes(host),
            Option::is_some,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.read_through(
            all_hosts_cache_key(),
            || self.inner.get_all_host_attributes(),
            always,
        )
        .await
    }
}

#[async_trait]
impl DeployStore for CachingStore {
    #[instrument(skip(self))]
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        self.read_through(all_deploys_cache_key(), || self.inner.get_deploys(), always)
            .await
    }

    #[instrument(skip(self))]
    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        self.read_through(
            deploy_cache_key(deploy_id),
            || self.inner.get_deploy(deploy_id),
            always,
        )
        .await
    }
}
