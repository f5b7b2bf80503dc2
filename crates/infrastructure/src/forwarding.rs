//! Forwarding implementation of the storage facade.
//!
//! `ForwardingStore` owns one shared handle per store contract and hands every call to
//! the delegate that owns that entity family, returning the delegate's result untouched.
//! Decorators layer behaviour on top of it by implementing the same contracts.

use async_trait::async_trait;
use scheduler_domain::{
    AttributeStore, CompositionError, Deploy, DeployStore, HostAttributes, JobConfiguration,
    JobKey, JobStore, Lock, LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore,
    Storage, StoreResult, TaskQuery, TaskSet, TaskStore,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A store that forwards all of its operations to underlying stores.
#[derive(Clone)]
pub struct ForwardingStore {
    scheduler_store: Arc<dyn SchedulerStore>,
    job_store: Arc<dyn JobStore>,
    task_store: Arc<dyn TaskStore>,
    lock_store: Arc<dyn LockStore>,
    quota_store: Arc<dyn QuotaStore>,
    attribute_store: Arc<dyn AttributeStore>,
    deploy_store: Arc<dyn DeployStore>,
}

impl ForwardingStore {
    pub fn new(
        scheduler_store: Arc<dyn SchedulerStore>,
        job_store: Arc<dyn JobStore>,
        task_store: Arc<dyn TaskStore>,
        lock_store: Arc<dyn LockStore>,
        quota_store: Arc<dyn QuotaStore>,
        attribute_store: Arc<dyn AttributeStore>,
        deploy_store: Arc<dyn DeployStore>,
    ) -> Self {
        Self {
            scheduler_store,
            job_store,
            task_store,
            lock_store,
            quota_store,
            attribute_store,
            deploy_store,
        }
    }

    pub fn builder() -> ForwardingStoreBuilder {
        ForwardingStoreBuilder::default()
    }
}

impl fmt::Debug for ForwardingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardingStore").finish_non_exhaustive()
    }
}

/// Collects the seven delegates and validates them once, in [`build`](Self::build).
#[derive(Default)]
pub struct ForwardingStoreBuilder {
    scheduler_store: Option<Arc<dyn SchedulerStore>>,
    job_store: Option<Arc<dyn JobStore>>,
    task_store: Option<Arc<dyn TaskStore>>,
    lock_store: Option<Arc<dyn LockStore>>,
    quota_store: Option<Arc<dyn QuotaStore>>,
    attribute_store: Option<Arc<dyn AttributeStore>>,
    deploy_store: Option<Arc<dyn DeployStore>>,
}

impl ForwardingStoreBuilder {
    pub fn scheduler_store(mut self, store: Arc<dyn SchedulerStore>) -> Self {
        self.scheduler_store = Some(store);
        self
    }

    pub fn job_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.job_store = Some(store);
        self
    }

    pub fn task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.task_store = Some(store);
        self
    }

    pub fn lock_store(mut self, store: Arc<dyn LockStore>) -> Self {
        self.lock_store = Some(store);
        self
    }

    pub fn quota_store(mut self, store: Arc<dyn QuotaStore>) -> Self {
        self.quota_store = Some(store);
        self
    }

    pub fn attribute_store(mut self, store: Arc<dyn AttributeStore>) -> Self {
        self.attribute_store = Some(store);
        self
    }

    pub fn deploy_store(mut self, store: Arc<dyn DeployStore>) -> Self {
        self.deploy_store = Some(store);
        self
    }

    /// Use one backend for every capability it implements.
    pub fn with_storage<S: Storage + 'static>(self, storage: Arc<S>) -> Self {
        self.scheduler_store(storage.clone())
            .job_store(storage.clone())
            .task_store(storage.clone())
            .lock_store(storage.clone())
            .quota_store(storage.clone())
            .attribute_store(storage.clone())
            .deploy_store(storage)
    }

    /// Fails with the first missing delegate, in declaration order.
    pub fn build(self) -> Result<ForwardingStore, CompositionError> {
        let store = ForwardingStore::new(
            self.scheduler_store
                .ok_or(CompositionError::missing("SchedulerStore"))?,
            self.job_store.ok_or(CompositionError::missing("JobStore"))?,
            self.task_store.ok_or(CompositionError::missing("TaskStore"))?,
            self.lock_store.ok_or(CompositionError::missing("LockStore"))?,
            self.quota_store.ok_or(CompositionError::missing("QuotaStore"))?,
            self.attribute_store
                .ok_or(CompositionError::missing("AttributeStore"))?,
            self.deploy_store
                .ok_or(CompositionError::missing("DeployStore"))?,
        );
        debug!("Composed forwarding store over seven delegates");
        Ok(store)
    }
}

#[async_trait]
impl SchedulerStore for ForwardingStore {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.scheduler_store.fetch_framework_id().await
    }
}

#[async_trait]
impl JobStore for ForwardingStore {
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        self.job_store.fetch_jobs(manager_id).await
    }

    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        self.job_store.fetch_job(manager_id, job_key).await
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        self.job_store.fetch_manager_ids().await
    }
}

#[async_trait]
impl TaskStore for ForwardingStore {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        self.task_store.fetch_tasks(query).await
    }
}

#[async_trait]
impl LockStore for ForwardingStore {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.lock_store.fetch_locks().await
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        self.lock_store.fetch_lock(lock_key).await
    }
}

#[async_trait]
impl QuotaStore for ForwardingStore {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.quota_store.fetch_quotas().await
    }

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        self.quota_store.fetch_quota(role).await
    }
}

#[async_trait]
impl AttributeStore for ForwardingStore {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        self.attribute_store.get_host_attributes(host).await
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.attribute_store.get_all_host_attributes().await
    }
}

#[async_trait]
impl DeployStore for ForwardingStore {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        self.deploy_store.get_deploys().await
    }

    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        self.deploy_store.get_deploy(deploy_id).await
    }
}
