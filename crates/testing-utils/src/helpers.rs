//! Test helper utilities and common testing patterns

use async_trait::async_trait;
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore, Storage, StoreOperation,
    TaskQuery, TaskSet, TaskStore,
};
use scheduler_errors::{StoreError, StoreResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

type ErrorFactory = Arc<dyn Fn() -> StoreError + Send + Sync>;

/// Storage whose every operation fails with a freshly built error
#[derive(Clone)]
pub struct FailingStorage {
    error: ErrorFactory,
}

impl FailingStorage {
    pub fn new<F>(error: F) -> Self
    where
        F: Fn() -> StoreError + Send + Sync + 'static,
    {
        Self {
            error: Arc::new(error),
        }
    }

    /// Fails with `StoreError::Unavailable`
    pub fn unavailable() -> Self {
        Self::new(|| StoreError::Unavailable("backend offline".to_string()))
    }

    fn fail<T>(&self) -> StoreResult<T> {
        Err((self.error)())
    }
}

#[async_trait]
impl SchedulerStore for FailingStorage {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.fail()
    }
}

#[async_trait]
impl JobStore for FailingStorage {
    async fn fetch_jobs(&self, _manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        self.fail()
    }

    async fn fetch_job(
        &self,
        _manager_id: &str,
        _job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        self.fail()
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        self.fail()
    }
}

#[async_trait]
impl TaskStore for FailingStorage {
    async fn fetch_tasks(&self, _query: &TaskQuery) -> StoreResult<TaskSet> {
        self.fail()
    }
}

#[async_trait]
impl LockStore for FailingStorage {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.fail()
    }

    async fn fetch_lock(&self, _lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        self.fail()
    }
}

#[async_trait]
impl QuotaStore for FailingStorage {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.fail()
    }

    async fn fetch_quota(&self, _role: &str) -> StoreResult<Option<ResourceAggregate>> {
        self.fail()
    }
}

#[async_trait]
impl AttributeStore for FailingStorage {
    async fn get_host_attributes(&self, _host: &str) -> StoreResult<Option<HostAttributes>> {
        self.fail()
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.fail()
    }
}

#[async_trait]
impl DeployStore for FailingStorage {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        self.fail()
    }

    async fn get_deploy(&self, _deploy_id: &str) -> StoreResult<Deploy> {
        self.fail()
    }
}

/// Forwards to an inner storage and counts calls per operation
#[derive(Clone)]
pub struct CountingStorage {
    inner: Arc<dyn Storage>,
    calls: Arc<Mutex<HashMap<StoreOperation, usize>>>,
}

impl CountingStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn calls(&self, operation: StoreOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn hit(&self, operation: StoreOperation) {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
    }
}

#[async_trait]
impl SchedulerStore for CountingStorage {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.hit(StoreOperation::FetchFrameworkId);
        self.inner.fetch_framework_id().await
    }
}

#[async_trait]
impl JobStore for CountingStorage {
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        self.hit(StoreOperation::FetchJobs);
        self.inner.fetch_jobs(manager_id).await
    }

    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        self.hit(StoreOperation::FetchJob);
        self.inner.fetch_job(manager_id, job_key).await
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        self.hit(StoreOperation::FetchManagerIds);
        self.inner.fetch_manager_ids().await
    }
}

#[async_trait]
impl TaskStore for CountingStorage {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        self.hit(StoreOperation::FetchTasks);
        self.inner.fetch_tasks(query).await
    }
}

#[async_trait]
impl LockStore for CountingStorage {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.hit(StoreOperation::FetchLocks);
        self.inner.fetch_locks().await
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        self.hit(StoreOperation::FetchLock);
        self.inner.fetch_lock(lock_key).await
    }
}

#[async_trait]
impl QuotaStore for CountingStorage {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.hit(StoreOperation::FetchQuotas);
        self.inner.fetch_quotas().await
    }

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        self.hit(StoreOperation::FetchQuota);
        self.inner.fetch_quota(role).await
    }
}

#[async_trait]
impl AttributeStore for CountingStorage {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        self.hit(StoreOperation::GetHostAttributes);
        self.inner.get_host_attributes(host).await
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.hit(StoreOperation::GetAllHostAttributes);
        self.inner.get_all_host_attributes().await
    }
}

#[async_trait]
impl DeployStore for CountingStorage {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        self.hit(StoreOperation::GetDeploys);
        self.inner.get_deploys().await
    }

    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        self.hit(StoreOperation::GetDeploy);
        self.inner.get_deploy(deploy_id).await
    }
}
