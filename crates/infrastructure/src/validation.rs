//! Argument validation in front of the storage facade.

use async_trait::async_trait;
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore, Storage, StoreError,
    StoreResult, TaskQuery, TaskSet, TaskStore,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Rejects malformed keys with [`StoreError::InvalidArgument`] before they reach
/// the inner storage. Operations without arguments are forwarded as is.
pub struct ValidatingStore {
    inner: Arc<dyn Storage>,
}

impl ValidatingStore {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self { inner }
    }
}

fn require_non_empty(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        debug!("Rejected read with empty {}", field);
        return Err(StoreError::invalid_argument(format!("{field} 不能为空")));
    }
    Ok(())
}

fn require_valid_job_key(job_key: &JobKey) -> StoreResult<()> {
    if !job_key.is_valid() {
        debug!("Rejected read with malformed job key {}", job_key);
        return Err(StoreError::invalid_argument(format!(
            "非法的作业键: {job_key}"
        )));
    }
    Ok(())
}

fn validate_query(query: &TaskQuery) -> StoreResult<()> {
    if let Some(role) = &query.role {
        require_non_empty("role", role)?;
    }
    if let Some(environment) = &query.environment {
        require_non_empty("environment", environment)?;
    }
    if let Some(job_name) = &query.job_name {
        require_non_empty("job_name", job_name)?;
    }
    if let Some(hosts) = &query.slave_hosts {
        for host in hosts {
            require_non_empty("slave_host", host)?;
        }
    }
    Ok(())
}

#[async_trait]
impl SchedulerStore for ValidatingStore {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.inner.fetch_framework_id().await
    }
}

#[async_trait]
impl JobStore for ValidatingStore {
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        require_non_empty("manager_id", manager_id)?;
        self.inner.fetch_jobs(manager_id).await
    }

    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        require_non_empty("manager_id", manager_id)?;
        require_valid_job_key(job_key)?;
        self.inner.fetch_job(manager_id, job_key).await
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        self.inner.fetch_manager_ids().await
    }
}

#[async_trait]
impl TaskStore for ValidatingStore {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        validate_query(query)?;
        self.inner.fetch_tasks(query).await
    }
}

#[async_trait]
impl LockStore for ValidatingStore {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.inner.fetch_locks().await
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        match lock_key {
            LockKey::Job(job_key) => require_valid_job_key(job_key)?,
        }
        self.inner.fetch_lock(lock_key).await
    }
}

#[async_trait]
impl QuotaStore for ValidatingStore {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.inner.fetch_quotas().await
    }

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        require_non_empty("role", role)?;
        self.inner.fetch_quota(role).await
    }
}

#[async_trait]
impl AttributeStore for ValidatingStore {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        require_non_empty("host", host)?;
        self.inner.get_host_attributes(host).await
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.inner.get_all_host_attributes().await
    }
}

#[async_trait]
impl DeployStore for ValidatingStore {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        self.inner.get_deploys().await
    }

    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        require_non_empty("deploy_id", deploy_id)?;
        self.inner.get_deploy(deploy_id).await
    }
}
