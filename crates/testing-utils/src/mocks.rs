//! Mock implementations for all store contracts
//!
//! `InMemoryStorage` is a working, in-process backend for every contract. The
//! mockall mocks are for tests that need to assert exact call arguments.

use async_trait::async_trait;
use mockall::mock;
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, ScheduledTask, SchedulerStore, TaskQuery,
    TaskSet, TaskStore,
};
use scheduler_errors::{StoreError, StoreResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory backend implementing all seven store contracts
///
/// Clones share state, so a test can keep a handle for seeding data after handing
/// another clone to the code under test. Every read returns an owned snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    framework_id: Arc<Mutex<Option<String>>>,
    jobs: Arc<Mutex<HashMap<String, BTreeMap<JobKey, JobConfiguration>>>>,
    tasks: Arc<Mutex<HashMap<String, ScheduledTask>>>,
    locks: Arc<Mutex<HashMap<LockKey, Lock>>>,
    quotas: Arc<Mutex<HashMap<String, ResourceAggregate>>>,
    hosts: Arc<Mutex<HashMap<String, HostAttributes>>>,
    deploys: Arc<Mutex<HashMap<String, Deploy>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_framework_id(&self, framework_id: &str) {
        *self.framework_id.lock().unwrap() = Some(framework_id.to_string());
    }

    pub fn save_job(&self, manager_id: &str, job: JobConfiguration) {
        self.jobs
            .lock()
            .unwrap()
            .entry(manager_id.to_string())
            .or_default()
            .insert(job.key.clone(), job);
    }

    pub fn remove_job(&self, manager_id: &str, job_key: &JobKey) -> bool {
        let mut jobs = self.jobs.lock().unwrap();
        let removed = jobs
            .get_mut(manager_id)
            .is_some_and(|by_key| by_key.remove(job_key).is_some());
        if jobs.get(manager_id).is_some_and(|by_key| by_key.is_empty()) {
            jobs.remove(manager_id);
        }
        removed
    }

    pub fn save_tasks(&self, tasks: impl IntoIterator<Item = ScheduledTask>) {
        let mut stored = self.tasks.lock().unwrap();
        for task in tasks {
            stored.insert(task.task_id().to_string(), task);
        }
    }

    pub fn delete_tasks(&self, task_ids: &[&str]) {
        let mut stored = self.tasks.lock().unwrap();
        for id in task_ids {
            stored.remove(*id);
        }
    }

    pub fn save_lock(&self, lock: Lock) {
        self.locks.lock().unwrap().insert(lock.key.clone(), lock);
    }

    pub fn remove_lock(&self, lock_key: &LockKey) {
        self.locks.lock().unwrap().remove(lock_key);
    }

    pub fn save_quota(&self, role: &str, quota: ResourceAggregate) {
        self.quotas.lock().unwrap().insert(role.to_string(), quota);
    }

    pub fn remove_quota(&self, role: &str) {
        self.quotas.lock().unwrap().remove(role);
    }

    pub fn save_host_attributes(&self, attributes: HostAttributes) {
        self.hosts
            .lock()
            .unwrap()
            .insert(attributes.host.clone(), attributes);
    }

    pub fn save_deploy(&self, deploy: Deploy) {
        self.deploys
            .lock()
            .unwrap()
            .insert(deploy.deploy_id.clone(), deploy);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn clear(&self) {
        *self.framework_id.lock().unwrap() = None;
        self.jobs.lock().unwrap().clear();
        self.tasks.lock().unwrap().clear();
        self.locks.lock().unwrap().clear();
        self.quotas.lock().unwrap().clear();
        self.hosts.lock().unwrap().clear();
        self.deploys.lock().unwrap().clear();
    }
}

#[async_trait]
impl SchedulerStore for InMemoryStorage {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        Ok(self.framework_id.lock().unwrap().clone())
    }
}

#[async_trait]
impl JobStore for InMemoryStorage {
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .get(manager_id)
            .map(|by_key| by_key.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .get(manager_id)
            .and_then(|by_key| by_key.get(job_key).cloned()))
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, by_key)| !by_key.is_empty())
            .map(|(id, _)| id.clone())
            .collect())
    }
}

#[async_trait]
impl TaskStore for InMemoryStorage {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LockStore for InMemoryStorage {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        Ok(self.locks.lock().unwrap().values().cloned().collect())
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        Ok(self.locks.lock().unwrap().get(lock_key).cloned())
    }
}

#[async_trait]
impl QuotaStore for InMemoryStorage {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        Ok(self.quotas.lock().unwrap().clone())
    }

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        Ok(self.quotas.lock().unwrap().get(role).copied())
    }
}

#[async_trait]
impl AttributeStore for InMemoryStorage {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        Ok(self.hosts.lock().unwrap().get(host).cloned())
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        Ok(self.hosts.lock().unwrap().values().cloned().collect())
    }
}

#[async_trait]
impl DeployStore for InMemoryStorage {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        Ok(self.deploys.lock().unwrap().values().cloned().collect())
    }

    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        self.deploys
            .lock()
            .unwrap()
            .get(deploy_id)
            .cloned()
            .ok_or_else(|| StoreError::deploy_not_found(deploy_id))
    }
}

mock! {
    pub SchedulerStore {}
    #[async_trait]
    impl SchedulerStore for SchedulerStore {
        async fn fetch_framework_id(&self) -> StoreResult<Option<String>>;
    }
}

mock! {
    pub JobStore {}
    #[async_trait]
    impl JobStore for JobStore {
        async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>>;
        async fn fetch_job(
            &self,
            manager_id: &str,
            job_key: &JobKey,
        ) -> StoreResult<Option<JobConfiguration>>;
        async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>>;
    }
}

mock! {
    pub TaskStore {}
    #[async_trait]
    impl TaskStore for TaskStore {
        async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet>;
    }
}

mock! {
    pub LockStore {}
    #[async_trait]
    impl LockStore for LockStore {
        async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>>;
        async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>>;
    }
}

mock! {
    pub QuotaStore {}
    #[async_trait]
    impl QuotaStore for QuotaStore {
        async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>>;
        async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>>;
    }
}

mock! {
    pub AttributeStore {}
    #[async_trait]
    impl AttributeStore for AttributeStore {
        async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>>;
        async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>>;
    }
}

mock! {
    pub DeployStore {}
    #[async_trait]
    impl DeployStore for DeployStore {
        async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>>;
        async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy>;
    }
}
