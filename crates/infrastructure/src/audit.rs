//! Audit trail for storage reads
//!
//! `AuditingStore` records one [`AuditEvent`] per audited call and hands it to an
//! [`AuditSink`]. Results are returned to the caller unchanged, including errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore, Storage, StoreOperation,
    StoreResult, TaskQuery, TaskSet, TaskStore,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Outcome of an audited read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    /// The read returned data
    Success,
    /// A by-key lookup found nothing
    Absent,
    /// The read failed; holds the error message
    Failed(String),
}

/// A single audited storage read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub operation: StoreOperation,
    /// Key the read was scoped to, if any
    pub subject: Option<String>,
    pub outcome: AuditOutcome,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(operation: StoreOperation, subject: Option<String>, outcome: AuditOutcome) -> Self {
        Self {
            operation,
            subject,
            outcome,
            timestamp: Utc::now(),
        }
    }
}

/// Destination for audit events
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Writes audit events to the `storage::audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        match &event.outcome {
            AuditOutcome::Failed(error) => warn!(
                target: "storage::audit",
                operation = event.operation.as_str(),
                subject = event.subject.as_deref().unwrap_or(""),
                error = %error,
                "Storage read failed"
            ),
            outcome => info!(
                target: "storage::audit",
                operation = event.operation.as_str(),
                subject = event.subject.as_deref().unwrap_or(""),
                outcome = ?outcome,
                "Storage read"
            ),
        }
    }
}

/// Keeps the most recent audit events in memory, mostly for tests and diagnostics.
/// Once `capacity` events are held, the oldest is dropped for each new one.
#[derive(Debug)]
pub struct MemoryAuditSink {
    capacity: usize,
    events: Mutex<VecDeque<AuditEvent>>,
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl MemoryAuditSink {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn events_for(&self, operation: StoreOperation) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.operation == operation)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Audits a configurable subset of operations and forwards everything.
pub struct AuditingStore {
    inner: Arc<dyn Storage>,
    sink: Arc<dyn AuditSink>,
    operations: HashSet<StoreOperation>,
}

impl AuditingStore {
    /// Audits every operation.
    pub fn new(inner: Arc<dyn Storage>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            inner,
            sink,
            operations: StoreOperation::ALL.into_iter().collect(),
        }
    }

    /// Restricts auditing to `operations`. An empty set audits nothing.
    pub fn with_operations(mut self, operations: impl IntoIterator<Item = StoreOperation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    pub fn audits(&self, operation: StoreOperation) -> bool {
        self.operations.contains(&operation)
    }

    async fn audit<T>(
        &self,
        operation: StoreOperation,
        subject: Option<String>,
        result: StoreResult<T>,
        is_absent: fn(&T) -> bool,
    ) -> StoreResult<T>
    where
        T: Send,
    {
        if !self.audits(operation) {
            return result;
        }

        let outcome = match &result {
            Ok(value) if is_absent(value) => AuditOutcome::Absent,
            Ok(_) => AuditOutcome::Success,
            Err(e) => AuditOutcome::Failed(e.to_string()),
        };
        self.sink
            .record(AuditEvent::new(operation, subject, outcome))
            .await;
        result
    }
}

fn never<T>(_: &T) -> bool {
    false
}

#[async_trait]
impl SchedulerStore for AuditingStore {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        let result = self.inner.fetch_framework_id().await;
        self.audit(StoreOperation::FetchFrameworkId, None, result, Option::is_none)
            .await
    }
}

#[async_trait]
impl JobStore for AuditingStore {
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        let result = self.inner.fetch_jobs(manager_id).await;
        self.audit(
            StoreOperation::FetchJobs,
            Some(manager_id.to_string()),
            result,
            never,
        )
        .await
    }

    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        let result = self.inner.fetch_job(manager_id, job_key).await;
        self.audit(
            StoreOperation::FetchJob,
            Some(format!("{manager_id}:{job_key}")),
            result,
            Option::is_none,
        )
        .await
    }

    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        let result = self.inner.fetch_manager_ids().await;
        self.audit(StoreOperation::FetchManagerIds, None, result, never)
            .await
    }
}

#[async_trait]
impl TaskStore for AuditingStore {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        let result = self.inner.fetch_tasks(query).await;
        let subject = query.job_key().map(|key| key.to_string());
        self.audit(StoreOperation::FetchTasks, subject, result, never)
            .await
    }
}

#[async_trait]
impl LockStore for AuditingStore {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        let result = self.inner.fetch_locks().await;
        self.audit(StoreOperation::FetchLocks, None, result, never)
            .await
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        let result = self.inner.fetch_lock(lock_key).await;
        self.audit(
            StoreOperation::FetchLock,
            Some(lock_key.to_string()),
            result,
            Option::is_none,
        )
        .await
    }
}

#[async_trait]
impl QuotaStore for AuditingStore {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        let result = self.inner.fetch_quotas().await;
        self.audit(StoreOperation::FetchQuotas, None, result, never)
            .await
    }

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        let result = self.inner.fetch_quota(role).await;
        self.audit(
            StoreOperation::FetchQuota,
            Some(role.to_string()),
            result,
            Option::is_none,
        )
        .await
    }
}

#[async_trait]
impl AttributeStore for AuditingStore {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        let result = self.inner.get_host_attributes(host).await;
        self.audit(
            StoreOperation::GetHostAttributes,
            Some(host.to_string()),
            result,
            Option::is_none,
        )
        .await
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        let result = self.inner.get_all_host_attributes().await;
        self.audit(StoreOperation::GetAllHostAttributes, None, result, never)
            .await
    }
}

#[async_trait]
impl DeployStore for AuditingStore {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        let result = self.inner.get_deploys().await;
        self.audit(StoreOperation::GetDeploys, None, result, never)
            .await
    }

    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        let result = self.inner.get_deploy(deploy_id).await;
        self.audit(
            StoreOperation::GetDeploy,
            Some(deploy_id.to_string()),
            result,
            never,
        )
        .await
    }
}
