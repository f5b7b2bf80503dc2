//! Timing and metrics decorator for the storage facade.

use async_trait::async_trait;
use metrics::{counter, histogram};
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore, Storage, StoreOperation,
    StoreResult, TaskQuery, TaskSet, TaskStore,
};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

/// Per-operation counters kept alongside the exported metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStats {
    pub calls: u64,
    pub errors: u64,
    pub slow_calls: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
}

impl OperationStats {
    pub fn average_duration(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total_duration.as_nanos() / u128::from(self.calls);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.errors as f64 / self.calls as f64
        }
    }
}

/// Records a span, call/error counters and a latency histogram for every operation,
/// and warns when a call exceeds the slow threshold. Results are returned untouched.
pub struct InstrumentedStore {
    inner: Arc<dyn Storage>,
    slow_threshold: Duration,
    emit_metrics: bool,
    stats: Mutex<HashMap<StoreOperation, OperationStats>>,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<dyn Storage>, slow_threshold: Duration) -> Self {
        Self {
            inner,
            slow_threshold,
            emit_metrics: true,
            stats: Mutex::new(HashMap::new()),
        }
    }

    pub fn without_metrics(mut self) -> Self {
        self.emit_metrics = false;
        self
    }

    pub fn operation_stats(&self, operation: StoreOperation) -> OperationStats {
        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&operation)
            .cloned()
            .unwrap_or_default()
    }

    pub fn stats_snapshot(&self) -> HashMap<StoreOperation, OperationStats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn observe<T, Fut>(&self, operation: StoreOperation, call: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>> + Send,
    {
        let start = Instant::now();
        let result = call.await;
        self.record(operation, start.elapsed(), result.is_err());
        result
    }

    fn record(&self, operation: StoreOperation, elapsed: Duration, failed: bool) {
        let slow = elapsed >= self.slow_threshold;

        if self.emit_metrics {
            let store = operation.store();
            let name = operation.as_str();
            counter!("storage_operations_total", "store" => store, "operation" => name)
                .increment(1);
            histogram!("storage_operation_duration_seconds", "store" => store, "operation" => name)
                .record(elapsed.as_secs_f64());
            if failed {
                counter!("storage_operation_errors_total", "store" => store, "operation" => name)
                    .increment(1);
            }
        }

        if slow {
            warn!(
                store = operation.store(),
                operation = operation.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow storage read"
            );
        }

        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        let entry = stats.entry(operation).or_default();
        entry.calls += 1;
        entry.total_duration += elapsed;
        entry.max_duration = entry.max_duration.max(elapsed);
        if failed {
            entry.errors += 1;
        }
        if slow {
            entry.slow_calls += 1;
        }
    }
}

#[async_trait]
impl SchedulerStore for InstrumentedStore {
    #[instrument(skip(self), fields(store = "SchedulerStore"))]
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.observe(
            StoreOperation::FetchFrameworkId,
            self.inner.fetch_framework_id(),
        )
        .await
    }
}

#[async_trait]
impl JobStore for InstrumentedStore {
    #[instrument(skip(self), fields(store = "JobStore"))]
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>> {
        self.observe(StoreOperation::FetchJobs, self.inner.fetch_jobs(manager_id))
            .await
    }

    #[instrument(skip(self), fields(store = "JobStore", job = %job_key))]
    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>> {
        self.observe(
            StoreOperation::FetchJob,
            self.inner.fetch_job(manager_id, job_key),
        )
        .await
    }

    #[instrument(skip(self), fields(store = "JobStore"))]
    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>> {
        self.observe(StoreOperation::FetchManagerIds, self.inner.fetch_manager_ids())
            .await
    }
}

#[async_trait]
impl TaskStore for InstrumentedStore {
    #[instrument(skip(self, query), fields(store = "TaskStore"))]
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        self.observe(StoreOperation::FetchTasks, self.inner.fetch_tasks(query))
            .await
    }
}

#[async_trait]
impl LockStore for InstrumentedStore {
    #[instrument(skip(self), fields(store = "LockStore"))]
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.observe(StoreOperation::FetchLocks, self.inner.fetch_locks())
            .await
    }

    #[instrument(skip(self), fields(store = "LockStore", lock = %lock_key))]
    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        self.observe(StoreOperation::FetchLock, self.inner.fetch_lock(lock_key))
            .await
    }
}

#[async_trait]
impl QuotaStore for InstrumentedStore {
    #[instrument(skip(self), fields(store = "QuotaStore"))]
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.observe(StoreOperation::FetchQuotas, self.inner.fetch_quotas())
            .await
    }

    #[instrument(skip(self), fields(store = "QuotaStore"))]
    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        self.observe(StoreOperation::FetchQuota, self.inner.fetch_quota(role))
            .await
    }
}

#[async_trait]
impl AttributeStore for InstrumentedStore {
    #[instrument(skip(self), fields(store = "AttributeStore"))]
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        self.observe(
            StoreOperation::GetHostAttributes,
            self.inner.get_host_attributes(host),
        )
        .await
    }

    #[instrument(skip(self), fields(store = "AttributeStore"))]
    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.observe(
            StoreOperation::GetAllHostAttributes,
            self.inner.get_all_host_attributes(),
        )
        .await
    }
}

#[async_trait]
impl DeployStore for InstrumentedStore {
    #[instrument(skip(self), fields(store = "DeployStore"))]
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        self.observe(StoreOperation::GetDeploys, self.inner.get_deploys())
            .await
    }

    #[instrument(skip(self), fields(store = "DeployStore"))]
    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        self.observe(StoreOperation::GetDeploy, self.inner.get_deploy(deploy_id))
            .await
    }
}
