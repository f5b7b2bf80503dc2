use async_trait::async_trait;
use scheduler_domain::{
    AttributeStore, Deploy, DeployStore, HostAttributes, JobConfiguration, JobKey, JobStore, Lock,
    LockKey, LockStore, QuotaStore, ResourceAggregate, SchedulerStore, Storage, StoreError,
    StoreOperation, StoreResult, TaskQuery, TaskSet, TaskStore, IMMEDIATE_MANAGER_ID,
};
use scheduler_infrastructure::{
    AuditOutcome, AuditingStore, CacheService, CacheStats, CachingStore, ForwardingStore,
    InMemoryCacheService, InstrumentedStore, MemoryAuditSink, ValidatingStore,
};
use scheduler_testing_utils::{
    CountingStorage, DeployBuilder, FailingStorage, HostAttributesBuilder, InMemoryStorage,
    JobConfigurationBuilder, LockBuilder, MockQuotaStore, ScheduledTaskBuilder,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

fn hello_key() -> JobKey {
    JobKey::new("www-data", "prod", "hello")
}

fn seeded_storage() -> InMemoryStorage {
    let storage = InMemoryStorage::new();
    let key = hello_key();
    storage.set_framework_id("framework-1");
    storage.save_job(
        IMMEDIATE_MANAGER_ID,
        JobConfigurationBuilder::new("www-data", "prod", "hello").build(),
    );
    storage.save_tasks([
        ScheduledTaskBuilder::new("t-1", &key).running().build(),
        ScheduledTaskBuilder::new("t-2", &key)
            .with_instance_id(1)
            .finished()
            .build(),
    ]);
    storage.save_lock(LockBuilder::for_job(&key).build());
    storage.save_quota("root", ResourceAggregate::new(10.0, 1024, 2048));
    storage.save_host_attributes(
        HostAttributesBuilder::new("host-1")
            .with_attribute("rack", &["r1"])
            .build(),
    );
    storage.save_deploy(DeployBuilder::new("d-1").build());
    storage
}

fn forwarding_over(storage: Arc<dyn Storage>) -> ForwardingStore {
    ForwardingStore::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        storage.clone(),
        storage.clone(),
        storage.clone(),
        storage,
    )
}

/// Overrides `get_deploys` only.
struct PinnedDeploysStore {
    inner: Arc<dyn Storage>,
    pinned: HashSet<Deploy>,
}

#[async_trait]
impl SchedulerStore for PinnedDeploysStore {
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>> {
        self.inner.fetch_framework_id().await
    }
}

#[async_trait]
impl JobStore for PinnedDeploysStore {
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
impl TaskStore for PinnedDeploysStore {
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet> {
        self.inner.fetch_tasks(query).await
    }
}

#[async_trait]
impl LockStore for PinnedDeploysStore {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>> {
        self.inner.fetch_locks().await
    }

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>> {
        self.inner.fetch_lock(lock_key).await
    }
}

#[async_trait]
impl QuotaStore for PinnedDeploysStore {
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>> {
        self.inner.fetch_quotas().await
    }

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>> {
        self.inner.fetch_quota(role).await
    }
}

#[async_trait]
impl AttributeStore for PinnedDeploysStore {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>> {
        self.inner.get_host_attributes(host).await
    }

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>> {
        self.inner.get_all_host_attributes().await
    }
}

#[async_trait]
impl DeployStore for PinnedDeploysStore {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>> {
        Ok(self.pinned.clone())
    }

    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy> {
        self.inner.get_deploy(deploy_id).await
    }
}

/// Every call on every operation except `get_deploys` must agree with `base`.
async fn assert_same_reads(base: &dyn Storage, decorated: &dyn Storage) {
    let key = hello_key();
    let lock_key = LockKey::Job(key.clone());

    assert_eq!(
        base.fetch_framework_id().await.unwrap(),
        decorated.fetch_framework_id().await.unwrap()
    );
    assert_eq!(
        base.fetch_jobs(IMMEDIATE_MANAGER_ID).await.unwrap(),
        decorated.fetch_jobs(IMMEDIATE_MANAGER_ID).await.unwrap()
    );
    assert_eq!(
        base.fetch_job(IMMEDIATE_MANAGER_ID, &key).await.unwrap(),
        decorated.fetch_job(IMMEDIATE_MANAGER_ID, &key).await.unwrap()
    );
    assert_eq!(
        base.fetch_manager_ids().await.unwrap(),
        decorated.fetch_manager_ids().await.unwrap()
    );
    for query in [
        TaskQuery::unscoped(),
        TaskQuery::job_scoped(&key).active(),
        TaskQuery::task_scoped(["t-2"]),
    ] {
        assert_eq!(
            base.fetch_tasks(&query).await.unwrap(),
            decorated.fetch_tasks(&query).await.unwrap()
        );
    }
    assert_eq!(
        base.fetch_locks().await.unwrap(),
        decorated.fetch_locks().await.unwrap()
    );
    assert_eq!(
        base.fetch_lock(&lock_key).await.unwrap(),
        decorated.fetch_lock(&lock_key).await.unwrap()
    );
    assert_eq!(
        base.fetch_quotas().await.unwrap(),
        decorated.fetch_quotas().await.unwrap()
    );
    for role in ["root", "other"] {
        assert_eq!(
            base.fetch_quota(role).await.unwrap(),
            decorated.fetch_quota(role).await.unwrap()
        );
    }
    for host in ["host-1", "host-2"] {
        assert_eq!(
            base.get_host_attributes(host).await.unwrap(),
            decorated.get_host_attributes(host).await.unwrap()
        );
    }
    assert_eq!(
        base.get_all_host_attributes().await.unwrap(),
        decorated.get_all_host_attributes().await.unwrap()
    );
    assert_eq!(
        base.get_deploy("d-1").await.unwrap(),
        decorated.get_deploy("d-1").await.unwrap()
    );
    assert!(decorated.get_deploy("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_decorator_overriding_one_operation_leaves_others_alone() {
    let base = forwarding_over(Arc::new(seeded_storage()));
    let pinned = HashSet::from([DeployBuilder::new("pinned").build()]);
    let decorated = PinnedDeploysStore {
        inner: Arc::new(base.clone()),
        pinned: pinned.clone(),
    };

    assert_eq!(decorated.get_deploys().await.unwrap(), pinned);
    assert_ne!(
        base.get_deploys().await.unwrap(),
        decorated.get_deploys().await.unwrap()
    );
    assert_same_reads(&base, &decorated).await;
}

#[tokio::test]
async fn test_shipped_decorators_preserve_every_read() {
    let base: Arc<dyn Storage> = Arc::new(forwarding_over(Arc::new(seeded_storage())));

    let decorated: Vec<Arc<dyn Storage>> = vec![
        Arc::new(ValidatingStore::new(base.clone())),
        Arc::new(CachingStore::new(
            base.clone(),
            Arc::new(InMemoryCacheService::new(100)),
            Duration::from_secs(60),
        )),
        Arc::new(AuditingStore::new(
            base.clone(),
            Arc::new(MemoryAuditSink::new()),
        )),
        Arc::new(InstrumentedStore::new(base.clone(), Duration::from_secs(5)).without_metrics()),
    ];

    for store in decorated {
        assert_same_reads(base.as_ref(), store.as_ref()).await;
        assert_eq!(
            base.get_deploys().await.unwrap(),
            store.get_deploys().await.unwrap()
        );
    }
}

fn caching_over(inner: Arc<dyn Storage>) -> CachingStore {
    CachingStore::new(
        inner,
        Arc::new(InMemoryCacheService::new(100)),
        Duration::from_secs(60),
    )
}

#[tokio::test]
async fn test_cache_serves_repeated_lookups() {
    let counting = CountingStorage::new(Arc::new(seeded_storage()));
    let store = caching_over(Arc::new(counting.clone()));

    for _ in 0..3 {
        assert!(store.fetch_quota("root").await.unwrap().is_some());
        assert_eq!(store.fetch_quotas().await.unwrap().len(), 1);
        assert!(store.get_host_attributes("host-1").await.unwrap().is_some());
        assert_eq!(store.get_deploy("d-1").await.unwrap().deploy_id, "d-1");
        assert_eq!(
            store.fetch_framework_id().await.unwrap(),
            Some("framework-1".to_string())
        );
    }

    assert_eq!(counting.calls(StoreOperation::FetchQuota), 1);
    assert_eq!(counting.calls(StoreOperation::FetchQuotas), 1);
    assert_eq!(counting.calls(StoreOperation::GetHostAttributes), 1);
    assert_eq!(counting.calls(StoreOperation::GetDeploy), 1);
    assert_eq!(counting.calls(StoreOperation::FetchFrameworkId), 1);

    let stats = store.stats().await;
    assert_eq!(stats.hits, 10);
    assert_eq!(stats.misses, 5);
}

#[tokio::test]
async fn test_cache_hit_never_calls_the_delegate() {
    let mut quotas = MockQuotaStore::new();
    quotas
        .expect_fetch_quota()
        .withf(|role| role == "root")
        .times(1)
        .returning(|_| Ok(Some(ResourceAggregate::new(10.0, 0, 0))));
    let base = ForwardingStore::builder()
        .with_storage(Arc::new(seeded_storage()))
        .quota_store(Arc::new(quotas))
        .build()
        .unwrap();
    let store = caching_over(Arc::new(base));

    for _ in 0..3 {
        assert_eq!(
            store.fetch_quota("root").await.unwrap(),
            Some(ResourceAggregate::new(10.0, 0, 0))
        );
    }
    assert_eq!(store.stats().await.hits, 2);
}

#[tokio::test]
async fn test_ids_named_like_aggregates_do_not_collide() {
    let storage = seeded_storage();
    storage.save_quota("all", ResourceAggregate::new(1.0, 1, 1));
    storage.save_quota("*all", ResourceAggregate::new(2.0, 2, 2));
    let counting = CountingStorage::new(Arc::new(storage));
    let store = caching_over(Arc::new(counting.clone()));

    for _ in 0..2 {
        assert_eq!(
            store.fetch_quota("all").await.unwrap(),
            Some(ResourceAggregate::new(1.0, 1, 1))
        );
        assert_eq!(
            store.fetch_quota("*all").await.unwrap(),
            Some(ResourceAggregate::new(2.0, 2, 2))
        );
        assert_eq!(store.fetch_quotas().await.unwrap().len(), 3);
    }

    assert_eq!(counting.calls(StoreOperation::FetchQuotas), 1);
    let stats = store.stats().await;
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.hits, 3);

    store.invalidate_quotas().await.unwrap();
    assert_eq!(store.fetch_quotas().await.unwrap().len(), 3);
    assert_eq!(counting.calls(StoreOperation::FetchQuotas), 2);
}

#[tokio::test]
async fn test_cache_never_holds_absent_values() {
    let counting = CountingStorage::new(Arc::new(InMemoryStorage::new()));
    let store = caching_over(Arc::new(counting.clone()));

    assert_eq!(store.fetch_quota("other").await.unwrap(), None);
    assert_eq!(store.fetch_quota("other").await.unwrap(), None);
    assert!(store.get_deploy("missing").await.unwrap_err().is_not_found());
    assert!(store.get_deploy("missing").await.unwrap_err().is_not_found());

    assert_eq!(counting.calls(StoreOperation::FetchQuota), 2);
    assert_eq!(counting.calls(StoreOperation::GetDeploy), 2);
}

#[tokio::test]
async fn test_cache_does_not_hide_errors() {
    let store = caching_over(Arc::new(FailingStorage::unavailable()));

    for _ in 0..2 {
        let err = store.fetch_quotas().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
    assert_eq!(store.stats().await.sets, 0);
}

#[tokio::test]
async fn test_jobs_tasks_and_locks_bypass_the_cache() {
    let counting = CountingStorage::new(Arc::new(seeded_storage()));
    let store = caching_over(Arc::new(counting.clone()));

    for _ in 0..2 {
        store.fetch_jobs(IMMEDIATE_MANAGER_ID).await.unwrap();
        store.fetch_tasks(&TaskQuery::unscoped()).await.unwrap();
        store.fetch_locks().await.unwrap();
    }

    assert_eq!(counting.calls(StoreOperation::FetchJobs), 2);
    assert_eq!(counting.calls(StoreOperation::FetchTasks), 2);
    assert_eq!(counting.calls(StoreOperation::FetchLocks), 2);
    assert_eq!(store.stats().await.sets, 0);
}

#[tokio::test]
async fn test_invalidation_forces_a_reload() {
    let storage = seeded_storage();
    let store = caching_over(Arc::new(storage.clone()));

    assert_eq!(
        store.fetch_quota("root").await.unwrap(),
        Some(ResourceAggregate::new(10.0, 1024, 2048))
    );
    storage.save_quota("root", ResourceAggregate::new(20.0, 1024, 2048));
    assert_eq!(
        store.fetch_quota("root").await.unwrap(),
        Some(ResourceAggregate::new(10.0, 1024, 2048))
    );

    store.invalidate_quotas().await.unwrap();
    assert_eq!(
        store.fetch_quota("root").await.unwrap(),
        Some(ResourceAggregate::new(20.0, 1024, 2048))
    );

    assert_eq!(store.get_all_host_attributes().await.unwrap().len(), 1);
    storage.save_host_attributes(HostAttributesBuilder::new("host-2").build());
    store.invalidate_host("host-2").await.unwrap();
    assert_eq!(store.get_all_host_attributes().await.unwrap().len(), 2);

    assert_eq!(store.get_deploys().await.unwrap().len(), 1);
    storage.save_deploy(DeployBuilder::new("d-2").build());
    store.invalidate_all().await.unwrap();
    assert_eq!(store.get_deploys().await.unwrap().len(), 2);
}

struct BrokenCache;

#[async_trait]
impl CacheService for BrokenCache {
    async fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
        Err(StoreError::cache("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> StoreResult<()> {
        Err(StoreError::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Err(StoreError::cache("connection refused"))
    }

    async fn clear_prefix(&self, _prefix: &str) -> StoreResult<usize> {
        Err(StoreError::cache("connection refused"))
    }

    async fn clear(&self) -> StoreResult<()> {
        Err(StoreError::cache("connection refused"))
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

#[tokio::test]
async fn test_broken_cache_falls_back_to_storage() {
    let store = CachingStore::new(
        Arc::new(seeded_storage()),
        Arc::new(BrokenCache),
        Duration::from_secs(60),
    );

    assert!(store.fetch_quota("root").await.unwrap().is_some());
    assert_eq!(store.get_deploys().await.unwrap().len(), 1);
    assert!(store.invalidate_quotas().await.is_err());
    assert_eq!(store.stats().await.errors, 4);
}

#[tokio::test]
async fn test_instrumentation_counts_calls_and_errors() {
    let ok = InstrumentedStore::new(Arc::new(seeded_storage()), Duration::from_secs(5))
        .without_metrics();
    ok.fetch_quota("root").await.unwrap();
    ok.fetch_quota("other").await.unwrap();
    assert!(ok.get_deploy("missing").await.is_err());

    let quota = ok.operation_stats(StoreOperation::FetchQuota);
    assert_eq!(quota.calls, 2);
    assert_eq!(quota.errors, 0);
    assert_eq!(quota.slow_calls, 0);

    let deploy = ok.operation_stats(StoreOperation::GetDeploy);
    assert_eq!(deploy.calls, 1);
    assert_eq!(deploy.errors, 1);
    assert!((deploy.error_rate() - 1.0).abs() < f64::EPSILON);

    assert_eq!(ok.operation_stats(StoreOperation::FetchTasks).calls, 0);
    assert_eq!(ok.stats_snapshot().len(), 2);
}

#[tokio::test]
async fn test_instrumentation_flags_slow_calls() {
    let store = InstrumentedStore::new(Arc::new(FailingStorage::unavailable()), Duration::ZERO);

    let err = store.fetch_locks().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    let stats = store.operation_stats(StoreOperation::FetchLocks);
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.slow_calls, 1);
}

#[tokio::test]
async fn test_audit_records_outcomes() {
    let sink = Arc::new(MemoryAuditSink::new());
    let store = AuditingStore::new(Arc::new(seeded_storage()), sink.clone());

    store.fetch_quota("root").await.unwrap();
    store.fetch_quota("other").await.unwrap();
    assert!(store.get_deploy("missing").await.is_err());
    store.fetch_tasks(&TaskQuery::job_scoped(&hello_key())).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 4);

    assert_eq!(events[0].operation, StoreOperation::FetchQuota);
    assert_eq!(events[0].subject.as_deref(), Some("root"));
    assert_eq!(events[0].outcome, AuditOutcome::Success);
    assert_eq!(events[1].outcome, AuditOutcome::Absent);
    assert!(matches!(events[2].outcome, AuditOutcome::Failed(ref msg) if msg.contains("missing")));
    assert_eq!(events[3].subject.as_deref(), Some("www-data/prod/hello"));
}

#[tokio::test]
async fn test_audit_can_be_restricted() {
    let sink = Arc::new(MemoryAuditSink::new());
    let store = AuditingStore::new(Arc::new(seeded_storage()), sink.clone())
        .with_operations([StoreOperation::GetDeploy]);

    assert!(store.audits(StoreOperation::GetDeploy));
    assert!(!store.audits(StoreOperation::FetchQuota));

    store.fetch_quota("root").await.unwrap();
    store.get_deploy("d-1").await.unwrap();

    assert!(sink.events_for(StoreOperation::FetchQuota).is_empty());
    assert_eq!(sink.events_for(StoreOperation::GetDeploy).len(), 1);

    sink.clear();
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_validation_rejects_before_reaching_storage() {
    let counting = CountingStorage::new(Arc::new(seeded_storage()));
    let store = ValidatingStore::new(Arc::new(counting.clone()));

    assert!(matches!(
        store.fetch_jobs("").await.unwrap_err(),
        StoreError::InvalidArgument(_)
    ));
    assert!(matches!(
        store
            .fetch_job(IMMEDIATE_MANAGER_ID, &JobKey::new("www-data", "prod", "bad name"))
            .await
            .unwrap_err(),
        StoreError::InvalidArgument(_)
    ));
    assert!(matches!(
        store
            .fetch_lock(&LockKey::Job(JobKey::new("", "prod", "hello")))
            .await
            .unwrap_err(),
        StoreError::InvalidArgument(_)
    ));
    assert!(store.fetch_quota(" ").await.is_err());
    assert!(store.get_host_attributes("").await.is_err());
    assert!(store.get_deploy("").await.is_err());
    assert!(store
        .fetch_tasks(&TaskQuery::role_scoped(""))
        .await
        .is_err());

    assert_eq!(counting.total_calls(), 0);

    assert!(store
        .fetch_job(IMMEDIATE_MANAGER_ID, &hello_key())
        .await
        .unwrap()
        .is_some());
    assert_eq!(counting.calls(StoreOperation::FetchJob), 1);
}
