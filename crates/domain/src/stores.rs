//! 调度器存储读取契约
//!
//! 每个契约只负责一类实体的只读访问，彼此之间没有依赖：
//! - `SchedulerStore` - 调度器框架身份
//! - `JobStore` - 按管理器划分的作业配置
//! - `TaskStore` - 已调度的任务实例
//! - `LockStore` - 保护资源变更的协调锁
//! - `QuotaStore` - 按角色划分的资源配额
//! - `AttributeStore` - 主机属性与维护状态
//! - `DeployStore` - 部署记录
//!
//! `Storage` 是七个契约的并集，调度器的其他子系统只持有这一个句柄。
//!
//! ## 返回值约定
//!
//! 所有集合都是调用方独占的快照，之后的写入不会反映到已经返回的结果中。
//! 按键查询未命中时返回 `None` 而不是错误，唯一的例外是
//! [`DeployStore::get_deploy`]：它没有可选形式，未命中时返回
//! [`StoreError::DeployNotFound`](scheduler_errors::StoreError::DeployNotFound)。
//!
//! ## 装饰
//!
//! 装饰器直接实现全部七个契约，持有一个被包装的 `Arc<dyn Storage>`，
//! 覆盖其中一部分操作并显式转发其余操作。契约中没有默认方法，
//! 新增操作时所有装饰器都必须同步更新。
//!
//! ```rust
//! use std::sync::Arc;
//! use scheduler_domain::{SchedulerStore, Storage, StoreResult};
//!
//! async fn framework_registered(storage: Arc<dyn Storage>) -> StoreResult<bool> {
//!     Ok(storage.fetch_framework_id().await?.is_some())
//! }
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::entities::{Deploy, HostAttributes, JobConfiguration, JobKey, Lock, LockKey, ResourceAggregate};
use crate::task_query::TaskQuery;
use crate::task_set::TaskSet;
use scheduler_errors::StoreResult;

/// 调度器身份存储
#[async_trait]
pub trait SchedulerStore: Send + Sync {
    /// 获取框架ID；尚未注册时返回 `None`
    async fn fetch_framework_id(&self) -> StoreResult<Option<String>>;
}

/// 作业配置存储
#[async_trait]
pub trait JobStore: Send + Sync {
    /// 获取某个管理器拥有的全部作业配置
    ///
    /// 管理器未知时返回空列表而不是错误。返回值可以反复遍历。
    async fn fetch_jobs(&self, manager_id: &str) -> StoreResult<Vec<JobConfiguration>>;

    /// 按 (管理器ID, 作业键) 精确查询
    async fn fetch_job(
        &self,
        manager_id: &str,
        job_key: &JobKey,
    ) -> StoreResult<Option<JobConfiguration>>;

    /// 至少拥有一个作业的全部管理器ID
    async fn fetch_manager_ids(&self) -> StoreResult<HashSet<String>>;
}

/// 任务存储
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// 查询匹配条件的任务，结果按任务ID去重且无序
    async fn fetch_tasks(&self, query: &TaskQuery) -> StoreResult<TaskSet>;
}

/// 协调锁存储
#[async_trait]
pub trait LockStore: Send + Sync {
    async fn fetch_locks(&self) -> StoreResult<HashSet<Lock>>;

    async fn fetch_lock(&self, lock_key: &LockKey) -> StoreResult<Option<Lock>>;
}

/// 资源配额存储
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// 角色到配额的映射
    async fn fetch_quotas(&self) -> StoreResult<HashMap<String, ResourceAggregate>>;

    async fn fetch_quota(&self, role: &str) -> StoreResult<Option<ResourceAggregate>>;
}

/// 主机属性存储
#[async_trait]
pub trait AttributeStore: Send + Sync {
    async fn get_host_attributes(&self, host: &str) -> StoreResult<Option<HostAttributes>>;

    async fn get_all_host_attributes(&self) -> StoreResult<HashSet<HostAttributes>>;
}

/// 部署记录存储
#[async_trait]
pub trait DeployStore: Send + Sync {
    async fn get_deploys(&self) -> StoreResult<HashSet<Deploy>>;

    /// 按ID获取部署记录
    ///
    /// 与其他按键查询不同，这里没有可选形式：调用方需要事先确认记录存在，
    /// 否则返回 `StoreError::DeployNotFound`。
    async fn get_deploy(&self, deploy_id: &str) -> StoreResult<Deploy>;
}

/// 七个存储契约的并集
///
/// 任何同时实现了七个契约的类型都自动实现 `Storage`，
/// 因此可以作为 `Arc<dyn Storage>` 传递给调度器的其他子系统。
pub trait Storage:
    SchedulerStore + JobStore + TaskStore + LockStore + QuotaStore + AttributeStore + DeployStore
{
}

impl<T> Storage for T where
    T: SchedulerStore
        + JobStore
        + TaskStore
        + LockStore
        + QuotaStore
        + AttributeStore
        + DeployStore
        + ?Sized
{
}
