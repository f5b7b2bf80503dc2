use async_trait::async_trait;
use futures::future::try_join_all;

use crate::entities::{
    HostAttributes, JobConfiguration, JobKey, Lock, LockKey, MaintenanceMode, ResourceAggregate,
    ScheduledTask,
};
use crate::stores::Storage;
use crate::task_query::TaskQuery;
use crate::task_set::TaskSet;
use scheduler_errors::StoreResult;

/// 组合在 `Storage` 之上的常用查询
///
/// 只通过 `Storage` 的公开操作实现，不引入额外的一致性保证：
/// 跨多个存储的查询看到的是各个委托各自的快照。
#[async_trait]
pub trait StorageExt: Storage {
    /// 按ID获取单个任务
    async fn fetch_task(&self, task_id: &str) -> StoreResult<Option<ScheduledTask>> {
        let tasks = self.fetch_tasks(&TaskQuery::task_scoped([task_id])).await?;
        Ok(tasks.get(task_id).cloned())
    }

    async fn fetch_active_tasks(&self, job_key: &JobKey) -> StoreResult<TaskSet> {
        self.fetch_tasks(&TaskQuery::job_scoped(job_key).active())
            .await
    }

    /// 所有管理器下的全部作业
    async fn fetch_all_jobs(&self) -> StoreResult<Vec<(String, JobConfiguration)>> {
        let mut manager_ids: Vec<String> = self.fetch_manager_ids().await?.into_iter().collect();
        manager_ids.sort();

        let per_manager = try_join_all(manager_ids.iter().map(|id| self.fetch_jobs(id))).await?;

        Ok(manager_ids
            .into_iter()
            .zip(per_manager)
            .flat_map(|(manager_id, jobs)| {
                jobs.into_iter().map(move |job| (manager_id.clone(), job))
            })
            .collect())
    }

    /// 找到拥有该作业键的管理器（按管理器ID排序后的第一个）
    async fn find_job(&self, job_key: &JobKey) -> StoreResult<Option<(String, JobConfiguration)>> {
        let mut manager_ids: Vec<String> = self.fetch_manager_ids().await?.into_iter().collect();
        manager_ids.sort();

        for manager_id in manager_ids {
            if let Some(job) = self.fetch_job(&manager_id, job_key).await? {
                return Ok(Some((manager_id, job)));
            }
        }
        Ok(None)
    }

    async fn fetch_job_lock(&self, job_key: &JobKey) -> StoreResult<Option<Lock>> {
        self.fetch_lock(&LockKey::Job(job_key.clone())).await
    }

    async fn hosts_in_mode(&self, mode: MaintenanceMode) -> StoreResult<Vec<HostAttributes>> {
        let mut hosts: Vec<HostAttributes> = self
            .get_all_host_attributes()
            .await?
            .into_iter()
            .filter(|h| h.mode == mode)
            .collect();
        hosts.sort_by(|a, b| a.host.cmp(&b.host));
        Ok(hosts)
    }

    /// 角色下处于活跃状态的生产任务所占用的资源总和
    async fn consumed_quota(&self, role: &str) -> StoreResult<ResourceAggregate> {
        let tasks = self
            .fetch_tasks(&TaskQuery::role_scoped(role).active())
            .await?;

        Ok(tasks
            .iter()
            .filter(|t| t.assigned_task.task.production)
            .fold(ResourceAggregate::zero(), |acc, t| {
                acc.add(&ResourceAggregate::from_task(&t.assigned_task.task))
            }))
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}
