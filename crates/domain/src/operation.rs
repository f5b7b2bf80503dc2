use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 门面上的每一个读取操作
///
/// 装饰器用它作为指标标签、审计记录和调用计数的键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    FetchFrameworkId,
    FetchJobs,
    FetchJob,
    FetchManagerIds,
    FetchTasks,
    FetchLocks,
    FetchLock,
    FetchQuotas,
    FetchQuota,
    GetHostAttributes,
    GetAllHostAttributes,
    GetDeploys,
    GetDeploy,
}

impl StoreOperation {
    pub const ALL: [StoreOperation; 13] = [
        StoreOperation::FetchFrameworkId,
        StoreOperation::FetchJobs,
        StoreOperation::FetchJob,
        StoreOperation::FetchManagerIds,
        StoreOperation::FetchTasks,
        StoreOperation::FetchLocks,
        StoreOperation::FetchLock,
        StoreOperation::FetchQuotas,
        StoreOperation::FetchQuota,
        StoreOperation::GetHostAttributes,
        StoreOperation::GetAllHostAttributes,
        StoreOperation::GetDeploys,
        StoreOperation::GetDeploy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::FetchFrameworkId => "fetch_framework_id",
            StoreOperation::FetchJobs => "fetch_jobs",
            StoreOperation::FetchJob => "fetch_job",
            StoreOperation::FetchManagerIds => "fetch_manager_ids",
            StoreOperation::FetchTasks => "fetch_tasks",
            StoreOperation::FetchLocks => "fetch_locks",
            StoreOperation::FetchLock => "fetch_lock",
            StoreOperation::FetchQuotas => "fetch_quotas",
            StoreOperation::FetchQuota => "fetch_quota",
            StoreOperation::GetHostAttributes => "get_host_attributes",
            StoreOperation::GetAllHostAttributes => "get_all_host_attributes",
            StoreOperation::GetDeploys => "get_deploys",
            StoreOperation::GetDeploy => "get_deploy",
        }
    }

    /// 拥有该操作的存储契约名称
    pub fn store(&self) -> &'static str {
        match self {
            StoreOperation::FetchFrameworkId => "SchedulerStore",
            StoreOperation::FetchJobs
            | StoreOperation::FetchJob
            | StoreOperation::FetchManagerIds => "JobStore",
            StoreOperation::FetchTasks => "TaskStore",
            StoreOperation::FetchLocks | StoreOperation::FetchLock => "LockStore",
            StoreOperation::FetchQuotas | StoreOperation::FetchQuota => "QuotaStore",
            StoreOperation::GetHostAttributes | StoreOperation::GetAllHostAttributes => {
                "AttributeStore"
            }
            StoreOperation::GetDeploys | StoreOperation::GetDeploy => "DeployStore",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreOperation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("Unknown store operation: {s}"))
    }
}
