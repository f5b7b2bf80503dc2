use serde::{Deserialize, Serialize};
use std::fmt;

/// 立即提交的作业所属的管理器
pub const IMMEDIATE_MANAGER_ID: &str = "IMMEDIATE";
/// 定时（cron）作业所属的管理器
pub const CRON_MANAGER_ID: &str = "CRON";

/// 作业在管理器命名空间内的复合标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub role: String,
    pub environment: String,
    pub name: String,
}

impl JobKey {
    pub fn new(
        role: impl Into<String>,
        environment: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            environment: environment.into(),
            name: name.into(),
        }
    }

    /// 三个组成部分均非空，且只包含字母、数字、`_`、`-`、`.`
    pub fn is_valid(&self) -> bool {
        [&self.role, &self.environment, &self.name]
            .iter()
            .all(|part| is_good_identifier(part))
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.environment, self.name)
    }
}

pub(crate) fn is_good_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub role: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    Value { negated: bool, values: Vec<String> },
    Limit { limit: u32 },
}

/// 调度约束，例如 `host` 限制或 `rack` 取值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn value(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Value {
                negated: false,
                values,
            },
        }
    }

    pub fn limit(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Limit { limit },
        }
    }
}

/// 任务模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub job: JobKey,
    pub owner: Identity,
    pub is_service: bool,
    pub num_cpus: f64,
    pub ram_mb: u64,
    pub disk_mb: u64,
    pub priority: i32,
    pub max_task_failures: i32,
    pub production: bool,
    pub constraints: Vec<Constraint>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CronCollisionPolicy {
    #[default]
    KillExisting,
    CancelNew,
    RunOverlap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfiguration {
    pub key: JobKey,
    pub owner: Identity,
    pub task_config: TaskConfig,
    pub instance_count: u32,
    pub cron_schedule: Option<String>,
    pub cron_collision_policy: CronCollisionPolicy,
}

impl JobConfiguration {
    pub fn is_cron(&self) -> bool {
        self.cron_schedule.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_key_display() {
        let key = JobKey::new("www-data", "prod", "hello");
        assert_eq!(key.to_string(), "www-data/prod/hello");
    }

    #[test]
    fn test_job_key_validity() {
        assert!(JobKey::new("role", "devel", "job.v2_a-b").is_valid());
        assert!(!JobKey::new("", "devel", "job").is_valid());
        assert!(!JobKey::new("role", "devel", "has space").is_valid());
        assert!(!JobKey::new("role", "de/vel", "job").is_valid());
    }

    #[test]
    fn test_constraint_serialization_is_tagged() {
        let c = Constraint::limit("host", 1);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["kind"]["type"], "limit");
        assert_eq!(json["kind"]["limit"], 1);
    }
}
