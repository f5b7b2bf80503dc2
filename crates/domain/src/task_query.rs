use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entities::{JobKey, ScheduleStatus, ScheduledTask};

/// 可组合的任务查询条件
///
/// 每个被设置的过滤条件之间是"与"关系；未设置的条件不参与匹配。
/// 被设置为空集合的条件不匹配任何任务。
///
/// ```rust
/// use scheduler_domain::{JobKey, TaskQuery};
///
/// let key = JobKey::new("www-data", "prod", "hello");
/// let query = TaskQuery::job_scoped(&key).active();
/// assert!(query.is_single_job_scoped());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskQuery {
    pub role: Option<String>,
    pub environment: Option<String>,
    pub job_name: Option<String>,
    pub task_ids: Option<BTreeSet<String>>,
    pub statuses: Option<BTreeSet<ScheduleStatus>>,
    pub instance_ids: Option<BTreeSet<u32>>,
    pub slave_hosts: Option<BTreeSet<String>>,
}

impl TaskQuery {
    /// 不带任何过滤条件，匹配所有任务
    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn role_scoped(role: impl Into<String>) -> Self {
        Self::unscoped().by_role(role)
    }

    pub fn env_scoped(role: impl Into<String>, environment: impl Into<String>) -> Self {
        Self::unscoped().by_role(role).by_environment(environment)
    }

    pub fn job_scoped(job: &JobKey) -> Self {
        Self::unscoped().by_job(job)
    }

    pub fn task_scoped<I, S>(task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::unscoped().by_task_ids(task_ids)
    }

    pub fn instance_scoped<I>(job: &JobKey, instances: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self::job_scoped(job).by_instances(instances)
    }

    pub fn slave_scoped(host: impl Into<String>) -> Self {
        Self::unscoped().by_slave(host)
    }

    pub fn status_scoped<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ScheduleStatus>,
    {
        Self::unscoped().by_status(statuses)
    }

    pub fn by_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn by_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn by_job(mut self, job: &JobKey) -> Self {
        self.role = Some(job.role.clone());
        self.environment = Some(job.environment.clone());
        self.job_name = Some(job.name.clone());
        self
    }

    pub fn by_task_ids<I, S>(mut self, task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.task_ids = Some(task_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn by_status<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = ScheduleStatus>,
    {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn by_instances<I>(mut self, instances: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.instance_ids = Some(instances.into_iter().collect());
        self
    }

    pub fn by_slave(mut self, host: impl Into<String>) -> Self {
        self.slave_hosts
            .get_or_insert_with(BTreeSet::new)
            .insert(host.into());
        self
    }

    pub fn active(self) -> Self {
        self.by_status(ScheduleStatus::ACTIVE_STATES)
    }

    pub fn terminal(self) -> Self {
        self.by_status(ScheduleStatus::TERMINAL_STATES)
    }

    /// 查询是否恰好指向一个作业
    pub fn is_single_job_scoped(&self) -> bool {
        self.role.is_some() && self.environment.is_some() && self.job_name.is_some()
    }

    pub fn job_key(&self) -> Option<JobKey> {
        match (&self.role, &self.environment, &self.job_name) {
            (Some(role), Some(env), Some(name)) => Some(JobKey::new(role, env, name)),
            _ => None,
        }
    }

    pub fn matches(&self, task: &ScheduledTask) -> bool {
        let job = task.job_key();

        if self.role.as_ref().is_some_and(|r| *r != job.role) {
            return false;
        }
        if self
            .environment
            .as_ref()
            .is_some_and(|e| *e != job.environment)
        {
            return false;
        }
        if self.job_name.as_ref().is_some_and(|n| *n != job.name) {
            return false;
        }
        if let Some(ids) = &self.task_ids {
            if !ids.contains(task.task_id()) {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&task.status) {
                return false;
            }
        }
        if let Some(instances) = &self.instance_ids {
            if !instances.contains(&task.instance_id()) {
                return false;
            }
        }
        if let Some(hosts) = &self.slave_hosts {
            match task.slave_host() {
                Some(host) if hosts.contains(host) => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::task;

    #[test]
    fn test_unscoped_matches_everything() {
        let t = task("t1", &JobKey::new("r", "e", "j"), ScheduleStatus::Running);
        assert!(TaskQuery::unscoped().matches(&t));
    }

    #[test]
    fn test_job_scoped() {
        let key = JobKey::new("r", "e", "j");
        let other = JobKey::new("r", "e", "k");
        let query = TaskQuery::job_scoped(&key);

        assert!(query.matches(&task("t1", &key, ScheduleStatus::Pending)));
        assert!(!query.matches(&task("t2", &other, ScheduleStatus::Pending)));
        assert_eq!(query.job_key(), Some(key));
    }

    #[test]
    fn test_role_scoped_is_not_single_job() {
        let query = TaskQuery::role_scoped("r");
        assert!(!query.is_single_job_scoped());
        assert_eq!(query.job_key(), None);
    }

    #[test]
    fn test_composed_filters_are_conjunctive() {
        let key = JobKey::new("r", "e", "j");
        let query = TaskQuery::job_scoped(&key)
            .active()
            .by_task_ids(["t1", "t2"]);

        assert!(query.matches(&task("t1", &key, ScheduleStatus::Running)));
        assert!(!query.matches(&task("t1", &key, ScheduleStatus::Finished)));
        assert!(!query.matches(&task("t3", &key, ScheduleStatus::Running)));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let key = JobKey::new("r", "e", "j");
        let query = TaskQuery::task_scoped(Vec::<String>::new());
        assert!(!query.matches(&task("t1", &key, ScheduleStatus::Running)));

        let query = TaskQuery::status_scoped(Vec::<ScheduleStatus>::new());
        assert!(!query.matches(&task("t1", &key, ScheduleStatus::Running)));
    }

    #[test]
    fn test_instance_and_slave_scoping() {
        let key = JobKey::new("r", "e", "j");
        let mut t = task("t1", &key, ScheduleStatus::Running);
        t.assigned_task.instance_id = 3;
        t.assigned_task.slave_host = Some("host-a".to_string());

        assert!(TaskQuery::instance_scoped(&key, [1, 3]).matches(&t));
        assert!(!TaskQuery::instance_scoped(&key, [0]).matches(&t));
        assert!(TaskQuery::slave_scoped("host-a").matches(&t));
        assert!(!TaskQuery::slave_scoped("host-b").matches(&t));

        t.assigned_task.slave_host = None;
        assert!(!TaskQuery::slave_scoped("host-a").matches(&t));
    }

    #[test]
    fn test_by_slave_accumulates_hosts() {
        let query = TaskQuery::slave_scoped("a").by_slave("b");
        let hosts = query.slave_hosts.unwrap();
        assert_eq!(hosts.len(), 2);
    }
}
