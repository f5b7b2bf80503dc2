use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::job::{JobKey, TaskConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Init,
    Throttled,
    Pending,
    Assigned,
    Starting,
    Running,
    Finished,
    Preempting,
    Restarting,
    Draining,
    Failed,
    Killed,
    Killing,
    Lost,
}

impl ScheduleStatus {
    pub const TERMINAL_STATES: [ScheduleStatus; 4] = [
        ScheduleStatus::Finished,
        ScheduleStatus::Failed,
        ScheduleStatus::Killed,
        ScheduleStatus::Lost,
    ];

    pub const ACTIVE_STATES: [ScheduleStatus; 10] = [
        ScheduleStatus::Init,
        ScheduleStatus::Throttled,
        ScheduleStatus::Pending,
        ScheduleStatus::Assigned,
        ScheduleStatus::Starting,
        ScheduleStatus::Running,
        ScheduleStatus::Preempting,
        ScheduleStatus::Restarting,
        ScheduleStatus::Draining,
        ScheduleStatus::Killing,
    ];

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL_STATES.contains(self)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleStatus::Init => "INIT",
            ScheduleStatus::Throttled => "THROTTLED",
            ScheduleStatus::Pending => "PENDING",
            ScheduleStatus::Assigned => "ASSIGNED",
            ScheduleStatus::Starting => "STARTING",
            ScheduleStatus::Running => "RUNNING",
            ScheduleStatus::Finished => "FINISHED",
            ScheduleStatus::Preempting => "PREEMPTING",
            ScheduleStatus::Restarting => "RESTARTING",
            ScheduleStatus::Draining => "DRAINING",
            ScheduleStatus::Failed => "FAILED",
            ScheduleStatus::Killed => "KILLED",
            ScheduleStatus::Killing => "KILLING",
            ScheduleStatus::Lost => "LOST",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub timestamp: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub message: Option<String>,
    pub scheduler: Option<String>,
}

/// 已分配到（或等待分配到）某个 slave 的任务实例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub task_id: String,
    pub slave_id: Option<String>,
    pub slave_host: Option<String>,
    pub task: TaskConfig,
    pub assigned_ports: BTreeMap<String, u16>,
    pub instance_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub assigned_task: AssignedTask,
    pub status: ScheduleStatus,
    pub failure_count: u32,
    pub task_events: Vec<TaskEvent>,
    pub ancestor_id: Option<String>,
}

impl ScheduledTask {
    /// 任务身份，在同一个结果集中唯一
    pub fn task_id(&self) -> &str {
        &self.assigned_task.task_id
    }

    pub fn job_key(&self) -> &JobKey {
        &self.assigned_task.task.job
    }

    pub fn instance_id(&self) -> u32 {
        self.assigned_task.instance_id
    }

    pub fn slave_host(&self) -> Option<&str> {
        self.assigned_task.slave_host.as_deref()
    }

    pub fn latest_event(&self) -> Option<&TaskEvent> {
        self.task_events.iter().max_by_key(|e| e.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_and_terminal_states_partition() {
        for status in ScheduleStatus::ACTIVE_STATES {
            assert!(status.is_active());
            assert!(!ScheduleStatus::TERMINAL_STATES.contains(&status));
        }
        for status in ScheduleStatus::TERMINAL_STATES {
            assert!(status.is_terminal());
        }
        assert_eq!(
            ScheduleStatus::ACTIVE_STATES.len() + ScheduleStatus::TERMINAL_STATES.len(),
            14
        );
    }

    #[test]
    fn test_status_display_matches_serde() {
        let json = serde_json::to_string(&ScheduleStatus::Preempting).unwrap();
        assert_eq!(json, format!("\"{}\"", ScheduleStatus::Preempting));
    }
}
