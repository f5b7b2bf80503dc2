use std::collections::hash_map::Values;
use std::collections::HashMap;
use std::iter::FromIterator;
use std::sync::Arc;

use crate::entities::ScheduledTask;

/// 不可变、按任务ID去重的任务集合
///
/// 内部共享同一份快照，克隆成本只有一次引用计数。集合本身无序，
/// 两个集合相等当且仅当它们包含相同的任务，与构造时的顺序无关。
/// 从迭代器构造时若出现重复的任务ID，保留最后出现的那一个。
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Arc<HashMap<String, ScheduledTask>>,
}

impl TaskSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }

    pub fn get(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.tasks.get(task_id)
    }

    pub fn iter(&self) -> Values<'_, String, ScheduledTask> {
        self.tasks.values()
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// 按任务ID排序的副本，便于稳定输出
    pub fn to_sorted_vec(&self) -> Vec<ScheduledTask> {
        let mut tasks: Vec<ScheduledTask> = self.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.task_id().cmp(b.task_id()));
        tasks
    }
}

impl FromIterator<ScheduledTask> for TaskSet {
    fn from_iter<I: IntoIterator<Item = ScheduledTask>>(iter: I) -> Self {
        let tasks = iter
            .into_iter()
            .map(|task| (task.task_id().to_string(), task))
            .collect();
        Self {
            tasks: Arc::new(tasks),
        }
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a ScheduledTask;
    type IntoIter = Values<'a, String, ScheduledTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for TaskSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tasks, &other.tasks) || self.tasks == other.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{JobKey, ScheduleStatus};
    use crate::test_fixtures::task;

    #[test]
    fn test_duplicate_ids_collapse_to_last() {
        let key = JobKey::new("r", "e", "j");
        let set: TaskSet = vec![
            task("t1", &key, ScheduleStatus::Pending),
            task("t2", &key, ScheduleStatus::Pending),
            task("t1", &key, ScheduleStatus::Running),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("t1").unwrap().status, ScheduleStatus::Running);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let key = JobKey::new("r", "e", "j");
        let a = task("a", &key, ScheduleStatus::Running);
        let b = task("b", &key, ScheduleStatus::Running);

        let forward: TaskSet = vec![a.clone(), b.clone()].into_iter().collect();
        let backward: TaskSet = vec![b, a].into_iter().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_clone_shares_snapshot() {
        let key = JobKey::new("r", "e", "j");
        let set: TaskSet = std::iter::once(task("t1", &key, ScheduleStatus::Running)).collect();
        let copy = set.clone();
        assert_eq!(set, copy);
        assert!(copy.contains("t1"));
        assert!(!copy.contains("t2"));
    }

    #[test]
    fn test_sorted_vec_is_stable() {
        let key = JobKey::new("r", "e", "j");
        let set: TaskSet = ["c", "a", "b"]
            .iter()
            .map(|id| task(id, &key, ScheduleStatus::Pending))
            .collect();
        let ids: Vec<String> = set
            .to_sorted_vec()
            .into_iter()
            .map(|t| t.assigned_task.task_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(TaskSet::empty().is_empty());
    }
}
