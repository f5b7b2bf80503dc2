use std::collections::BTreeMap;

use crate::entities::*;

pub(crate) fn task_config(job: &JobKey) -> TaskConfig {
    TaskConfig {
        job: job.clone(),
        owner: Identity {
            role: job.role.clone(),
            user: "tester".to_string(),
        },
        is_service: true,
        num_cpus: 1.0,
        ram_mb: 128,
        disk_mb: 256,
        priority: 0,
        max_task_failures: 1,
        production: false,
        constraints: Vec::new(),
        contact_email: None,
    }
}

pub(crate) fn task(task_id: &str, job: &JobKey, status: ScheduleStatus) -> ScheduledTask {
    ScheduledTask {
        assigned_task: AssignedTask {
            task_id: task_id.to_string(),
            slave_id: None,
            slave_host: None,
            task: task_config(job),
            assigned_ports: BTreeMap::new(),
            instance_id: 0,
        },
        status,
        failure_count: 0,
        task_events: Vec::new(),
        ancestor_id: None,
    }
}
