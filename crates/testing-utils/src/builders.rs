//! Test data builders for creating test entities
//!
//! Every builder starts from sensible defaults so tests only spell out the fields
//! they actually care about.

use chrono::{DateTime, Utc};
use scheduler_domain::{
    AssignedTask, Attribute, Constraint, CronCollisionPolicy, Deploy, HostAttributes, Identity,
    JobConfiguration, JobKey, Lock, LockKey, MaintenanceMode, ScheduleStatus, ScheduledTask,
    TaskConfig, TaskEvent,
};
use std::collections::BTreeMap;

/// Task template with defaults for the given job
pub fn default_task_config(job: &JobKey) -> TaskConfig {
    TaskConfig {
        job: job.clone(),
        owner: Identity {
            role: job.role.clone(),
            user: "test_user".to_string(),
        },
        is_service: true,
        num_cpus: 1.0,
        ram_mb: 1024,
        disk_mb: 2048,
        priority: 0,
        max_task_failures: 1,
        production: false,
        constraints: Vec::new(),
        contact_email: None,
    }
}

/// Builder for creating test JobConfiguration entities
pub struct JobConfigurationBuilder {
    job: JobConfiguration,
}

impl JobConfigurationBuilder {
    pub fn new(role: &str, environment: &str, name: &str) -> Self {
        let key = JobKey::new(role, environment, name);
        let task_config = default_task_config(&key);
        Self {
            job: JobConfiguration {
                owner: task_config.owner.clone(),
                key,
                task_config,
                instance_count: 1,
                cron_schedule: None,
                cron_collision_policy: CronCollisionPolicy::default(),
            },
        }
    }

    pub fn with_instance_count(mut self, instance_count: u32) -> Self {
        self.job.instance_count = instance_count;
        self
    }

    pub fn with_cron_schedule(mut self, schedule: &str) -> Self {
        self.job.cron_schedule = Some(schedule.to_string());
        self
    }

    pub fn with_collision_policy(mut self, policy: CronCollisionPolicy) -> Self {
        self.job.cron_collision_policy = policy;
        self
    }

    pub fn with_resources(mut self, num_cpus: f64, ram_mb: u64, disk_mb: u64) -> Self {
        self.job.task_config.num_cpus = num_cpus;
        self.job.task_config.ram_mb = ram_mb;
        self.job.task_config.disk_mb = disk_mb;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.job.task_config.constraints.push(constraint);
        self
    }

    pub fn production(mut self) -> Self {
        self.job.task_config.production = true;
        self
    }

    pub fn build(self) -> JobConfiguration {
        self.job
    }
}

/// Builder for creating test ScheduledTask entities
pub struct ScheduledTaskBuilder {
    task: ScheduledTask,
}

impl ScheduledTaskBuilder {
    pub fn new(task_id: &str, job: &JobKey) -> Self {
        Self {
            task: ScheduledTask {
                assigned_task: AssignedTask {
                    task_id: task_id.to_string(),
                    slave_id: None,
                    slave_host: None,
                    task: default_task_config(job),
                    assigned_ports: BTreeMap::new(),
                    instance_id: 0,
                },
                status: ScheduleStatus::Pending,
                failure_count: 0,
                task_events: Vec::new(),
                ancestor_id: None,
            },
        }
    }

    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.task.status = status;
        self.task.task_events.push(TaskEvent {
            timestamp: Utc::now(),
            status,
            message: None,
            scheduler: Some("test-scheduler".to_string()),
        });
        self
    }

    pub fn with_instance_id(mut self, instance_id: u32) -> Self {
        self.task.assigned_task.instance_id = instance_id;
        self
    }

    pub fn on_host(mut self, host: &str) -> Self {
        self.task.assigned_task.slave_host = Some(host.to_string());
        self.task.assigned_task.slave_id = Some(format!("{host}-slave"));
        self
    }

    pub fn with_port(mut self, name: &str, port: u16) -> Self {
        self.task
            .assigned_task
            .assigned_ports
            .insert(name.to_string(), port);
        self
    }

    pub fn with_resources(mut self, num_cpus: f64, ram_mb: u64, disk_mb: u64) -> Self {
        let config = &mut self.task.assigned_task.task;
        config.num_cpus = num_cpus;
        config.ram_mb = ram_mb;
        config.disk_mb = disk_mb;
        self
    }

    pub fn production(mut self) -> Self {
        self.task.assigned_task.task.production = true;
        self
    }

    pub fn with_failure_count(mut self, failure_count: u32) -> Self {
        self.task.failure_count = failure_count;
        self
    }

    pub fn with_ancestor(mut self, ancestor_id: &str) -> Self {
        self.task.ancestor_id = Some(ancestor_id.to_string());
        self
    }

    pub fn running(self) -> Self {
        self.with_status(ScheduleStatus::Running)
    }

    pub fn finished(self) -> Self {
        self.with_status(ScheduleStatus::Finished)
    }

    pub fn build(self) -> ScheduledTask {
        self.task
    }
}

/// Builder for creating test Lock entities
pub struct LockBuilder {
    lock: Lock,
}

impl LockBuilder {
    pub fn for_job(job: &JobKey) -> Self {
        Self {
            lock: Lock::new(LockKey::Job(job.clone()), "test_user"),
        }
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.lock.user = user.to_string();
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.lock.token = token.to_string();
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.lock.message = Some(message.to_string());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.lock.timestamp = timestamp;
        self
    }

    pub fn build(self) -> Lock {
        self.lock
    }
}

/// Builder for creating test HostAttributes entities
pub struct HostAttributesBuilder {
    host: HostAttributes,
}

impl HostAttributesBuilder {
    pub fn new(host: &str) -> Self {
        Self {
            host: HostAttributes {
                host: host.to_string(),
                attributes: Vec::new(),
                mode: MaintenanceMode::None,
                slave_id: Some(format!("{host}-slave")),
            },
        }
    }

    pub fn with_attribute(mut self, name: &str, values: &[&str]) -> Self {
        self.host
            .attributes
            .push(Attribute::new(name, values.iter().copied()));
        self
    }

    pub fn with_mode(mut self, mode: MaintenanceMode) -> Self {
        self.host.mode = mode;
        self
    }

    pub fn draining(self) -> Self {
        self.with_mode(MaintenanceMode::Draining)
    }

    pub fn build(self) -> HostAttributes {
        self.host
    }
}

/// Builder for creating test Deploy entities
pub struct DeployBuilder {
    deploy: Deploy,
}

impl DeployBuilder {
    pub fn new(deploy_id: &str) -> Self {
        Self {
            deploy: Deploy {
                deploy_id: deploy_id.to_string(),
                description: format!("deploy {deploy_id}"),
                artifact: "scheduler-1.0.0.tar.gz".to_string(),
                created_by: "test_user".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_artifact(mut self, artifact: &str) -> Self {
        self.deploy.artifact = artifact.to_string();
        self
    }

    pub fn with_created_by(mut self, user: &str) -> Self {
        self.deploy.created_by = user.to_string();
        self
    }

    pub fn build(self) -> Deploy {
        self.deploy
    }
}
