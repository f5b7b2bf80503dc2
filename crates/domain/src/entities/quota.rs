use serde::{Deserialize, Serialize};

use super::job::TaskConfig;

/// 某个角色的资源配额（CPU、内存、磁盘）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceAggregate {
    pub num_cpus: f64,
    pub ram_mb: u64,
    pub disk_mb: u64,
}

impl ResourceAggregate {
    pub fn new(num_cpus: f64, ram_mb: u64, disk_mb: u64) -> Self {
        Self {
            num_cpus,
            ram_mb,
            disk_mb,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_task(task: &TaskConfig) -> Self {
        Self::new(task.num_cpus, task.ram_mb, task.disk_mb)
    }

    pub fn add(&self, other: &ResourceAggregate) -> Self {
        Self {
            num_cpus: self.num_cpus + other.num_cpus,
            ram_mb: self.ram_mb + other.ram_mb,
            disk_mb: self.disk_mb + other.disk_mb,
        }
    }

    pub fn fits_within(&self, limit: &ResourceAggregate) -> bool {
        self.num_cpus <= limit.num_cpus
            && self.ram_mb <= limit.ram_mb
            && self.disk_mb <= limit.disk_mb
    }
}
