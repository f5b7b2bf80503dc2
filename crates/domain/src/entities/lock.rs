use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::job::JobKey;

/// 锁所保护的资源
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockKey {
    Job(JobKey),
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockKey::Job(key) => write!(f, "job:{key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lock {
    pub key: LockKey,
    pub token: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
}

impl Lock {
    /// 以随机令牌和当前时间创建锁记录
    pub fn new(key: LockKey, user: impl Into<String>) -> Self {
        Self {
            key,
            token: Uuid::new_v4().to_string(),
            user: user.into(),
            timestamp: Utc::now(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
