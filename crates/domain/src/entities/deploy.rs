use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 调度器或其制品的一次部署记录
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deploy {
    pub deploy_id: String,
    pub description: String,
    pub artifact: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
