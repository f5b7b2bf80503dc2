pub mod app_config;
pub mod observability;
pub mod storage;

pub use app_config::AppConfig;
pub use observability::{LogFormat, ObservabilityConfig};
pub use storage::{AuditConfig, CacheConfig, InstrumentationConfig, StorageConfig, ValidationConfig};
