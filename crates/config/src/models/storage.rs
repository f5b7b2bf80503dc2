use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

/// 存储门面装饰器配置
///
/// 每个装饰器都可以单独关闭；全部关闭时门面就是基础转发实现本身。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub cache: CacheConfig,
    pub instrumentation: InstrumentationConfig,
    pub audit: AuditConfig,
    pub validation: ValidationConfig,
}

impl ConfigValidator for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.cache.validate()?;
        self.instrumentation.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_seconds: 30,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl ConfigValidator for CacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            ValidationUtils::validate_range(self.ttl_seconds, 1, 86_400, "storage.cache.ttl_seconds")?;
            ValidationUtils::validate_positive(self.max_entries as u64, "storage.cache.max_entries")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    pub enabled: bool,
    pub slow_threshold_ms: u64,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slow_threshold_ms: 250,
        }
    }
}

impl InstrumentationConfig {
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }
}

impl ConfigValidator for InstrumentationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            ValidationUtils::validate_positive(
                self.slow_threshold_ms,
                "storage.instrumentation.slow_threshold_ms",
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    /// 需要审计的操作名；为空表示审计全部操作
    pub operations: Vec<String>,
}

impl ConfigValidator for AuditConfig {
    fn validate(&self) -> ConfigResult<()> {
        for op in &self.operations {
            ValidationUtils::validate_not_empty(op, "storage.audit.operations[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enabled: bool,
}

/// 默认关闭：开启后空白参数会被拒绝，而不是按缺失处理
impl Default for ValidationConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}
