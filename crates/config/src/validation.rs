use crate::{ConfigError, ConfigResult};

pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

pub struct ValidationUtils;

impl ValidationUtils {
    /// 验证字符串非空
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// 验证取值为正
    pub fn validate_positive(value: u64, field_name: &str) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        Ok(())
    }

    /// 验证取值落在闭区间内
    pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
        if value < min || value > max {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be between {min} and {max}, got {value}"
            )));
        }
        Ok(())
    }

    /// 验证取值属于给定集合
    pub fn validate_one_of(value: &str, allowed: &[&str], field_name: &str) -> ConfigResult<()> {
        if !allowed.contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be one of {allowed:?}, got {value}"
            )));
        }
        Ok(())
    }
}
