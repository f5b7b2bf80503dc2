//! 调度器存储抽象层
//!
//! 把七个只读存储契约组合成一个门面，并按配置叠加缓存、审计、校验与观测装饰器。

pub mod app;
pub mod common;

pub use app::{bootstrap, StorageLayer};
pub use common::{init_logging, init_logging_from};

pub use scheduler_config as config;
pub use scheduler_domain as domain;
pub use scheduler_errors as errors;
pub use scheduler_infrastructure as infrastructure;
