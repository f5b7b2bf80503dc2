//! 存储门面的组合与装饰
//!
//! - `ForwardingStore` - 把七个存储契约组合成一个门面的基础转发实现
//! - `CachingStore` - 对变化缓慢的数据做读穿透缓存
//! - `InstrumentedStore` - 追踪、指标与慢调用告警
//! - `AuditingStore` - 读取审计
//! - `ValidatingStore` - 参数校验
//! - `StorageFactory` - 按配置叠加装饰器

pub mod audit;
pub mod cache;
pub mod factory;
pub mod forwarding;
pub mod observability;
pub mod validation;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, AuditingStore, MemoryAuditSink, TracingAuditSink};
pub use cache::{CacheService, CacheServiceExt, CacheStats, CachingStore, InMemoryCacheService};
pub use factory::{StorageFactory, StorageStack};
pub use forwarding::{ForwardingStore, ForwardingStoreBuilder};
pub use observability::{InstrumentedStore, OperationStats};
pub use validation::ValidatingStore;
