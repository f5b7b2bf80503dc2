use std::sync::Arc;

use anyhow::{Context, Result};
use scheduler_config::AppConfig;
use scheduler_domain::Storage;
use scheduler_infrastructure::{
    CachingStore, ForwardingStore, InstrumentedStore, StorageFactory, StorageStack,
};
use tracing::info;

/// 组装完成的存储层
///
/// 持有装饰后的门面，以及缓存层、观测层的句柄（对应装饰器启用时）。
pub struct StorageLayer {
    config: AppConfig,
    stack: StorageStack,
}

impl StorageLayer {
    /// 在已组合好的转发门面之上按配置叠加装饰器
    pub fn new(config: AppConfig, base: ForwardingStore) -> Result<Self> {
        config.validate_all()?;

        let stack = StorageFactory::new(config.storage.clone())
            .with_metrics(config.observability.metrics_enabled)
            .build(Arc::new(base))
            .context("构建存储装饰链失败")?;

        info!("存储层初始化完成，装饰器: {:?}", stack.layers);

        Ok(Self { config, stack })
    }

    /// 使用同一个后端实现全部七个存储契约
    pub fn from_backend<S: Storage + 'static>(config: AppConfig, backend: Arc<S>) -> Result<Self> {
        let base = ForwardingStore::builder()
            .with_storage(backend)
            .build()
            .context("组合存储门面失败")?;
        Self::new(config, base)
    }

    /// 装饰后的存储门面
    pub fn storage(&self) -> Arc<dyn Storage> {
        self.stack.storage.clone()
    }

    pub fn caching(&self) -> Option<Arc<CachingStore>> {
        self.stack.caching.clone()
    }

    pub fn instrumented(&self) -> Option<Arc<InstrumentedStore>> {
        self.stack.instrumented.clone()
    }

    /// 已启用的装饰器，由内向外
    pub fn layers(&self) -> &[&'static str] {
        &self.stack.layers
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// 加载配置并在给定后端之上构建存储层
///
/// 配置来源与 [`AppConfig::load`] 相同：配置文件加上 `SCHEDULER_` 前缀的环境变量。
pub fn bootstrap<S: Storage + 'static>(
    config_path: Option<&str>,
    backend: Arc<S>,
) -> Result<StorageLayer> {
    let config = AppConfig::load(config_path).context("加载存储配置失败")?;
    StorageLayer::from_backend(config, backend)
}
