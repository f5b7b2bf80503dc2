//! Storage factory for stacking the configured decorators over a base storage

use scheduler_config::{ConfigError, ConfigResult, ConfigValidator, StorageConfig};
use scheduler_domain::{Storage, StoreOperation};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::audit::{AuditSink, AuditingStore, TracingAuditSink};
use crate::cache::{CacheService, CachingStore, InMemoryCacheService};
use crate::observability::InstrumentedStore;
use crate::validation::ValidatingStore;

/// The decorated facade plus handles to the layers that expose their own state.
#[derive(Clone)]
pub struct StorageStack {
    pub storage: Arc<dyn Storage>,
    pub caching: Option<Arc<CachingStore>>,
    pub instrumented: Option<Arc<InstrumentedStore>>,
    /// Decorators applied, innermost first
    pub layers: Vec<&'static str>,
}

/// Storage factory
///
/// Decorators are applied innermost first: validation, caching, auditing,
/// instrumentation. Disabled decorators are skipped; with everything disabled the
/// base storage is returned as is.
pub struct StorageFactory {
    config: StorageConfig,
    metrics_enabled: bool,
    cache_service: Option<Arc<dyn CacheService>>,
    audit_sink: Arc<dyn AuditSink>,
}

impl StorageFactory {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            metrics_enabled: true,
            cache_service: None,
            audit_sink: Arc::new(TracingAuditSink),
        }
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Use a shared cache backend instead of a private in-memory one.
    pub fn with_cache_service(mut self, cache_service: Arc<dyn CacheService>) -> Self {
        self.cache_service = Some(cache_service);
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = sink;
        self
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Operations selected for auditing; all of them when none are configured.
    pub fn audited_operations(&self) -> ConfigResult<BTreeSet<StoreOperation>> {
        if self.config.audit.operations.is_empty() {
            return Ok(StoreOperation::ALL.into_iter().collect());
        }

        self.config
            .audit
            .operations
            .iter()
            .map(|name| {
                name.parse::<StoreOperation>()
                    .map_err(|e| ConfigError::Validation(format!("storage.audit.operations: {e}")))
            })
            .collect()
    }

    pub fn build(&self, base: Arc<dyn Storage>) -> ConfigResult<StorageStack> {
        self.config.validate()?;
        let audited = self.audited_operations()?;

        let mut storage = base;
        let mut layers = Vec::new();
        let mut caching = None;
        let mut instrumented = None;

        if self.config.validation.enabled {
            storage = Arc::new(ValidatingStore::new(storage));
            layers.push("validation");
        }

        if self.config.cache.enabled {
            let cache = self.cache_service.clone().unwrap_or_else(|| {
                Arc::new(InMemoryCacheService::new(self.config.cache.max_entries))
                    as Arc<dyn CacheService>
            });
            let store = Arc::new(CachingStore::new(storage, cache, self.config.cache.ttl()));
            storage = store.clone();
            caching = Some(store);
            layers.push("caching");
        }

        if self.config.audit.enabled {
            storage = Arc::new(
                AuditingStore::new(storage, self.audit_sink.clone()).with_operations(audited),
            );
            layers.push("audit");
        }

        if self.config.instrumentation.enabled {
            let mut store =
                InstrumentedStore::new(storage, self.config.instrumentation.slow_threshold());
            if !self.metrics_enabled {
                store = store.without_metrics();
            }
            let store = Arc::new(store);
            storage = store.clone();
            instrumented = Some(store);
            layers.push("instrumentation");
        }

        info!("Storage facade built with layers: {:?}", layers);

        Ok(StorageStack {
            storage,
            caching,
            instrumented,
            layers,
        })
    }
}
