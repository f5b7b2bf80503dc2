//! In-process cache backend.

use async_trait::async_trait;
use scheduler_domain::StoreResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::{CacheService, CacheStats};

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// Bounded, TTL-based cache kept in process memory.
///
/// When full, inserting a new key evicts the entry closest to expiry.
pub struct InMemoryCacheService {
    state: Mutex<CacheState>,
    max_entries: usize,
}

impl InMemoryCacheService {
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheService for InMemoryCacheService {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = Instant::now();

        let live = match state.entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            _ => None,
        };

        if live.is_some() {
            state.stats.hits += 1;
        } else {
            state.entries.remove(key);
            state.stats.misses += 1;
        }
        Ok(live)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if !state.entries.contains_key(key) && state.entries.len() >= self.max_entries {
            state.entries.retain(|_, e| e.expires_at > now);

            if state.entries.len() >= self.max_entries {
                let victim = state
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(victim) = victim {
                    debug!("Evicting cache entry: {}", victim);
                    state.entries.remove(&victim);
                    state.stats.evictions += 1;
                }
            }
        }

        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_vec(),
                expires_at: now + ttl,
            },
        );
        state.stats.sets += 1;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.stats.deletes += 1;
        }
        Ok(removed)
    }

    async fn clear_prefix(&self, prefix: &str) -> StoreResult<usize> {
        let mut state = self.state.lock().await;
        let before = state.entries.len();
        state.entries.retain(|k, _| !k.starts_with(prefix));
        let removed = before - state.entries.len();
        state.stats.deletes += removed as u64;
        Ok(removed)
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let removed = state.entries.len() as u64;
        state.entries.clear();
        state.stats.deletes += removed;
        Ok(())
    }

    async fn get_stats(&self) -> CacheStats {
        self.state.lock().await.stats.clone()
    }
}
