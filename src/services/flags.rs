use std::sync::Arc;

use crate::db::{CacheKey, StatusCache};

/// Status cache access where cache failures degrade to a miss
///
/// Existence flags are an optimization only. A broken cache is logged and the
/// caller falls back to the document store.
#[derive(Clone)]
pub struct StatusFlags {
    cache: Arc<dyn StatusCache>,
}

impl StatusFlags {
    pub fn new(cache: Arc<dyn StatusCache>) -> Self {
        Self { cache }
    }

    pub async fn lookup(&self, key: &CacheKey) -> Option<bool> {
        match self.cache.get(key).await {
            Ok(flag) => flag,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Status cache read failed");
                None
            }
        }
    }

    pub async fn remember(&self, key: &CacheKey, value: bool) {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!(key = %key, error = %e, "Status cache write failed");
        }
    }

    pub async fn forget(&self, key: &CacheKey) {
        if let Err(e) = self.cache.invalidate(key).await {
            tracing::warn!(key = %key, error = %e, "Status cache invalidation failed");
        }
    }
}
