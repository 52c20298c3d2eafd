use super::cache::{Cache, CacheKey};
use crate::db::StatusCache;
use crate::error::AppResult;

/// Status cache shared across server instances through Redis
#[derive(Clone)]
pub struct RedisStatusCache {
    cache: Cache,
    ttl: u64,
}

impl RedisStatusCache {
    pub fn new(cache: Cache, ttl: u64) -> Self {
        Self { cache, ttl }
    }
}

#[async_trait::async_trait]
impl StatusCache for RedisStatusCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<bool>> {
        self.cache.get_from_cache::<bool>(key).await
    }

    async fn set(&self, key: &CacheKey, value: bool) -> AppResult<()> {
        self.cache.set(key, &value, self.ttl).await
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.cache.invalidate(key).await
    }
}
