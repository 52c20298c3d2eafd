use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::redis::CacheKey;
use crate::clock::Clock;
use crate::error::AppResult;

/// Cache of boolean existence flags for favorites and watchlist entries
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatusCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<bool>>;

    async fn set(&self, key: &CacheKey, value: bool) -> AppResult<()>;

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;
}

struct CachedFlag {
    value: bool,
    stored_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryCacheInner {
    entries: HashMap<String, CachedFlag>,
    /// Keys in first-insertion order, oldest at the front
    order: VecDeque<String>,
}

impl MemoryCacheInner {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }
}

/// In-process status cache with a size bound and a time-to-live
pub struct MemoryStatusCache {
    inner: Mutex<MemoryCacheInner>,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryStatusCache {
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(MemoryCacheInner::default()),
            capacity: capacity.max(1),
            ttl,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCacheInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl StatusCache for MemoryStatusCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<bool>> {
        let key = key.to_string();
        let now = self.clock.now();
        let mut inner = self.lock();

        let cached = inner
            .entries
            .get(&key)
            .map(|flag| (flag.value, now - flag.stored_at >= self.ttl));

        match cached {
            Some((_, true)) => {
                inner.remove(&key);
                Ok(None)
            }
            Some((value, false)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, value: bool) -> AppResult<()> {
        let key = key.to_string();
        let stored_at = self.clock.now();
        let mut inner = self.lock();

        if let Some(flag) = inner.entries.get_mut(&key) {
            flag.value = value;
            flag.stored_at = stored_at;
            return Ok(());
        }

        while inner.entries.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, CachedFlag { value, stored_at });
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.lock().remove(&key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn fav(media_id: u64) -> CacheKey {
        CacheKey::Favorite {
            user_id: "u1".to_string(),
            media_id,
        }
    }

    fn cache_with(capacity: usize, clock: Arc<ManualClock>) -> MemoryStatusCache {
        MemoryStatusCache::new(capacity, Duration::minutes(10), clock)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = cache_with(10, Arc::new(ManualClock::new()));

        cache.set(&fav(1), true).await.unwrap();
        cache.set(&fav(2), false).await.unwrap();

        assert_eq!(cache.get(&fav(1)).await.unwrap(), Some(true));
        assert_eq!(cache.get(&fav(2)).await.unwrap(), Some(false));
        assert_eq!(cache.get(&fav(3)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(10, clock.clone());

        cache.set(&fav(1), true).await.unwrap();
        clock.advance(Duration::minutes(9));
        assert_eq!(cache.get(&fav(1)).await.unwrap(), Some(true));

        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get(&fav(1)).await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_first() {
        let cache = cache_with(2, Arc::new(ManualClock::new()));

        cache.set(&fav(1), true).await.unwrap();
        cache.set(&fav(2), true).await.unwrap();
        cache.set(&fav(3), true).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&fav(1)).await.unwrap(), None);
        assert_eq!(cache.get(&fav(2)).await.unwrap(), Some(true));
        assert_eq!(cache.get(&fav(3)).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = cache_with(2, Arc::new(ManualClock::new()));

        cache.set(&fav(1), true).await.unwrap();
        cache.invalidate(&fav(1)).await.unwrap();

        assert_eq!(cache.get(&fav(1)).await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_grow_cache() {
        let cache = cache_with(2, Arc::new(ManualClock::new()));

        cache.set(&fav(1), true).await.unwrap();
        cache.set(&fav(1), false).await.unwrap();
        cache.set(&fav(2), true).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&fav(1)).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_favorite_and_watchlist_keys_do_not_collide() {
        let cache = cache_with(10, Arc::new(ManualClock::new()));
        let watchlist = CacheKey::Watchlist {
            user_id: "u1".to_string(),
            media_id: 1,
        };

        cache.set(&fav(1), true).await.unwrap();

        assert_eq!(cache.get(&watchlist).await.unwrap(), None);
    }
}
