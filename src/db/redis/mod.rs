pub mod cache;
pub mod status_cache;

mod macros;

pub use cache::create_redis_client;
pub use cache::Cache;
pub use cache::CacheKey;
pub use cache::CacheWriterHandle;
pub use status_cache::RedisStatusCache;
