pub mod cache;
pub mod document;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use cache::{MemoryStatusCache, StatusCache};
pub use document::{Collection, Document, DocumentStore, Filter, OrderBy};
pub use memory::MemoryDocumentStore;
pub use postgres::{create_pool, PgDocumentStore};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use redis::CacheWriterHandle;
pub use redis::RedisStatusCache;
