pub mod cache;
pub mod cursor;

pub use cache::create_redis_client;
pub use cache::Cache;
pub use cache::CacheKey;
pub use cache::CacheWriterHandle;
pub use cursor::{CursorStore, RedisCursorStore, CURSOR_TTL};
