pub mod memory;
pub mod movies;
pub mod opinions;
pub mod postgres;
pub mod providers;
pub mod redis;

pub use memory::{MemoryCursorStore, MemoryMovieStore, MemoryOpinionStore, MemoryProviderStore};
pub use movies::{MovieStore, PgMovieStore};
pub use opinions::{OpinionStore, PgOpinionStore};
pub use postgres::{create_pool, run_migrations};
pub use providers::{PgProviderStore, ProviderStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, CursorStore, RedisCursorStore, CURSOR_TTL};
