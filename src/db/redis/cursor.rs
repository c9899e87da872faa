use std::time::Duration;

use super::{Cache, CacheKey};
use crate::error::AppResult;

/// How long a discovery cursor survives without being touched
pub const CURSOR_TTL: Duration = Duration::from_secs(86_400);

/// Per-user discovery page progress
#[async_trait::async_trait]
pub trait CursorStore: Send + Sync {
    /// Stored page, or 1 when absent or expired
    async fn get_page(&self, user_id: i64) -> AppResult<u32>;

    async fn set_page(&self, user_id: i64, page: u32, ttl: Duration) -> AppResult<()>;
}

/// Cursor store backed by expiring Redis keys
#[derive(Clone)]
pub struct RedisCursorStore {
    cache: Cache,
}

impl RedisCursorStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl CursorStore for RedisCursorStore {
    async fn get_page(&self, user_id: i64) -> AppResult<u32> {
        let page: Option<u32> = self
            .cache
            .get_from_cache(&CacheKey::DiscoverCursor(user_id))
            .await?;
        Ok(page.filter(|p| *p >= 1).unwrap_or(1))
    }

    async fn set_page(&self, user_id: i64, page: u32, ttl: Duration) -> AppResult<()> {
        // Read-then-write is not atomic across concurrent requests of one user.
        self.cache.set_in_background(
            &CacheKey::DiscoverCursor(user_id),
            &page.max(1),
            ttl.as_secs().max(1),
        );
        tracing::debug!(user_id = user_id, page = page, "Discovery cursor saved");
        Ok(())
    }
}
