use std::collections::HashSet;

use sqlx::PgPool;

use crate::{error::AppResult, models::WatchProvider};

/// Durable provider name ↔ id mapping
#[async_trait::async_trait]
pub trait ProviderStore: Send + Sync {
    /// Inserts providers whose id is not stored yet; returns how many were added
    async fn insert_missing(&self, providers: &[WatchProvider]) -> AppResult<u64>;

    /// Ids of providers whose name contains any of the substrings, case-insensitively
    async fn find_ids_matching(&self, name_substrings: &[String]) -> AppResult<HashSet<i64>>;
}

/// Turns a user-supplied substring into an ILIKE pattern, escaping wildcards
pub fn contains_pattern(substring: &str) -> String {
    let escaped = substring
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct PgProviderStore {
    pool: PgPool,
}

impl PgProviderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProviderStore for PgProviderStore {
    async fn insert_missing(&self, providers: &[WatchProvider]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for provider in providers {
            let result = sqlx::query(
                "INSERT INTO watch_providers (provider_id, provider_name) VALUES ($1, $2) \
                 ON CONFLICT (provider_id) DO NOTHING",
            )
            .bind(provider.provider_id)
            .bind(&provider.provider_name)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_ids_matching(&self, name_substrings: &[String]) -> AppResult<HashSet<i64>> {
        let patterns: Vec<String> = name_substrings
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(contains_pattern)
            .collect();

        if patterns.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT provider_id FROM watch_providers WHERE provider_name ILIKE ANY($1)")
                .bind(&patterns)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }
}
