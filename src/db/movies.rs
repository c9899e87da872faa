use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{error::AppResult, models::MovieRecord};

const MOVIE_COLUMNS: &str = "id, title, release_date, vote_average, vote_count, overview, \
     runtime, genres, poster_path, backdrop_path, tagline, original_title, original_language, \
     imdb_id, status, popularity, trailer_key, trailer_key_last_updated, watch_providers_ids, \
     watch_providers_last_updated";

/// Durable store of enriched movie records, keyed by TMDB id
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    async fn get(&self, movie_id: i64) -> AppResult<Option<MovieRecord>>;

    /// Inserts the record unless one with the same id exists, then returns the stored row
    async fn upsert(&self, record: &MovieRecord) -> AppResult<MovieRecord>;

    /// Replaces the watch-provider ids and stamps their refresh date
    async fn update_watch_providers(
        &self,
        movie_id: i64,
        provider_ids: &[i64],
        refreshed_on: NaiveDate,
    ) -> AppResult<()>;

    /// Replaces the trailer key and stamps its refresh date
    async fn update_trailer(
        &self,
        movie_id: i64,
        trailer_key: Option<&str>,
        refreshed_on: NaiveDate,
    ) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MovieStore for PgMovieStore {
    async fn get(&self, movie_id: i64) -> AppResult<Option<MovieRecord>> {
        let query = format!("SELECT {} FROM tmdb_movies WHERE id = $1", MOVIE_COLUMNS);
        let record = sqlx::query_as::<_, MovieRecord>(&query)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn upsert(&self, record: &MovieRecord) -> AppResult<MovieRecord> {
        let insert = format!(
            "INSERT INTO tmdb_movies ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             ON CONFLICT (id) DO NOTHING",
            MOVIE_COLUMNS
        );

        let result = sqlx::query(&insert)
            .bind(record.id)
            .bind(&record.title)
            .bind(&record.release_date)
            .bind(record.vote_average)
            .bind(record.vote_count)
            .bind(&record.overview)
            .bind(record.runtime)
            .bind(&record.genres)
            .bind(&record.poster_path)
            .bind(&record.backdrop_path)
            .bind(&record.tagline)
            .bind(&record.original_title)
            .bind(&record.original_language)
            .bind(&record.imdb_id)
            .bind(&record.status)
            .bind(record.popularity)
            .bind(&record.trailer_key)
            .bind(record.trailer_key_last_updated)
            .bind(&record.watch_providers_ids)
            .bind(record.watch_providers_last_updated)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!(movie_id = record.id, "Stored movie details");
        } else {
            tracing::debug!(movie_id = record.id, "Movie already stored, reusing row");
        }

        let select = format!("SELECT {} FROM tmdb_movies WHERE id = $1", MOVIE_COLUMNS);
        let stored = sqlx::query_as::<_, MovieRecord>(&select)
            .bind(record.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn update_watch_providers(
        &self,
        movie_id: i64,
        provider_ids: &[i64],
        refreshed_on: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE tmdb_movies \
             SET watch_providers_ids = $2, watch_providers_last_updated = $3 \
             WHERE id = $1",
        )
        .bind(movie_id)
        .bind(provider_ids)
        .bind(refreshed_on)
        .execute(&self.pool)
        .await?;

        tracing::debug!(movie_id = movie_id, providers = ?provider_ids, "Stored watch providers");
        Ok(())
    }

    async fn update_trailer(
        &self,
        movie_id: i64,
        trailer_key: Option<&str>,
        refreshed_on: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE tmdb_movies \
             SET trailer_key = $2, trailer_key_last_updated = $3 \
             WHERE id = $1",
        )
        .bind(movie_id)
        .bind(trailer_key)
        .bind(refreshed_on)
        .execute(&self.pool)
        .await?;

        tracing::debug!(movie_id = movie_id, trailer_key = ?trailer_key, "Stored trailer key");
        Ok(())
    }
}
