use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Opinion, UserMovie},
};

/// Read-only view of users and their recorded opinions
#[async_trait::async_trait]
pub trait OpinionStore: Send + Sync {
    async fn user_exists(&self, user_id: i64) -> AppResult<bool>;

    /// A user's interactions, newest first, optionally restricted to one opinion
    async fn user_movies(&self, user_id: i64, opinion: Option<Opinion>) -> AppResult<Vec<UserMovie>>;
}

#[derive(sqlx::FromRow)]
struct UserMovieRow {
    user_id: i64,
    movie_id: i64,
    opinion: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserMovieRow> for UserMovie {
    type Error = AppError;

    fn try_from(row: UserMovieRow) -> Result<Self, Self::Error> {
        Ok(UserMovie {
            user_id: row.user_id,
            movie_id: row.movie_id,
            opinion: Opinion::try_from(row.opinion).map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgOpinionStore {
    pool: PgPool,
}

impl PgOpinionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OpinionStore for PgOpinionStore {
    async fn user_exists(&self, user_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn user_movies(&self, user_id: i64, opinion: Option<Opinion>) -> AppResult<Vec<UserMovie>> {
        let rows = sqlx::query_as::<_, UserMovieRow>(
            "SELECT user_id, movie_id, opinion, created_at FROM user_movie \
             WHERE user_id = $1 AND ($2::SMALLINT IS NULL OR opinion = $2) \
             ORDER BY created_at DESC, movie_id DESC",
        )
        .bind(user_id)
        .bind(opinion.map(Opinion::code))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserMovie::try_from).collect()
    }
}
