use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page_size_or_default, AppState};
use crate::{
    error::{AppError, AppResult},
    models::{Opinion, UserMoviesPage},
};

#[derive(Debug, Deserialize)]
pub struct UserMoviesParams {
    /// Opinion code (`1`..`4`) or name (`loved_it`)
    opinion: Option<String>,
    locale: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

/// Handler for the movies a user has rated, newest first
pub async fn list_user_movies(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<UserMoviesParams>,
) -> AppResult<Json<UserMoviesPage>> {
    let opinion = params
        .opinion
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(str::parse::<Opinion>)
        .transpose()
        .map_err(AppError::InvalidInput)?;
    let page_size = page_size_or_default(params.page_size)?;
    let locale = state.locale(params.locale);

    let page = state
        .recommender
        .list_user_movies(
            user_id,
            opinion,
            params.page.unwrap_or(1),
            page_size,
            &locale,
        )
        .await?;
    Ok(Json(page))
}
