use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{page_size_or_default, AppState};
use crate::{
    error::{AppError, AppResult},
    models::EnrichedMovie,
};

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    user_id: Option<i64>,
    /// Comma-separated platform names, e.g. `Netflix,Disney`
    platforms: Option<String>,
    locale: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

/// Splits a comma-separated platform list, dropping blank entries
pub fn split_platforms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Handler for the movie discovery feed
pub async fn discover_movies(
    State(state): State<AppState>,
    Query(params): Query<DiscoverParams>,
) -> AppResult<Json<Vec<EnrichedMovie>>> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::InvalidInput("user_id is required".to_string()))?;
    let page_size = page_size_or_default(params.page_size)?;
    let platforms = split_platforms(params.platforms.as_deref());
    let locale = state.locale(params.locale);

    let movies = state
        .recommender
        .discover(
            user_id,
            &platforms,
            &locale,
            params.page.unwrap_or(1),
            page_size,
        )
        .await?;
    Ok(Json(movies))
}
