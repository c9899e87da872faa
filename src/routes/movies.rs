use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{error::AppResult, models::EnrichedMovie};

#[derive(Debug, Deserialize)]
pub struct MovieParams {
    locale: Option<String>,
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(params): Query<MovieParams>,
) -> AppResult<Json<EnrichedMovie>> {
    let locale = state.locale(params.locale);
    let movie = state.recommender.get_movie(movie_id, &locale).await?;
    Ok(Json(movie))
}
