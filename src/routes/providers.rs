use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppResult;

/// Re-syncs the provider directory with TMDB's catalog
pub async fn refresh(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let inserted = state.providers.refresh_all().await?;
    Ok(Json(json!({ "inserted": inserted })))
}
