use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{provider_directory::ProviderDirectory, recommendations::Recommender},
};

pub mod discover;
pub mod movies;
pub mod providers;
pub mod users;

/// Page size used when a request does not set one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Requested page size, rejecting zero
pub fn page_size_or_default(requested: Option<u32>) -> AppResult<u32> {
    match requested {
        Some(0) => Err(AppError::InvalidInput("page_size must be at least 1".to_string())),
        Some(size) => Ok(size),
        None => Ok(DEFAULT_PAGE_SIZE),
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub providers: Arc<ProviderDirectory>,
    pub default_locale: String,
}

impl AppState {
    /// The request's watch region, or the configured default
    pub fn locale(&self, requested: Option<String>) -> String {
        requested
            .map(|l| l.trim().to_uppercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.default_locale.clone())
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/discover-movies", get(discover::discover_movies))
        .route("/movie/:id", get(movies::get_movie))
        .route("/user/:id/movies", get(users::list_user_movies))
        .route("/providers/refresh", post(providers::refresh))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
