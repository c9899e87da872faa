//! TMDB metadata provider
//!
//! The rest of the crate only talks to TMDB through the [`TmdbApi`] trait, so the
//! enrichment engine and the recommendation assembler can run against a mock in
//! tests. [`TmdbClient`] is the reqwest-backed implementation.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{
        TmdbMovieDetails, TmdbMoviePage, TmdbMovieSummary, TmdbProviderCatalog, TmdbVideo,
        TmdbVideosResponse, TmdbWatchProvidersResponse, WatchProvider,
    },
};

/// Parameters for one page of popularity-sorted discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    /// Two-letter region code, e.g. "FR"
    pub locale: String,
    pub page: u32,
    /// Restricts results to these providers when non-empty
    pub provider_ids: Vec<i64>,
}

impl DiscoverQuery {
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "language",
                format!("{}-{}", self.locale.to_lowercase(), self.locale.to_uppercase()),
            ),
            ("page", self.page.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("watch_region", self.locale.to_uppercase()),
        ];

        if !self.provider_ids.is_empty() {
            let ids: Vec<String> = self.provider_ids.iter().map(|id| id.to_string()).collect();
            params.push(("with_watch_providers", ids.join("|")));
        }

        params
    }
}

/// Upstream movie metadata operations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TmdbApi: Send + Sync {
    /// Full details for a movie
    async fn movie_details(&self, movie_id: i64) -> AppResult<TmdbMovieDetails>;

    /// Videos attached to a movie, in upstream order
    async fn movie_videos(&self, movie_id: i64) -> AppResult<Vec<TmdbVideo>>;

    /// Subscription providers for a movie in one region, with display names normalized
    async fn movie_watch_providers(&self, movie_id: i64, region: &str)
        -> AppResult<Vec<WatchProvider>>;

    /// Recommendations keyed off a movie
    async fn movie_recommendations(&self, movie_id: i64) -> AppResult<Vec<TmdbMovieSummary>>;

    /// One page of discovery results
    async fn discover_movies(&self, query: &DiscoverQuery) -> AppResult<TmdbMoviePage>;

    /// Every movie watch provider TMDB knows about
    async fn watch_provider_catalog(&self) -> AppResult<Vec<WatchProvider>>;
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    bearer_token: String,
    api_url: String,
}

impl TmdbClient {
    /// Creates a client whose every call is bounded by `timeout`
    pub fn new(bearer_token: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        if bearer_token.trim().is_empty() {
            tracing::warn!("TMDB bearer token is empty, upstream calls will be rejected");
        }

        let http_client = HttpClient::builder()
            .user_agent("blip-api/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            bearer_token,
            api_url,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let url = format!("{}/3{}", self.api_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = %status, "TMDB request failed");
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

/// Subscription providers for `region`, display names normalized
pub fn flatrate_for_region(response: TmdbWatchProvidersResponse, region: &str) -> Vec<WatchProvider> {
    let mut results = response.results;
    results
        .remove(&region.to_uppercase())
        .unwrap_or_default()
        .flatrate
        .into_iter()
        .map(|provider| {
            let name = crate::models::normalize_display_name(&provider.provider_name).to_string();
            WatchProvider::new(provider.provider_id, name)
        })
        .collect()
}

#[async_trait::async_trait]
impl TmdbApi for TmdbClient {
    async fn movie_details(&self, movie_id: i64) -> AppResult<TmdbMovieDetails> {
        self.get(&format!("/movie/{}", movie_id), &[]).await
    }

    async fn movie_videos(&self, movie_id: i64) -> AppResult<Vec<TmdbVideo>> {
        let response: TmdbVideosResponse =
            self.get(&format!("/movie/{}/videos", movie_id), &[]).await?;
        Ok(response.results)
    }

    async fn movie_watch_providers(
        &self,
        movie_id: i64,
        region: &str,
    ) -> AppResult<Vec<WatchProvider>> {
        let response: TmdbWatchProvidersResponse = self
            .get(&format!("/movie/{}/watch/providers", movie_id), &[])
            .await?;
        Ok(flatrate_for_region(response, region))
    }

    async fn movie_recommendations(&self, movie_id: i64) -> AppResult<Vec<TmdbMovieSummary>> {
        let page: TmdbMoviePage = self
            .get(&format!("/movie/{}/recommendations", movie_id), &[])
            .await?;

        tracing::debug!(
            movie_id = movie_id,
            results = page.results.len(),
            "Recommendations fetched"
        );

        Ok(page.results)
    }

    async fn discover_movies(&self, query: &DiscoverQuery) -> AppResult<TmdbMoviePage> {
        tracing::debug!(
            page = query.page,
            locale = %query.locale,
            providers = ?query.provider_ids,
            "Fetching discovery page"
        );
        self.get("/discover/movie", &query.query_params()).await
    }

    async fn watch_provider_catalog(&self) -> AppResult<Vec<WatchProvider>> {
        let catalog: TmdbProviderCatalog = self
            .get("/watch/providers/movie", &[("language", "en-US".to_string())])
            .await?;
        Ok(catalog.results.into_iter().map(WatchProvider::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_query_params_without_providers() {
        let query = DiscoverQuery {
            locale: "fr".to_string(),
            page: 3,
            provider_ids: vec![],
        };

        let params = query.query_params();
        assert_eq!(
            params,
            vec![
                ("language", "fr-FR".to_string()),
                ("page", "3".to_string()),
                ("sort_by", "popularity.desc".to_string()),
                ("watch_region", "FR".to_string()),
            ]
        );
    }

    #[test]
    fn test_discover_query_params_with_providers() {
        let query = DiscoverQuery {
            locale: "US".to_string(),
            page: 1,
            provider_ids: vec![8, 337, 1796],
        };

        let params = query.query_params();
        assert!(params.contains(&("with_watch_providers", "8|337|1796".to_string())));
        assert!(params.contains(&("language", "us-US".to_string())));
    }

    #[test]
    fn test_flatrate_for_region_normalizes_names() {
        let json = r#"{"results": {
            "FR": {"flatrate": [
                {"provider_id": 1796, "provider_name": "Netflix basic with Ads"},
                {"provider_id": 119, "provider_name": "Amazon Prime Video"},
                {"provider_id": 337, "provider_name": "Disney Plus"}
            ]}
        }}"#;
        let response: TmdbWatchProvidersResponse = serde_json::from_str(json).unwrap();

        let providers = flatrate_for_region(response, "fr");
        let names: Vec<&str> = providers.iter().map(|p| p.provider_name.as_str()).collect();
        assert_eq!(names, vec!["Netflix", "Prime Video", "Disney Plus"]);
        assert_eq!(providers[0].provider_id, 1796);
    }

    #[test]
    fn test_flatrate_for_missing_region_is_empty() {
        let json = r#"{"results": {"US": {"flatrate": [{"provider_id": 8, "provider_name": "Netflix"}]}}}"#;
        let response: TmdbWatchProvidersResponse = serde_json::from_str(json).unwrap();
        assert!(flatrate_for_region(response, "FR").is_empty());
    }

    #[test]
    fn test_client_builds_with_timeout() {
        let client = TmdbClient::new(
            "token".to_string(),
            "http://tmdb.test".to_string(),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
    }
}
