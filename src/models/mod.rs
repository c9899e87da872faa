use serde::Deserialize;
use std::collections::HashMap;

pub mod movie;
pub mod opinion;
pub mod watch_provider;

pub use movie::{EnrichedMovie, MovieRecord, Runtime, IMAGE_BASE_URL, NOT_AVAILABLE};
pub use opinion::{page_slice, Opinion, UserMovie, UserMoviesPage};
pub use watch_provider::{dedup_provider_ids, normalize_display_name, WatchProvider};

// ============================================================================
// TMDB API Types
// ============================================================================

/// API response from GET /3/movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// API response from GET /3/movie/{id}/videos
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideosResponse {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub site: Option<String>,
}

/// Key of the first video typed "Trailer", in upstream order
pub fn first_trailer_key(videos: &[TmdbVideo]) -> Option<String> {
    videos
        .iter()
        .find(|video| video.video_type == "Trailer")
        .map(|video| video.key.clone())
}

/// API response from GET /3/movie/{id}/watch/providers, keyed by region
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbWatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, TmdbRegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbRegionProviders {
    /// Subscription offers; rent/buy offers are ignored
    #[serde(default)]
    pub flatrate: Vec<TmdbProvider>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbProvider {
    pub provider_id: i64,
    pub provider_name: String,
}

impl From<TmdbProvider> for WatchProvider {
    fn from(provider: TmdbProvider) -> Self {
        WatchProvider::new(provider.provider_id, provider.provider_name)
    }
}

/// API response from GET /3/watch/providers/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProviderCatalog {
    #[serde(default)]
    pub results: Vec<TmdbProvider>,
}

/// Paged movie list, as returned by discover and recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbMovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_details_deserialization() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "release_date": "1999-10-15",
            "vote_average": 8.4,
            "vote_count": 26280,
            "overview": "A ticking-time-bomb insomniac...",
            "runtime": 139,
            "genres": [{"id": 18, "name": "Drama"}, {"id": 53, "name": "Thriller"}],
            "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            "imdb_id": "tt0137523",
            "budget": 63000000
        }"#;

        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let record = MovieRecord::from(details);

        assert_eq!(record.id, 550);
        assert_eq!(record.genres, vec!["Drama", "Thriller"]);
        assert_eq!(record.runtime, Some(139));
        assert_eq!(record.imdb_id.as_deref(), Some("tt0137523"));
        assert_eq!(record.trailer_key, None);
        assert_eq!(record.watch_providers_ids, None);
    }

    #[test]
    fn test_sparse_movie_details_use_defaults() {
        let json = r#"{"id": 1, "runtime": null, "poster_path": null}"#;

        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let record = MovieRecord::from(details);

        assert_eq!(record.title, "");
        assert_eq!(record.vote_average, 0.0);
        assert!(record.genres.is_empty());
        assert_eq!(record.poster_path, None);
    }

    #[test]
    fn test_first_trailer_key() {
        let json = r#"{"id": 550, "results": [
            {"key": "teaser1", "type": "Teaser", "site": "YouTube"},
            {"key": "trailer1", "type": "Trailer", "site": "YouTube"},
            {"key": "trailer2", "type": "Trailer", "site": "YouTube"}
        ]}"#;

        let videos: TmdbVideosResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_trailer_key(&videos.results), Some("trailer1".to_string()));
    }

    #[test]
    fn test_first_trailer_key_none() {
        let videos = vec![TmdbVideo {
            key: "clip".to_string(),
            video_type: "Clip".to_string(),
            site: None,
        }];
        assert_eq!(first_trailer_key(&videos), None);
        assert_eq!(first_trailer_key(&[]), None);
    }

    #[test]
    fn test_watch_providers_deserialization() {
        let json = r#"{"id": 550, "results": {
            "FR": {
                "link": "https://www.themoviedb.org/movie/550/watch?locale=FR",
                "flatrate": [{"provider_id": 8, "provider_name": "Netflix", "logo_path": "/n.jpg"}],
                "rent": [{"provider_id": 2, "provider_name": "Apple TV"}]
            },
            "US": {"buy": [{"provider_id": 3, "provider_name": "Google Play Movies"}]}
        }}"#;

        let response: TmdbWatchProvidersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results["FR"].flatrate.len(), 1);
        assert_eq!(response.results["FR"].flatrate[0].provider_id, 8);
        assert!(response.results["US"].flatrate.is_empty());
    }
}
