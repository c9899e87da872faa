use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::TmdbMovieDetails;

/// CDN prefix for poster images, including the size segment
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Placeholder for missing dates and runtimes in the client-facing view
pub const NOT_AVAILABLE: &str = "N/A";

/// Denormalized movie row cached in the movie store
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    /// "YYYY-MM-DD" as returned upstream; may be empty
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: Option<i32>,
    pub overview: String,
    pub runtime: Option<i32>,
    pub genres: Vec<String>,
    /// Records without a poster are never shown
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub tagline: Option<String>,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    pub imdb_id: Option<String>,
    pub status: Option<String>,
    pub popularity: Option<f64>,
    pub trailer_key: Option<String>,
    pub trailer_key_last_updated: Option<NaiveDate>,
    pub watch_providers_ids: Option<Vec<i64>>,
    pub watch_providers_last_updated: Option<NaiveDate>,
}

impl From<TmdbMovieDetails> for MovieRecord {
    fn from(details: TmdbMovieDetails) -> Self {
        Self {
            id: details.id,
            title: details.title,
            release_date: details.release_date,
            vote_average: details.vote_average.unwrap_or_default(),
            vote_count: details.vote_count,
            overview: details.overview.unwrap_or_default(),
            runtime: details.runtime,
            genres: details
                .genres
                .into_iter()
                .map(|genre| genre.name.trim().to_string())
                .collect(),
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            tagline: details.tagline,
            original_title: details.original_title,
            original_language: details.original_language,
            imdb_id: details.imdb_id,
            status: details.status,
            popularity: details.popularity,
            trailer_key: None,
            trailer_key_last_updated: None,
            watch_providers_ids: None,
            watch_providers_last_updated: None,
        }
    }
}

impl MovieRecord {
    /// Release year taken from the first `-` separated segment of the release date
    pub fn release_year(&self) -> String {
        self.release_date
            .as_deref()
            .filter(|date| !date.is_empty())
            .and_then(|date| date.split('-').next())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    }

    /// True when the record is available on at least one of the selected providers.
    /// An empty selection matches everything.
    pub fn is_available_on(&self, selected_provider_ids: &std::collections::HashSet<i64>) -> bool {
        if selected_provider_ids.is_empty() {
            return true;
        }
        self.watch_providers_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| selected_provider_ids.contains(id)))
    }

    /// Builds the client-facing view, or `None` when there is no poster to show
    pub fn to_enriched(&self) -> Option<EnrichedMovie> {
        let poster_path = self.poster_path.as_deref().filter(|p| !p.is_empty())?;

        Some(EnrichedMovie {
            id: self.id,
            title: self.title.clone(),
            image: format!("{}{}", IMAGE_BASE_URL, poster_path),
            date: self.release_year(),
            rate: self.vote_average,
            overview: self.overview.clone(),
            trailer_key: self.trailer_key.clone(),
            runtime: match self.runtime {
                Some(minutes) if minutes > 0 => Runtime::Minutes(minutes),
                _ => Runtime::Unknown,
            },
            genres: self.genres.clone(),
            platforms: Vec::new(),
        })
    }
}

/// Runtime in minutes, serialized as "N/A" when unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Minutes(i32),
    Unknown,
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Runtime::Minutes(minutes) => serializer.serialize_i32(*minutes),
            Runtime::Unknown => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Movie as returned to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedMovie {
    pub id: i64,
    pub title: String,
    pub image: String,
    /// Release year or "N/A"
    pub date: String,
    pub rate: f64,
    pub overview: String,
    pub trailer_key: Option<String>,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    /// Filled by the caller from the selected platforms; empty from the core
    pub platforms: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record() -> MovieRecord {
        MovieRecord {
            id: 27205,
            title: "Inception".to_string(),
            release_date: Some("2010-07-15".to_string()),
            vote_average: 8.4,
            vote_count: Some(35000),
            overview: "Cobb steals secrets from dreams.".to_string(),
            runtime: Some(148),
            genres: vec!["Action".to_string(), "Science Fiction".to_string()],
            poster_path: Some("/inception.jpg".to_string()),
            backdrop_path: None,
            tagline: None,
            original_title: None,
            original_language: None,
            imdb_id: None,
            status: None,
            popularity: None,
            trailer_key: Some("YoHD9XEInc0".to_string()),
            trailer_key_last_updated: None,
            watch_providers_ids: Some(vec![8, 119]),
            watch_providers_last_updated: None,
        }
    }

    #[test]
    fn test_to_enriched() {
        let movie = record().to_enriched().unwrap();
        assert_eq!(movie.image, "https://image.tmdb.org/t/p/w500/inception.jpg");
        assert_eq!(movie.date, "2010");
        assert_eq!(movie.runtime, Runtime::Minutes(148));
        assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
        assert!(movie.platforms.is_empty());
    }

    #[test]
    fn test_missing_poster_is_not_displayable() {
        let mut movie = record();
        movie.poster_path = None;
        assert!(movie.to_enriched().is_none());

        movie.poster_path = Some(String::new());
        assert!(movie.to_enriched().is_none());
    }

    #[test]
    fn test_missing_date_and_runtime_fall_back() {
        let mut movie = record();
        movie.release_date = Some(String::new());
        movie.runtime = Some(0);
        let enriched = movie.to_enriched().unwrap();
        assert_eq!(enriched.date, "N/A");
        assert_eq!(enriched.runtime, Runtime::Unknown);

        movie.release_date = None;
        movie.runtime = None;
        let enriched = movie.to_enriched().unwrap();
        assert_eq!(enriched.date, "N/A");
        assert_eq!(enriched.runtime, Runtime::Unknown);
    }

    #[test]
    fn test_enriched_wire_shape() {
        let mut movie = record();
        movie.runtime = None;
        let json = serde_json::to_value(movie.to_enriched().unwrap()).unwrap();

        assert_eq!(json["id"], 27205);
        assert_eq!(json["rate"], 8.4);
        assert_eq!(json["runtime"], "N/A");
        assert_eq!(json["trailer_key"], "YoHD9XEInc0");
        assert_eq!(json["platforms"], serde_json::json!([]));
    }

    #[test]
    fn test_provider_availability() {
        let movie = record();
        assert!(movie.is_available_on(&HashSet::new()));
        assert!(movie.is_available_on(&HashSet::from([119])));
        assert!(!movie.is_available_on(&HashSet::from([7])));

        let mut unknown = record();
        unknown.watch_providers_ids = None;
        assert!(!unknown.is_available_on(&HashSet::from([8])));
    }
}
