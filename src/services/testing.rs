//! Fixtures shared by the service tests.

use chrono::NaiveDate;

use crate::models::{
    MovieRecord, TmdbGenre, TmdbMovieDetails, TmdbMoviePage, TmdbMovieSummary, TmdbVideo,
    WatchProvider,
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

pub fn yesterday() -> NaiveDate {
    today().pred_opt().unwrap()
}

/// Upstream details for a displayable movie
pub fn details(id: i64) -> TmdbMovieDetails {
    TmdbMovieDetails {
        id,
        title: format!("Movie {}", id),
        release_date: Some("2019-05-30".to_string()),
        vote_average: Some(7.5),
        vote_count: Some(1200),
        overview: Some(format!("Overview of movie {}", id)),
        runtime: Some(118),
        genres: vec![
            TmdbGenre {
                name: "Drama".to_string(),
            },
            TmdbGenre {
                name: "Thriller".to_string(),
            },
        ],
        poster_path: Some(format!("/poster{}.jpg", id)),
        backdrop_path: None,
        tagline: None,
        original_title: None,
        original_language: Some("en".to_string()),
        imdb_id: None,
        status: Some("Released".to_string()),
        popularity: Some(42.0),
    }
}

/// Stored record refreshed today, available on provider 8 with a trailer
pub fn movie(id: i64) -> MovieRecord {
    let mut record = MovieRecord::from(details(id));
    record.trailer_key = Some(format!("trailer{}", id));
    record.trailer_key_last_updated = Some(today());
    record.watch_providers_ids = Some(vec![8]);
    record.watch_providers_last_updated = Some(today());
    record
}

pub fn trailer(key: &str) -> TmdbVideo {
    TmdbVideo {
        key: key.to_string(),
        video_type: "Trailer".to_string(),
        site: Some("YouTube".to_string()),
    }
}

pub fn netflix() -> WatchProvider {
    WatchProvider::new(8, "Netflix")
}

pub fn summaries(ids: &[i64]) -> Vec<TmdbMovieSummary> {
    ids.iter()
        .map(|id| TmdbMovieSummary { id: *id, title: None })
        .collect()
}

pub fn page_of(page: u32, ids: &[i64]) -> TmdbMoviePage {
    TmdbMoviePage {
        page,
        results: summaries(ids),
        total_pages: 500,
    }
}
