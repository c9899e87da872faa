//! In-process store implementations.
//!
//! Used by the test suites and for running the service without Postgres or
//! Redis. Each store keeps its state behind a shared `RwLock`, so clones see
//! the same data.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{CursorStore, MovieStore, OpinionStore, ProviderStore};
use crate::error::{AppError, AppResult};
use crate::models::{MovieRecord, Opinion, UserMovie, WatchProvider};

#[derive(Clone, Default)]
pub struct MemoryMovieStore {
    movies: Arc<RwLock<HashMap<i64, MovieRecord>>>,
}

impl MemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record as-is, replacing any existing row
    pub async fn put(&self, record: MovieRecord) {
        self.movies.write().await.insert(record.id, record);
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.movies.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MovieStore for MemoryMovieStore {
    async fn get(&self, movie_id: i64) -> AppResult<Option<MovieRecord>> {
        Ok(self.movies.read().await.get(&movie_id).cloned())
    }

    async fn upsert(&self, record: &MovieRecord) -> AppResult<MovieRecord> {
        let mut movies = self.movies.write().await;
        let stored = movies.entry(record.id).or_insert_with(|| record.clone());
        Ok(stored.clone())
    }

    async fn update_watch_providers(
        &self,
        movie_id: i64,
        provider_ids: &[i64],
        refreshed_on: NaiveDate,
    ) -> AppResult<()> {
        let mut movies = self.movies.write().await;
        let movie = movies
            .get_mut(&movie_id)
            .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))?;
        movie.watch_providers_ids = Some(provider_ids.to_vec());
        movie.watch_providers_last_updated = Some(refreshed_on);
        Ok(())
    }

    async fn update_trailer(
        &self,
        movie_id: i64,
        trailer_key: Option<&str>,
        refreshed_on: NaiveDate,
    ) -> AppResult<()> {
        let mut movies = self.movies.write().await;
        let movie = movies
            .get_mut(&movie_id)
            .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))?;
        movie.trailer_key = trailer_key.map(str::to_string);
        movie.trailer_key_last_updated = Some(refreshed_on);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryProviderStore {
    providers: Arc<RwLock<BTreeMap<i64, String>>>,
}

impl MemoryProviderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<WatchProvider> {
        self.providers
            .read()
            .await
            .iter()
            .map(|(id, name)| WatchProvider::new(*id, name.clone()))
            .collect()
    }
}

#[async_trait::async_trait]
impl ProviderStore for MemoryProviderStore {
    async fn insert_missing(&self, providers: &[WatchProvider]) -> AppResult<u64> {
        let mut stored = self.providers.write().await;
        let mut inserted = 0;
        for provider in providers {
            if !stored.contains_key(&provider.provider_id) {
                stored.insert(provider.provider_id, provider.provider_name.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn find_ids_matching(&self, name_substrings: &[String]) -> AppResult<HashSet<i64>> {
        let needles: Vec<String> = name_substrings
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let stored = self.providers.read().await;
        Ok(stored
            .iter()
            .filter(|(_, name)| {
                let name = name.to_lowercase();
                needles.iter().any(|needle| name.contains(needle.as_str()))
            })
            .map(|(id, _)| *id)
            .collect())
    }
}

#[derive(Default)]
struct OpinionState {
    users: HashSet<i64>,
    movies: Vec<UserMovie>,
}

#[derive(Clone, Default)]
pub struct MemoryOpinionStore {
    state: Arc<RwLock<OpinionState>>,
}

impl MemoryOpinionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: i64) {
        self.state.write().await.users.insert(user_id);
    }

    pub async fn record(
        &self,
        user_id: i64,
        movie_id: i64,
        opinion: Opinion,
        created_at: DateTime<Utc>,
    ) {
        let mut state = self.state.write().await;
        state.users.insert(user_id);
        state.movies.push(UserMovie {
            user_id,
            movie_id,
            opinion,
            created_at,
        });
    }
}

#[async_trait::async_trait]
impl OpinionStore for MemoryOpinionStore {
    async fn user_exists(&self, user_id: i64) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains(&user_id))
    }

    async fn user_movies(&self, user_id: i64, opinion: Option<Opinion>) -> AppResult<Vec<UserMovie>> {
        let state = self.state.read().await;
        let mut movies: Vec<UserMovie> = state
            .movies
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter(|m| opinion.map_or(true, |o| m.opinion == o))
            .cloned()
            .collect();
        movies.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.movie_id.cmp(&a.movie_id))
        });
        Ok(movies)
    }
}

#[derive(Clone, Default)]
pub struct MemoryCursorStore {
    pages: Arc<RwLock<HashMap<i64, (u32, Instant)>>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CursorStore for MemoryCursorStore {
    async fn get_page(&self, user_id: i64) -> AppResult<u32> {
        let pages = self.pages.read().await;
        Ok(match pages.get(&user_id) {
            Some((page, expires_at)) if Instant::now() < *expires_at => (*page).max(1),
            _ => 1,
        })
    }

    async fn set_page(&self, user_id: i64, page: u32, ttl: Duration) -> AppResult<()> {
        self.pages
            .write()
            .await
            .insert(user_id, (page.max(1), Instant::now() + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_movie_upsert_keeps_existing_row() {
        let store = MemoryMovieStore::new();
        let mut first = crate::services::testing::movie(1);
        first.title = "Original".to_string();
        store.upsert(&first).await.unwrap();

        let mut second = first.clone();
        second.title = "Replacement".to_string();
        let stored = store.upsert(&second).await.unwrap();

        assert_eq!(stored.title, "Original");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_provider_insert_is_append_only() {
        let store = MemoryProviderStore::new();
        let inserted = store
            .insert_missing(&[WatchProvider::new(8, "Netflix"), WatchProvider::new(337, "Disney Plus")])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let inserted = store
            .insert_missing(&[WatchProvider::new(8, "Netflix renamed"), WatchProvider::new(2, "Apple TV")])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let all = store.all().await;
        assert_eq!(all.len(), 3);
        assert!(all.contains(&WatchProvider::new(8, "Netflix")));
    }

    #[tokio::test]
    async fn test_provider_lookup_is_case_insensitive_union() {
        let store = MemoryProviderStore::new();
        store
            .insert_missing(&[
                WatchProvider::new(8, "Netflix"),
                WatchProvider::new(1796, "Netflix basic with Ads"),
                WatchProvider::new(337, "Disney Plus"),
                WatchProvider::new(2, "Apple TV"),
            ])
            .await
            .unwrap();

        let ids = store
            .find_ids_matching(&["netflix".to_string(), "DISNEY".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, HashSet::from([8, 1796, 337]));

        let none = store.find_ids_matching(&[]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_user_movies_newest_first() {
        let store = MemoryOpinionStore::new();
        let at = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();
        store.record(1, 10, Opinion::LovedIt, at(1)).await;
        store.record(1, 11, Opinion::Pass, at(3)).await;
        store.record(1, 12, Opinion::WantToWatch, at(2)).await;
        store.record(2, 13, Opinion::LovedIt, at(4)).await;

        let all = store.user_movies(1, None).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![11, 12, 10]);

        let loved = store.user_movies(1, Some(Opinion::LovedIt)).await.unwrap();
        assert_eq!(loved.len(), 1);
        assert!(store.user_exists(2).await.unwrap());
        assert!(!store.user_exists(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_cursor_defaults_and_expires() {
        let store = MemoryCursorStore::new();
        assert_eq!(store.get_page(1).await.unwrap(), 1);

        store.set_page(1, 12, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get_page(1).await.unwrap(), 12);

        store.set_page(1, 12, Duration::ZERO).await.unwrap();
        assert_eq!(store.get_page(1).await.unwrap(), 1);
    }
}
