use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    db::OpinionStore,
    error::{AppError, AppResult},
    models::{page_slice, EnrichedMovie, Opinion, UserMoviesPage},
    services::{
        discovery::DiscoveryFiller, enrichment::MovieEnricher,
        provider_directory::ProviderDirectory, tmdb::TmdbApi,
    },
};

/// Most recommended movies kept before switching to the filler
pub const MAX_RECOMMENDED: usize = 8;

/// Most upstream recommendation calls issued per request
pub const MAX_RECOMMENDATION_CALLS: usize = 16;

/// Size of a personalized list once padded with filler
pub const TARGET_LIST_SIZE: usize = 20;

/// Filler pool size for users without liked movies
pub const DISCOVERY_ONLY_TARGET: usize = 50;

/// Seedable random ordering for liked movies
pub struct Shuffler {
    rng: Mutex<StdRng>,
}

impl Shuffler {
    /// Fixed sequence when `seed` is set, OS entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng: Mutex::new(rng) }
    }

    pub fn shuffle<T>(&self, items: &mut [T]) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        items.shuffle(&mut *rng);
    }
}

/// Builds the movie lists served to users
///
/// Personalized lists come from TMDB recommendations of the movies a user
/// liked, padded with popular movies from the discovery filler.
pub struct Recommender {
    opinions: Arc<dyn OpinionStore>,
    tmdb: Arc<dyn TmdbApi>,
    enricher: Arc<MovieEnricher>,
    providers: Arc<ProviderDirectory>,
    filler: Arc<DiscoveryFiller>,
    shuffler: Shuffler,
}

impl Recommender {
    pub fn new(
        opinions: Arc<dyn OpinionStore>,
        tmdb: Arc<dyn TmdbApi>,
        enricher: Arc<MovieEnricher>,
        providers: Arc<ProviderDirectory>,
        filler: Arc<DiscoveryFiller>,
        shuffler: Shuffler,
    ) -> Self {
        Self {
            opinions,
            tmdb,
            enricher,
            providers,
            filler,
            shuffler,
        }
    }

    /// Movie list for a user, excluding everything they already rated
    ///
    /// Users with liked movies get up to [`MAX_RECOMMENDED`] recommendations
    /// followed by filler, [`TARGET_LIST_SIZE`] at most; `page` and
    /// `page_size` are not applied to that list. Other users get a page of
    /// popular movies.
    pub async fn discover(
        &self,
        user_id: i64,
        platforms: &[String],
        locale: &str,
        page: u32,
        page_size: u32,
    ) -> AppResult<Vec<EnrichedMovie>> {
        let started = Instant::now();

        if !self.opinions.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }

        let interactions = self.opinions.user_movies(user_id, None).await?;
        let mut excluded: HashSet<i64> = interactions.iter().map(|m| m.movie_id).collect();
        let mut liked: Vec<i64> = interactions
            .iter()
            .filter(|m| m.opinion.is_liked())
            .map(|m| m.movie_id)
            .collect();

        if liked.is_empty() {
            let pool = self
                .filler
                .fill(DISCOVERY_ONLY_TARGET, user_id, &excluded, platforms, locale)
                .await?;
            let movies = page_slice(&pool, page, page_size).to_vec();

            tracing::info!(
                user_id = user_id,
                pool = pool.len(),
                returned = movies.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Served discovery page"
            );
            return Ok(movies);
        }

        self.shuffler.shuffle(&mut liked);
        let selected_ids = self.providers.resolve_ids(platforms).await?;

        let mut recommended: Vec<EnrichedMovie> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();
        let mut calls = 0;

        for liked_id in liked {
            if recommended.len() >= MAX_RECOMMENDED || calls >= MAX_RECOMMENDATION_CALLS {
                break;
            }
            calls += 1;

            let candidates = match self.tmdb.movie_recommendations(liked_id).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!(user_id = user_id, movie_id = liked_id, error = %e, "Recommendation call failed");
                    continue;
                }
            };

            for candidate in candidates {
                if recommended.len() >= MAX_RECOMMENDED {
                    break;
                }
                if excluded.contains(&candidate.id) || !seen.insert(candidate.id) {
                    continue;
                }
                if let Some(movie) = self
                    .enricher
                    .get_enriched_movie(candidate.id, &selected_ids, locale)
                    .await?
                {
                    recommended.push(movie);
                }
            }
        }

        excluded.extend(recommended.iter().map(|m| m.id));
        let quota = TARGET_LIST_SIZE.saturating_sub(recommended.len());
        let filler = self
            .filler
            .fill(quota, user_id, &excluded, platforms, locale)
            .await?;

        tracing::info!(
            user_id = user_id,
            recommendation_calls = calls,
            recommended = recommended.len(),
            filler = filler.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Served personalized list"
        );

        recommended.extend(filler);
        Ok(recommended)
    }

    /// A single enriched movie, regardless of providers
    pub async fn get_movie(&self, movie_id: i64, locale: &str) -> AppResult<EnrichedMovie> {
        self.enricher
            .get_enriched_movie(movie_id, &HashSet::new(), locale)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))
    }

    /// A page of the movies a user rated, newest first
    ///
    /// `has_more` counts stored rows, so a page can come back shorter than
    /// `page_size` when some of its movies cannot be enriched.
    pub async fn list_user_movies(
        &self,
        user_id: i64,
        opinion: Option<Opinion>,
        page: u32,
        page_size: u32,
        locale: &str,
    ) -> AppResult<UserMoviesPage> {
        if !self.opinions.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }

        let rows = self.opinions.user_movies(user_id, opinion).await?;
        let no_filter = HashSet::new();

        let mut movies = Vec::new();
        for row in page_slice(&rows, page, page_size) {
            if let Some(movie) = self
                .enricher
                .get_enriched_movie(row.movie_id, &no_filter, locale)
                .await?
            {
                movies.push(movie);
            }
        }

        let has_more = (page.max(1) as usize) * (page_size as usize) < rows.len();
        Ok(UserMoviesPage { movies, has_more })
    }
}
