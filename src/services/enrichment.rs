use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    clock::{is_stale, Clock},
    db::MovieStore,
    error::AppResult,
    models::{dedup_provider_ids, first_trailer_key, EnrichedMovie, MovieRecord},
    services::tmdb::TmdbApi,
};

/// Cache-aside orchestrator for movie records
///
/// Serves movies from the movie store and only calls TMDB for the parts that
/// are missing or stale: full details on first sight, then watch providers and
/// trailer key each on their own calendar-date staleness.
///
/// Upstream failures are soft: a failed first fetch makes the movie absent, a
/// failed refresh keeps the stored value. Any other error is propagated.
pub struct MovieEnricher {
    movies: Arc<dyn MovieStore>,
    tmdb: Arc<dyn TmdbApi>,
    clock: Arc<dyn Clock>,
}

impl MovieEnricher {
    pub fn new(movies: Arc<dyn MovieStore>, tmdb: Arc<dyn TmdbApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            movies,
            tmdb,
            clock,
        }
    }

    /// Returns the enriched view of a movie, or `None` when it cannot be fetched,
    /// is not on any of `selected_provider_ids` (if any), or has no poster.
    pub async fn get_enriched_movie(
        &self,
        movie_id: i64,
        selected_provider_ids: &HashSet<i64>,
        locale: &str,
    ) -> AppResult<Option<EnrichedMovie>> {
        let Some(mut movie) = self.load_or_fetch(movie_id).await? else {
            return Ok(None);
        };
        let today = self.clock.today();

        if is_stale(
            movie.watch_providers_ids.is_some(),
            movie.watch_providers_last_updated,
            today,
        ) {
            self.refresh_watch_providers(&mut movie, locale, today).await?;
        }

        if !movie.is_available_on(selected_provider_ids) {
            tracing::debug!(movie_id = movie_id, "Movie not on selected providers");
            return Ok(None);
        }

        if movie.poster_path.as_deref().map_or(true, str::is_empty) {
            tracing::debug!(movie_id = movie_id, "Movie has no poster, skipping");
            return Ok(None);
        }

        if is_stale(movie.trailer_key.is_some(), movie.trailer_key_last_updated, today) {
            self.refresh_trailer(&mut movie, today).await?;
        }

        Ok(movie.to_enriched())
    }

    async fn load_or_fetch(&self, movie_id: i64) -> AppResult<Option<MovieRecord>> {
        if let Some(movie) = self.movies.get(movie_id).await? {
            return Ok(Some(movie));
        }

        let details = match self.tmdb.movie_details(movie_id).await {
            Ok(details) => details,
            Err(e) if e.is_upstream() => {
                tracing::warn!(movie_id = movie_id, error = %e, "Failed to fetch movie details");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut record = MovieRecord::from(details);
        record.id = movie_id;
        let stored = self.movies.upsert(&record).await?;
        Ok(Some(stored))
    }

    async fn refresh_watch_providers(
        &self,
        movie: &mut MovieRecord,
        locale: &str,
        today: NaiveDate,
    ) -> AppResult<()> {
        let providers = match self.tmdb.movie_watch_providers(movie.id, locale).await {
            Ok(providers) => providers,
            Err(e) if e.is_upstream() => {
                tracing::warn!(movie_id = movie.id, error = %e, "Watch provider refresh failed, keeping stored value");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let provider_ids = dedup_provider_ids(&providers);
        self.movies
            .update_watch_providers(movie.id, &provider_ids, today)
            .await?;

        movie.watch_providers_ids = Some(provider_ids);
        movie.watch_providers_last_updated = Some(today);
        Ok(())
    }

    async fn refresh_trailer(&self, movie: &mut MovieRecord, today: NaiveDate) -> AppResult<()> {
        let videos = match self.tmdb.movie_videos(movie.id).await {
            Ok(videos) => videos,
            Err(e) if e.is_upstream() => {
                tracing::warn!(movie_id = movie.id, error = %e, "Trailer refresh failed, keeping stored value");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let trailer_key = first_trailer_key(&videos);
        self.movies
            .update_trailer(movie.id, trailer_key.as_deref(), today)
            .await?;

        movie.trailer_key = trailer_key;
        movie.trailer_key_last_updated = Some(today);
        Ok(())
    }
}
