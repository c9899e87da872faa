use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{CursorStore, CURSOR_TTL},
    error::AppResult,
    models::EnrichedMovie,
    services::{
        enrichment::MovieEnricher,
        provider_directory::ProviderDirectory,
        tmdb::{DiscoverQuery, TmdbApi},
    },
};

/// Pages scanned past the user's cursor before giving up
pub const MAX_SCANNED_PAGES: u32 = 10;

/// TMDB refuses discovery pages past this one
pub const MAX_DISCOVER_PAGE: u32 = 500;

/// Pads result lists with popular movies, resuming from a per-user cursor
pub struct DiscoveryFiller {
    tmdb: Arc<dyn TmdbApi>,
    enricher: Arc<MovieEnricher>,
    providers: Arc<ProviderDirectory>,
    cursors: Arc<dyn CursorStore>,
}

impl DiscoveryFiller {
    pub fn new(
        tmdb: Arc<dyn TmdbApi>,
        enricher: Arc<MovieEnricher>,
        providers: Arc<ProviderDirectory>,
        cursors: Arc<dyn CursorStore>,
    ) -> Self {
        Self {
            tmdb,
            enricher,
            providers,
            cursors,
        }
    }

    /// Collects up to `n` enriched popular movies not in `excluded_ids`
    ///
    /// Scans discovery pages in popularity order starting at the user's cursor,
    /// for at most [`MAX_SCANNED_PAGES`] pages past it, rewinding once to page 1
    /// when the catalog runs out and stopping short of the starting page. A
    /// failed page stops the scan; a movie whose upstream calls fail is just
    /// skipped. The cursor is saved at the first page with candidates not yet
    /// visited.
    pub async fn fill(
        &self,
        n: usize,
        user_id: i64,
        excluded_ids: &HashSet<i64>,
        provider_filters: &[String],
        locale: &str,
    ) -> AppResult<Vec<EnrichedMovie>> {
        let mut movies = Vec::new();
        if n == 0 {
            return Ok(movies);
        }

        let selected_ids = self.providers.resolve_ids(provider_filters).await?;
        let mut provider_ids: Vec<i64> = selected_ids.iter().copied().collect();
        provider_ids.sort_unstable();

        let mut page = self.cursors.get_page(user_id).await?;
        if page > MAX_DISCOVER_PAGE {
            page = 1;
        }
        let start_page = page;
        let mut scanned = 0;
        let mut wrapped = false;
        let mut seen: HashSet<i64> = HashSet::new();

        while movies.len() < n && scanned <= MAX_SCANNED_PAGES {
            let query = DiscoverQuery {
                locale: locale.to_string(),
                page,
                provider_ids: provider_ids.clone(),
            };
            scanned += 1;

            let results = match self.tmdb.discover_movies(&query).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(user_id = user_id, page = page, error = %e, "Discovery page failed, stopping scan");
                    break;
                }
            };

            let mut candidates = results
                .results
                .iter()
                .map(|movie| movie.id)
                .filter(|id| !excluded_ids.contains(id))
                .filter(|id| seen.insert(*id))
                .collect::<Vec<i64>>()
                .into_iter();

            while movies.len() < n {
                let Some(movie_id) = candidates.next() else {
                    break;
                };
                if let Some(movie) = self
                    .enricher
                    .get_enriched_movie(movie_id, &selected_ids, locale)
                    .await?
                {
                    movies.push(movie);
                }
            }

            // Unvisited candidates left: resume on this page next time.
            if candidates.len() > 0 {
                break;
            }

            page += 1;

            if results.total_pages > 0 && page > results.total_pages.min(MAX_DISCOVER_PAGE) {
                page = 1;
                if wrapped || page == start_page {
                    break;
                }
                wrapped = true;
                tracing::debug!(user_id = user_id, "Reached last discovery page, rewinding cursor");
            } else if wrapped && page == start_page {
                break;
            }
        }

        self.cursors.set_page(user_id, page, CURSOR_TTL).await?;

        tracing::info!(
            user_id = user_id,
            requested = n,
            found = movies.len(),
            start_page = start_page,
            next_page = page,
            "Discovery filler finished"
        );

        Ok(movies)
    }
}
