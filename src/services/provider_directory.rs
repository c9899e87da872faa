use std::collections::HashSet;
use std::sync::Arc;

use crate::{db::ProviderStore, error::AppResult, services::tmdb::TmdbApi};

/// Translates user-facing platform names into TMDB provider ids
pub struct ProviderDirectory {
    store: Arc<dyn ProviderStore>,
    tmdb: Arc<dyn TmdbApi>,
}

impl ProviderDirectory {
    pub fn new(store: Arc<dyn ProviderStore>, tmdb: Arc<dyn TmdbApi>) -> Self {
        Self { store, tmdb }
    }

    /// Pulls the full provider catalog and stores the providers not seen before
    ///
    /// Returns the number of newly stored providers.
    pub async fn refresh_all(&self) -> AppResult<u64> {
        let catalog = self.tmdb.watch_provider_catalog().await?;
        let inserted = self.store.insert_missing(&catalog).await?;

        tracing::info!(
            fetched = catalog.len(),
            inserted = inserted,
            "Watch provider directory refreshed"
        );

        Ok(inserted)
    }

    /// Provider ids whose name contains any of `name_substrings`, ignoring case
    pub async fn resolve_ids(&self, name_substrings: &[String]) -> AppResult<HashSet<i64>> {
        if name_substrings.is_empty() {
            return Ok(HashSet::new());
        }

        let ids = self.store.find_ids_matching(name_substrings).await?;
        tracing::debug!(
            filters = ?name_substrings,
            resolved = ids.len(),
            "Resolved provider filters"
        );
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryProviderStore;
    use crate::error::AppError;
    use crate::models::WatchProvider;
    use crate::services::tmdb::MockTmdbApi;

    #[tokio::test]
    async fn test_refresh_all_inserts_only_new_providers() {
        let store = MemoryProviderStore::new();
        store
            .insert_missing(&[WatchProvider::new(8, "Netflix")])
            .await
            .unwrap();

        let mut tmdb = MockTmdbApi::new();
        tmdb.expect_watch_provider_catalog().times(1).returning(|| {
            Ok(vec![
                WatchProvider::new(8, "Netflix"),
                WatchProvider::new(337, "Disney Plus"),
                WatchProvider::new(119, "Amazon Prime Video"),
            ])
        });

        let directory = ProviderDirectory::new(Arc::new(store.clone()), Arc::new(tmdb));
        let inserted = tokio_test::assert_ok!(directory.refresh_all().await);

        assert_eq!(inserted, 2);
        assert_eq!(store.all().await.len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_all_propagates_upstream_failure() {
        let mut tmdb = MockTmdbApi::new();
        tmdb.expect_watch_provider_catalog()
            .returning(|| Err(AppError::ExternalApi("status 401".to_string())));

        let directory = ProviderDirectory::new(Arc::new(MemoryProviderStore::new()), Arc::new(tmdb));
        let err = tokio_test::assert_err!(directory.refresh_all().await);
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_resolve_ids() {
        let store = MemoryProviderStore::new();
        store
            .insert_missing(&[
                WatchProvider::new(8, "Netflix"),
                WatchProvider::new(119, "Amazon Prime Video"),
                WatchProvider::new(337, "Disney Plus"),
            ])
            .await
            .unwrap();

        let directory = ProviderDirectory::new(Arc::new(store), Arc::new(MockTmdbApi::new()));

        let ids = directory
            .resolve_ids(&["prime video".to_string(), "netflix".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, HashSet::from([8, 119]));

        let ids = directory.resolve_ids(&[]).await.unwrap();
        assert!(ids.is_empty());
    }
}
