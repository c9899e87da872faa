use serde::{Deserialize, Serialize};

/// Display names rewritten to the name users pick in the client
const DISPLAY_NAME_ALIASES: &[(&str, &str)] = &[
    ("Netflix basic with Ads", "Netflix"),
    ("Amazon Prime Video", "Prime Video"),
];

/// Entry in the provider directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct WatchProvider {
    pub provider_id: i64,
    pub provider_name: String,
}

impl WatchProvider {
    pub fn new(provider_id: i64, provider_name: impl Into<String>) -> Self {
        Self {
            provider_id,
            provider_name: provider_name.into(),
        }
    }
}

/// Maps upstream provider names onto the names used by the client
pub fn normalize_display_name(name: &str) -> &str {
    DISPLAY_NAME_ALIASES
        .iter()
        .find(|(upstream, _)| *upstream == name)
        .map(|(_, display)| *display)
        .unwrap_or(name)
}

/// Provider ids in first-seen order, without duplicates
pub fn dedup_provider_ids(providers: &[WatchProvider]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(providers.len());
    for provider in providers {
        if !ids.contains(&provider.provider_id) {
            ids.push(provider.provider_id);
        }
    }
    ids
}
