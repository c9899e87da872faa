use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use blip_api::{
    clock::SystemClock,
    config::Config,
    db::{
        create_pool, create_redis_client, run_migrations, Cache, PgMovieStore, PgOpinionStore,
        PgProviderStore, RedisCursorStore,
    },
    routes::{create_router, AppState},
    services::{
        discovery::DiscoveryFiller,
        enrichment::MovieEnricher,
        provider_directory::ProviderDirectory,
        recommendations::{Recommender, Shuffler},
        tmdb::{TmdbApi, TmdbClient},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,blip_api=debug,sqlx=warn")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client).await;

    let tmdb: Arc<dyn TmdbApi> = Arc::new(
        TmdbClient::new(
            config.tmdb_bearer_token.clone(),
            config.tmdb_url.clone(),
            Duration::from_secs(config.tmdb_timeout_secs),
        )
        .context("failed to build TMDB client")?,
    );

    let enricher = Arc::new(MovieEnricher::new(
        Arc::new(PgMovieStore::new(pool.clone())),
        tmdb.clone(),
        Arc::new(SystemClock),
    ));
    let providers = Arc::new(ProviderDirectory::new(
        Arc::new(PgProviderStore::new(pool.clone())),
        tmdb.clone(),
    ));
    let filler = Arc::new(DiscoveryFiller::new(
        tmdb.clone(),
        enricher.clone(),
        providers.clone(),
        Arc::new(RedisCursorStore::new(cache)),
    ));
    let recommender = Arc::new(Recommender::new(
        Arc::new(PgOpinionStore::new(pool)),
        tmdb,
        enricher,
        providers.clone(),
        filler,
        Shuffler::from_seed(config.shuffle_seed),
    ));

    if let Err(e) = providers.refresh_all().await {
        tracing::warn!(error = %e, "Initial watch provider refresh failed");
    }

    let app = create_router(AppState {
        recommender,
        providers,
        default_locale: config.default_locale.clone(),
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    }
}
