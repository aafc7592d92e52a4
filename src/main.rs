use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quickflicks_api::{
    config::Config,
    db::{
        cache::{create_redis_client, CacheWriterHandle},
        create_pool, Cache, InteractionStore, MemoryInteractionStore, MemoryWatchlist,
        PgInteractionStore, RedisStore,
    },
    models::MAX_RESULT_LIMIT,
    routes::{create_router, AppState},
    services::{
        providers::{http_client, TmdbProvider, YouTubeProvider},
        Aggregator, Ranker,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quickflicks_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let ranker = Ranker::with_overrides(config.ranking_overrides()?)?;

    if config.cache_superset_size < MAX_RESULT_LIMIT {
        tracing::warn!(
            configured = config.cache_superset_size,
            used = MAX_RESULT_LIMIT,
            "CACHE_SUPERSET_SIZE is below the largest result limit, raising it"
        );
    }

    let (cache, cache_writer) = build_cache(&config).await;
    let interactions = build_interaction_store(&config).await?;

    let http = http_client(config.provider_timeout());
    let aggregator = Aggregator::new(
        Arc::new(TmdbProvider::new(
            http.clone(),
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_detail_lookups,
        )),
        Arc::new(YouTubeProvider::new(
            http,
            config.youtube_api_key.clone(),
            config.youtube_api_url.clone(),
            config.youtube_max_results,
        )),
        ranker,
        cache,
        config.provider_timeout(),
        config.cache_superset_size,
    );

    let state = AppState::new(aggregator, interactions, Arc::new(MemoryWatchlist::new()));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Redis when configured and reachable, otherwise the in-process store
async fn build_cache(config: &Config) -> (Cache, Option<CacheWriterHandle>) {
    let ttl = config.cache_ttl();

    if let Some(url) = &config.redis_url {
        let connected = match create_redis_client(url) {
            Ok(client) => RedisStore::connect(client)
                .await
                .map_err(|e| anyhow::anyhow!(e)),
            Err(e) => Err(e),
        };

        match connected {
            Ok((store, writer)) => {
                tracing::info!("Using Redis result cache");
                return (Cache::new(Arc::new(store), ttl), Some(writer));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory cache");
            }
        }
    }

    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory result cache");
    (Cache::in_memory(ttl, config.cache_max_entries), None)
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise in memory
async fn build_interaction_store(config: &Config) -> anyhow::Result<Arc<dyn InteractionStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            tracing::info!("Recording interactions to PostgreSQL");
            Ok(Arc::new(PgInteractionStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, interactions are kept in memory");
            Ok(Arc::new(MemoryInteractionStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
