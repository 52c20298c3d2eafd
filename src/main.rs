use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marquee_api::{
    api::{create_router, AppState},
    clock::{Clock, SystemClock},
    config::{Config, StatusCacheBackend, StorageBackend},
    db::{
        create_pool, create_redis_client, Cache, DocumentStore, MemoryDocumentStore,
        MemoryStatusCache, PgDocumentStore, RedisStatusCache, StatusCache,
    },
    services::{ImageUrls, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let store: Arc<dyn DocumentStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            Arc::new(PgDocumentStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory document store; user data is lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let status_cache: Arc<dyn StatusCache> = match config.status_cache_backend {
        StatusCacheBackend::Redis => Arc::new(RedisStatusCache::new(
            cache.clone(),
            config.status_cache_ttl_secs,
        )),
        StatusCacheBackend::Memory => Arc::new(MemoryStatusCache::new(
            config.status_cache_capacity,
            config.status_cache_ttl()?,
            clock.clone(),
        )),
    };

    let catalog = Arc::new(TmdbProvider::new(
        cache,
        config.catalog_api_key.clone(),
        config.catalog_api_url.clone(),
        ImageUrls::new(&config.image_base_url, &config.backdrop_base_url),
    ));

    let state = AppState::new(
        store,
        status_cache,
        catalog,
        clock,
        config.view_cooldown()?,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        storage = ?config.storage_backend,
        status_cache = ?config.status_cache_backend,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
