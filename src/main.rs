use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qp_match::{
    cache::{bundled_thumbnails, AssetCache},
    config::Config,
    models::demo_catalog,
    routes::{create_router, AppState},
    services::{
        providers::TmdbClient, HashEmbedder, MatchService, PosterPrefetcher, PrefetchSettings,
        RunStateStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qp_match=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let shutdown = CancellationToken::new();

    // Matching engine: built once, read-only afterwards
    let matcher = Arc::new(MatchService::new(
        demo_catalog(),
        Arc::new(HashEmbedder::new()),
    ));

    // Poster cache and its writer task
    let (cache, cache_writer) = AssetCache::open(&config.cache_dir, config.cache_max_entries).await;
    cache.bootstrap(bundled_thumbnails()).await;

    let tmdb = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
    ));

    let prefetcher = Arc::new(
        PosterPrefetcher::new(
            tmdb.clone(),
            tmdb.clone(),
            cache.clone(),
            RunStateStore::new(&config.prefetch_state_path),
            PrefetchSettings {
                max_pages: config.prefetch_max_pages,
                cooldown: chrono::Duration::days(config.prefetch_cooldown_days),
            },
            shutdown.clone(),
        )
        .await,
    );

    if config.prefetch_on_startup {
        prefetcher.start_if_needed();
    }

    let state = Arc::new(AppState {
        matcher,
        catalog: tmdb.clone(),
        posters: tmdb,
        cache,
        prefetcher: prefetcher.clone(),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            signal.cancel();
        })
        .await?;

    // Let dispatched poster fetches store before the writer stops
    prefetcher.wait().await;
    cache_writer.shutdown().await;

    Ok(())
}
