use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use threat_news::{
    AppState,
    api::routes::create_router,
    cache::NewsCache,
    config::Config,
    fetcher::HttpFeedFetcher,
    maintenance::spawn_refresher,
    pipeline::FeedSource,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;

    let fetcher = Arc::new(HttpFeedFetcher::new()?);
    let source = FeedSource {
        url: config.feed_url.clone(),
        name: config.source_name.clone(),
    };
    let cache = Arc::new(NewsCache::new(fetcher, source, config.fetch_timeout));

    if let Some(every) = config.refresh_interval {
        info!(every_secs = every.as_secs(), "scheduling background news refresh");
        spawn_refresher(Arc::clone(&cache), every, config.maintenance_timeout);
    }

    // Create application state
    let app_state = AppState {
        config: Arc::new(config),
        cache,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!(%server_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
