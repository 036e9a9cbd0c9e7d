//! One-shot news refresh for cron/CI. Exits 0 on success, 1 on failure.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

use threat_news::{
    cache::NewsCache,
    config::Config,
    fetcher::HttpFeedFetcher,
    maintenance::update_news_cache,
    pipeline::FeedSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let fetcher = match HttpFeedFetcher::new() {
        Ok(fetcher) => Arc::new(fetcher),
        Err(err) => {
            error!(error = %err, "could not build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let source = FeedSource {
        url: config.feed_url.clone(),
        name: config.source_name.clone(),
    };
    let cache = NewsCache::new(fetcher, source, config.maintenance_timeout);

    let report = update_news_cache(&cache, config.maintenance_timeout).await;
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => error!(error = %err, "could not serialize report"),
    }

    ExitCode::from(report.exit_code())
}
