pub mod api;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod maintenance;
pub mod parser;
pub mod pipeline;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::sync::Arc;

use cache::NewsCache;
use config::Config;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<NewsCache>,
}
