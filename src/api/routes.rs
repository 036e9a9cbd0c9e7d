use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::State,
    http::{Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::AppState;
use crate::api::response;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/news", get(news_handler).fallback(method_not_allowed))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .max_age(Duration::from_secs(60 * 60)),
        )
        .with_state(app_state)
}

async fn news_handler(State(state): State<AppState>) -> Response {
    let start_time = Instant::now();

    let result = state.cache.get().await;
    let elapsed_ms = start_time.elapsed().as_millis() as u64;

    match result {
        Ok(snapshot) => {
            info!(
                items = snapshot.items.len(),
                cached = snapshot.cached,
                stale = snapshot.stale,
                elapsed_ms,
                "served news"
            );
            response::success(&snapshot, &state.config.source_name).into_response()
        }
        Err(err) => {
            error!(error = %err, elapsed_ms, "news request failed");
            err.into_response()
        }
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    response::method_not_allowed()
}

async fn health_handler() -> &'static str {
    "ok"
}
