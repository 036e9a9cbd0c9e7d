use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

use crate::api::models::{CacheInfo, ErrorResponse, MethodNotAllowed, NewsResponse};
use crate::cache::NewsSnapshot;

pub fn success(snapshot: &NewsSnapshot, source: &str) -> (StatusCode, Json<NewsResponse>) {
    let now = Utc::now();
    let cache_info = CacheInfo {
        cached: snapshot.cached,
        stale: snapshot.stale,
        cache_age: (now - snapshot.fetched_at).num_milliseconds().max(0),
        expires_at: snapshot.expires_at.timestamp_millis(),
    };

    (
        StatusCode::OK,
        Json(NewsResponse {
            success: true,
            data: snapshot.items.as_ref().clone(),
            source: source.to_string(),
            last_updated: now,
            cache_info,
        }),
    )
}

pub fn failure(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: "Failed to fetch news".to_string(),
            message,
            timestamp: Utc::now(),
        }),
    )
}

pub fn method_not_allowed() -> (StatusCode, Json<MethodNotAllowed>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MethodNotAllowed {
            error: "Method not allowed".to_string(),
            message: "Only GET requests are supported".to_string(),
        }),
    )
}
