use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::ClassifiedNewsItem;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub success: bool,
    pub data: Vec<ClassifiedNewsItem>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
    pub cache_info: CacheInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub cached: bool,
    pub stale: bool,
    /// Milliseconds since the served entry was fetched.
    pub cache_age: i64,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct MethodNotAllowed {
    pub error: String,
    pub message: String,
}
