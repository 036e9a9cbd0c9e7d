//! Drives the router end to end against a scripted feed.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use chrono::TimeDelta;
use serde_json::Value;
use tower::ServiceExt;

use threat_news::{
    AppState,
    api::routes::create_router,
    cache::NewsCache,
    config::Config,
    error::TransportError,
    pipeline::FeedSource,
    testing::{ScriptedFetcher, rss_with_titles},
};

fn app(fetcher: &Arc<ScriptedFetcher>, ttl: Option<TimeDelta>) -> Router {
    let config = Config::from_lookup(|_| None).unwrap();
    let source = FeedSource {
        url: config.feed_url.clone(),
        name: config.source_name.clone(),
    };
    let mut cache = NewsCache::new(fetcher.clone(), source, config.fetch_timeout);
    if let Some(ttl) = ttl {
        cache = cache.with_ttl(ttl);
    }

    create_router(AppState {
        config: Arc::new(config),
        cache: Arc::new(cache),
    })
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn get_news_returns_success_envelope() {
    let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&[
        "Ransomware hits hospital network",
        "New JS framework released",
        "Zero-day CVE disclosed in router firmware",
    ])));
    let app = app(&fetcher, None);

    let (status, body) = call(&app, Method::GET, "/api/news").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "The Hacker News");
    assert!(body["lastUpdated"].is_string());

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], 1);
    assert_eq!(data[0]["category"], "Malware / Threat");
    assert_eq!(data[0]["date"], "Jan 5, 2025");
    assert_eq!(data[0]["author"], "Reporter 1");
    assert_eq!(data[1]["id"], 2);
    assert_eq!(data[1]["title"], "Zero-day CVE disclosed in router firmware");
    assert_eq!(data[1]["category"], "Vulnerability / Exploit");

    assert_eq!(body["cacheInfo"]["cached"], false);
    assert_eq!(body["cacheInfo"]["stale"], false);
    assert!(body["cacheInfo"]["expiresAt"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn repeated_gets_are_served_from_cache() {
    let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&["Phishing wave"])));
    let app = app(&fetcher, None);

    let (_, first) = call(&app, Method::GET, "/api/news").await;
    let (_, second) = call(&app, Method::GET, "/api/news").await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(first["data"], second["data"]);
    assert_eq!(second["cacheInfo"]["cached"], true);
}

#[tokio::test]
async fn upstream_outage_serves_stale_data() {
    let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&["Data breach disclosed"])));
    let app = app(&fetcher, Some(TimeDelta::zero()));

    let (_, first) = call(&app, Method::GET, "/api/news").await;
    fetcher.fail_with(TransportError::Timeout {
        after: Duration::from_secs(10),
    });
    let (status, second) = call(&app, Method::GET, "/api/news").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cacheInfo"]["stale"], true);
    assert_eq!(second["data"], first["data"]);
}

#[tokio::test]
async fn outage_with_nothing_cached_is_failure_envelope() {
    let fetcher = Arc::new(ScriptedFetcher::failing(TransportError::Network(
        "dns lookup failed".into(),
    )));
    let app = app(&fetcher, None);

    let (status, body) = call(&app, Method::GET, "/api/news").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to fetch news");
    assert!(body["message"].as_str().unwrap().contains("dns lookup failed"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn other_methods_are_rejected() {
    let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&["Cyber"])));
    let app = app(&fetcher, None);

    let (status, body) = call(&app, Method::POST, "/api/news").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
    assert_eq!(body["message"], "Only GET requests are supported");
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn health_check_is_plain_ok() {
    let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&[])));
    let app = app(&fetcher, None);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fetcher.calls(), 0);
}
