use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cache::NewsCache;
use crate::pipeline::ClassifiedNewsItem;

/// Outcome of one maintenance run, printed by the `update_news_cache` binary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_items: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<ClassifiedNewsItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MaintenanceReport {
    pub fn exit_code(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

/// Forces a refill with the maintenance timeout and reports what happened.
pub async fn update_news_cache(cache: &NewsCache, timeout: Duration) -> MaintenanceReport {
    let timestamp = Utc::now();
    info!(url = %cache.source().url, %timestamp, "starting news cache update");

    match cache.refresh(timeout).await {
        Ok(outcome) => {
            let items = outcome.entry.items.as_ref().clone();
            for item in items.iter().take(3) {
                info!(id = item.id, category = %item.category, title = %item.title, "sample item");
            }
            info!(
                total_items = outcome.total_items,
                relevant_items = items.len(),
                "news cache update completed"
            );

            MaintenanceReport {
                success: true,
                timestamp,
                total_items: Some(outcome.total_items),
                relevant_items: Some(items.len()),
                data: items,
                error: None,
            }
        }
        Err(err) => {
            error!(error = %err, "news cache update failed");
            MaintenanceReport {
                success: false,
                timestamp,
                total_items: None,
                relevant_items: None,
                data: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

/// Runs [`update_news_cache`] every `every`, starting immediately.
pub fn spawn_refresher(cache: Arc<NewsCache>, every: Duration, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            update_news_cache(&cache, timeout).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::pipeline::FeedSource;
    use crate::testing::{ScriptedFetcher, rss_with_titles};

    fn cache_over(fetcher: &Arc<ScriptedFetcher>) -> NewsCache {
        let source = FeedSource {
            url: "https://feeds.example.com/rss".into(),
            name: "Example".into(),
        };
        NewsCache::new(fetcher.clone(), source, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn successful_update_reports_counts_and_fills_cache() {
        let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&[
            "Ransomware hits hospital network",
            "New JS framework released",
            "Zero-day CVE disclosed in router firmware",
        ])));
        let cache = cache_over(&fetcher);

        let report = update_news_cache(&cache, Duration::from_secs(15)).await;

        assert!(report.success);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.total_items, Some(3));
        assert_eq!(report.relevant_items, Some(2));
        assert_eq!(report.data[1].id, 2);

        let snapshot = cache.get().await.unwrap();
        assert!(snapshot.cached);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn failed_update_reports_error_and_exit_code() {
        let fetcher = Arc::new(ScriptedFetcher::failing(TransportError::Timeout {
            after: Duration::from_secs(15),
        }));
        let cache = cache_over(&fetcher);

        let report = update_news_cache(&cache, Duration::from_secs(15)).await;

        assert!(!report.success);
        assert_eq!(report.exit_code(), 1);
        assert!(report.error.as_deref().unwrap().contains("timed out"));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("totalItems").is_none());
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn refresher_warms_cache_on_first_tick() {
        let fetcher = Arc::new(ScriptedFetcher::ok(rss_with_titles(&["Cyber drill results"])));
        let cache = Arc::new(cache_over(&fetcher));

        let handle = spawn_refresher(
            Arc::clone(&cache),
            Duration::from_secs(3600),
            Duration::from_secs(15),
        );
        for _ in 0..50 {
            if cache.peek().await.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(cache.peek().await.is_some());
        assert_eq!(fetcher.calls(), 1);
    }
}
