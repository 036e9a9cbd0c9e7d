//! Feed fixtures and a scripted [`FeedFetcher`] for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;
use crate::fetcher::FeedFetcher;

/// Builds an RSS document with one `<item>` per title, all sharing a valid `pubDate`.
pub fn rss_with_titles(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!(
                "<item><title>{title}</title><description>Story {n}</description>\
                 <link>https://example.com/{n}</link><dc:creator>Reporter {n}</dc:creator>\
                 <pubDate>Sun, 05 Jan 2025 10:00:00 +0000</pubDate></item>",
                n = i + 1
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\
         <channel><title>Fixture</title><link>https://example.com</link>{items}</channel></rss>"
    )
}

/// Replays a fixed response and counts calls. The response can be swapped mid-test.
pub struct ScriptedFetcher {
    response: Mutex<Result<Bytes, TransportError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_response(Ok(Bytes::from(body.into())))
    }

    pub fn failing(err: TransportError) -> Self {
        Self::with_response(Err(err))
    }

    fn with_response(response: Result<Bytes, TransportError>) -> Self {
        Self {
            response: Mutex::new(response),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Holds each fetch open for `delay` so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond_with(&self, body: impl Into<String>) {
        *self.response.lock().unwrap() = Ok(Bytes::from(body.into()));
    }

    pub fn fail_with(&self, err: TransportError) {
        *self.response.lock().unwrap() = Err(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<Bytes, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.lock().unwrap().clone()
    }
}
