use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::error::{AppError, Result, TransportError};

pub const USER_AGENT: &str = "CyberSecPortfolio/1.0 (News Aggregator)";

/// Retrieves the raw feed document. One attempt per call, no retry.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<Bytes, TransportError>;
}

pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get_bytes(&self, url: &str, timeout: Duration) -> std::result::Result<Bytes, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        response.bytes().await.map_err(|e| classify(e, timeout))
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<Bytes, TransportError> {
        debug!(url, ?timeout, "fetching feed");

        // Covers connect, headers and body so a stalled upstream cannot hang the caller
        match tokio::time::timeout(timeout, self.get_bytes(url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout { after: timeout }),
        }
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { after: timeout }
    } else {
        err.into()
    }
}
