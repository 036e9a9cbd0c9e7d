use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_FEED_URL: &str = "https://feeds.feedburner.com/TheHackersNews";
pub const DEFAULT_SOURCE_NAME: &str = "The Hacker News";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub feed_url: String,
    pub source_name: String,
    /// Timeout for refills triggered by a query.
    pub fetch_timeout: Duration,
    /// Timeout for the scheduled maintenance refresh.
    pub maintenance_timeout: Duration,
    /// Background refresh period; `None` leaves refills to the query path.
    pub refresh_interval: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let feed_url = lookup("NEWS_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let source_name =
            lookup("NEWS_SOURCE_NAME").unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());

        let fetch_timeout = seconds(&lookup, "NEWS_FETCH_TIMEOUT_SECS")?.unwrap_or(10);
        let maintenance_timeout = seconds(&lookup, "NEWS_MAINTENANCE_TIMEOUT_SECS")?.unwrap_or(15);
        let refresh_interval = seconds(&lookup, "NEWS_REFRESH_INTERVAL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            feed_url,
            source_name,
            fetch_timeout: Duration::from_secs(fetch_timeout),
            maintenance_timeout: Duration::from_secs(maintenance_timeout),
            refresh_interval,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e)))
        })
        .transpose()
}
