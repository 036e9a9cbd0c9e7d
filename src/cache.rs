use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};
use crate::fetcher::FeedFetcher;
use crate::pipeline::{self, ClassifiedNewsItem, FeedSource};

/// How long a successful refill is served without touching the network.
pub const CACHE_TTL_HOURS: i64 = 6;

pub fn cache_ttl() -> TimeDelta {
    TimeDelta::hours(CACHE_TTL_HOURS)
}

#[derive(Debug)]
pub struct CacheEntry {
    pub items: Arc<Vec<ClassifiedNewsItem>>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(items: Vec<ClassifiedNewsItem>, fetched_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            items: Arc::new(items),
            fetched_at,
            expires_at: fetched_at + ttl,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// What a caller gets back from [`NewsCache::get`].
#[derive(Debug, Clone)]
pub struct NewsSnapshot {
    pub items: Arc<Vec<ClassifiedNewsItem>>,
    /// Served without this call running the pipeline.
    pub cached: bool,
    /// Served past expiry because the refill failed.
    pub stale: bool,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewsSnapshot {
    fn from_entry(entry: &CacheEntry, cached: bool, stale: bool) -> Self {
        Self {
            items: Arc::clone(&entry.items),
            cached,
            stale,
            fetched_at: entry.fetched_at,
            expires_at: entry.expires_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub total_items: usize,
    pub entry: Arc<CacheEntry>,
}

#[derive(Default)]
struct Slot {
    entry: Option<Arc<CacheEntry>>,
    /// Completed refill attempts; lets waiters tell that a refill finished while they queued.
    attempts: u64,
    last_error: Option<AppError>,
}

/// Single-slot feed cache with serve-stale-on-error.
///
/// Refills run under `refill`, so a miss triggers at most one pipeline run; callers that
/// queue behind it take its result instead of fetching again. A caller that drops its
/// future does not cancel the fetch already in progress.
pub struct NewsCache {
    fetcher: Arc<dyn FeedFetcher>,
    source: FeedSource,
    fetch_timeout: Duration,
    ttl: TimeDelta,
    slot: RwLock<Slot>,
    refill: Mutex<()>,
}

impl NewsCache {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, source: FeedSource, fetch_timeout: Duration) -> Self {
        Self {
            fetcher,
            source,
            fetch_timeout,
            ttl: cache_ttl(),
            slot: RwLock::new(Slot::default()),
            refill: Mutex::new(()),
        }
    }

    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    /// Current entry, fresh or not.
    pub async fn peek(&self) -> Option<Arc<CacheEntry>> {
        self.slot.read().await.entry.clone()
    }

    pub async fn get(&self) -> Result<NewsSnapshot> {
        let seen = {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.entry.as_ref().filter(|e| e.is_fresh(Utc::now())) {
                debug!(items = entry.items.len(), "serving cached news");
                return Ok(NewsSnapshot::from_entry(entry, true, false));
            }
            slot.attempts
        };

        let _guard = self.refill.lock().await;

        {
            let slot = self.slot.read().await;
            if slot.attempts != seen {
                return Self::settle(&slot);
            }
        }

        info!(url = %self.source.url, "news cache miss, refilling");
        match self.refill_locked(self.fetch_timeout).await {
            Ok(outcome) => Ok(NewsSnapshot::from_entry(&outcome.entry, false, false)),
            Err(err) => {
                let previous = self.slot.read().await.entry.clone();
                Self::fall_back(previous, err)
            }
        }
    }

    /// Runs the pipeline regardless of TTL. No stale fallback: failures are returned as-is.
    pub async fn refresh(&self, timeout: Duration) -> Result<RefreshOutcome> {
        let _guard = self.refill.lock().await;
        info!(url = %self.source.url, "forced news refresh");
        self.refill_locked(timeout).await
    }

    // Caller must hold `refill`.
    async fn refill_locked(&self, timeout: Duration) -> Result<RefreshOutcome> {
        let result = pipeline::run(self.fetcher.as_ref(), &self.source, timeout).await;

        let mut slot = self.slot.write().await;
        slot.attempts += 1;
        match result {
            Ok(output) => {
                let entry = Arc::new(CacheEntry::new(output.items, Utc::now(), self.ttl));
                slot.entry = Some(Arc::clone(&entry));
                slot.last_error = None;
                info!(
                    items = entry.items.len(),
                    expires_at = %entry.expires_at,
                    "news cache refilled"
                );
                Ok(RefreshOutcome {
                    total_items: output.total_items,
                    entry,
                })
            }
            Err(err) => {
                slot.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // A refill finished while this caller was queued; reuse its result.
    fn settle(slot: &Slot) -> Result<NewsSnapshot> {
        match (&slot.entry, &slot.last_error) {
            (Some(entry), None) => Ok(NewsSnapshot::from_entry(entry, true, false)),
            (Some(entry), Some(_)) if entry.is_fresh(Utc::now()) => {
                Ok(NewsSnapshot::from_entry(entry, true, false))
            }
            (entry, Some(err)) => Self::fall_back(entry.clone(), err.clone()),
            (None, None) => Err(AppError::EmptyCache("no refill has completed".to_string())),
        }
    }

    fn fall_back(previous: Option<Arc<CacheEntry>>, err: AppError) -> Result<NewsSnapshot> {
        match previous {
            Some(entry) => {
                warn!(
                    error = %err,
                    fetched_at = %entry.fetched_at,
                    "refill failed, serving stale news"
                );
                Ok(NewsSnapshot::from_entry(&entry, true, true))
            }
            None => {
                error!(error = %err, "refill failed with nothing cached");
                Err(AppError::EmptyCache(err.to_string()))
            }
        }
    }
}
