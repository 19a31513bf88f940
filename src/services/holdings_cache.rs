use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::models::{HoldingsFile, Quarter};

#[derive(Debug, Clone)]
struct CachedFile {
    file: Arc<HoldingsFile>,
    cached_at: DateTime<Utc>,
}

/// Thread-safe TTL cache of parsed filings, keyed by investor and quarter.
///
/// Passed around explicitly (see `AppState`) rather than living in a global.
#[derive(Clone)]
pub struct HoldingsCache {
    cache: Arc<DashMap<String, CachedFile>>,
    ttl: Duration,
}

impl HoldingsCache {
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            ttl,
        }
    }

    fn key(investor: &str, quarter: Quarter) -> String {
        format!("{}-{}", investor, quarter)
    }

    /// Cached filing if present and still within TTL
    pub fn get(&self, investor: &str, quarter: Quarter) -> Option<Arc<HoldingsFile>> {
        let key = Self::key(investor, quarter);
        if let Some(entry) = self.cache.get(&key) {
            if is_fresh(entry.cached_at, self.ttl, Utc::now()) {
                return Some(entry.file.clone());
            }
            drop(entry); // Release the read lock before removing
            self.cache.remove(&key);
        }
        None
    }

    pub fn insert(&self, investor: &str, quarter: Quarter, file: Arc<HoldingsFile>) {
        self.cache.insert(
            Self::key(investor, quarter),
            CachedFile {
                file,
                cached_at: Utc::now(),
            },
        );
    }

    /// Drop a filing, e.g. after re-ingestion overwrote it on disk
    pub fn invalidate(&self, investor: &str, quarter: Quarter) {
        self.cache.remove(&Self::key(investor, quarter));
    }

    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        let ttl = self.ttl;
        self.cache.retain(|_, entry| is_fresh(entry.cached_at, ttl, now));
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

// A TTL reaching past the representable date range never expires
fn is_fresh(cached_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    cached_at
        .checked_add_signed(ttl)
        .map_or(true, |expires_at| now < expires_at)
}

impl Default for HoldingsCache {
    fn default() -> Self {
        Self::new(Duration::minutes(Self::DEFAULT_TTL_MINUTES))
    }
}
