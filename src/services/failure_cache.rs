use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

use crate::errors::AppError;

/// Which feed a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFeed {
    News,
    Prices,
}

/// Information about a failed fetch for a stock
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub ttl_hours: i64,
}

impl FailureInfo {
    fn expires_at(&self) -> DateTime<Utc> {
        self.failed_at + Duration::hours(self.ttl_hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureType {
    NotFound,       // Symbol unknown to the provider
    RateLimited,    // Temporary rate limit
    ApiError,       // Everything else
}

impl FailureType {
    fn ttl_hours(&self) -> i64 {
        match self {
            FailureType::NotFound => 24,
            FailureType::RateLimited => 1,
            FailureType::ApiError => 6,
        }
    }
}

impl From<&AppError> for FailureType {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::NotFound(_) => FailureType::NotFound,
            AppError::RateLimited => FailureType::RateLimited,
            _ => FailureType::ApiError,
        }
    }
}

/// Thread-safe record of recent fetch failures per (feed, stock).
/// Lets repeated monitoring runs skip stocks that are known to fail.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<(DataFeed, String), FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live failure for this stock, if any. Expired entries are evicted.
    pub fn is_failed(&self, feed: DataFeed, stock: &str) -> Option<FailureInfo> {
        self.is_failed_at(feed, stock, Utc::now())
    }

    fn is_failed_at(&self, feed: DataFeed, stock: &str, now: DateTime<Utc>) -> Option<FailureInfo> {
        let key = (feed, stock.to_string());
        let info = self.cache.get(&key).map(|entry| entry.value().clone())?;

        if now < info.expires_at() {
            Some(info)
        } else {
            self.cache.remove(&key);
            None
        }
    }

    pub fn record_failure(&self, feed: DataFeed, stock: &str, error_type: FailureType) {
        self.record_failure_at(feed, stock, error_type, Utc::now());
    }

    fn record_failure_at(&self, feed: DataFeed, stock: &str, error_type: FailureType, at: DateTime<Utc>) {
        let info = FailureInfo {
            failed_at: at,
            error_type,
            ttl_hours: error_type.ttl_hours(),
        };
        self.cache.insert((feed, stock.to_string()), info);
    }

    /// Forget a stock's failure (e.g., after a successful fetch)
    pub fn clear(&self, feed: DataFeed, stock: &str) {
        self.cache.remove(&(feed, stock.to_string()));
    }

    /// Drop every expired entry
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.cache.retain(|_, info| now < info.expires_at());
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
