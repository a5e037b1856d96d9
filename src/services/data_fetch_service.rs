use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use crate::config::FetchConfig;
use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{NewsEvent, PriceBar};
use crate::services::failure_cache::{DataFeed, FailureCache, FailureType};
use crate::services::news_service::NewsProvider;
use crate::services::rate_limiter::RateLimiter;

/// Everything the analysis pipeline needs for one run.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub events: Vec<NewsEvent>,
    pub prices: HashMap<String, Vec<PriceBar>>,
}

/// Pulls news and daily bars for a set of stocks from the configured providers.
///
/// A stock whose fetch fails is logged and left out of the snapshot; the
/// pipeline then reports it as skipped.
#[derive(Clone)]
pub struct DataFetchService {
    news: Arc<dyn NewsProvider>,
    prices: Arc<dyn PriceProvider>,
    rate_limiter: RateLimiter,
    failure_cache: FailureCache,
    max_retries: u32,
    retry_backoff: Duration,
}

impl DataFetchService {
    pub fn new(
        news: Arc<dyn NewsProvider>,
        prices: Arc<dyn PriceProvider>,
        config: &FetchConfig,
    ) -> Self {
        Self {
            news,
            prices,
            rate_limiter: RateLimiter::new(config.max_concurrent, config.requests_per_minute),
            failure_cache: FailureCache::new(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }

    pub fn failure_cache(&self) -> &FailureCache {
        &self.failure_cache
    }

    /// Fetch news and prices for every stock in `[start, end]`.
    pub async fn fetch_snapshot(
        &self,
        stocks: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> MarketSnapshot {
        info!("Fetching data for {} stocks from {} to {}", stocks.len(), start, end);
        self.failure_cache.cleanup_expired();

        let fetches = stocks.iter().map(|stock| async move {
            let news = self.fetch_news_for(stock, start, end).await;
            let bars = self.fetch_bars_for(stock, start, end).await;
            (stock.clone(), news, bars)
        });

        let mut snapshot = MarketSnapshot::default();
        for (stock, news, bars) in join_all(fetches).await {
            if let Some(events) = news {
                snapshot.events.extend(events);
            }
            if let Some(bars) = bars {
                snapshot.prices.insert(stock, bars);
            }
        }

        info!(
            "Fetched {} news events and prices for {} stocks",
            snapshot.events.len(),
            snapshot.prices.len()
        );
        snapshot
    }

    async fn fetch_news_for(&self, stock: &str, start: NaiveDate, end: NaiveDate) -> Option<Vec<NewsEvent>> {
        if let Some(failure) = self.failure_cache.is_failed(DataFeed::News, stock) {
            info!("Skipping news fetch for {} - recent failure ({:?})", stock, failure.error_type);
            return None;
        }

        let mut attempt = 0;
        loop {
            let result = match self.rate_limiter.acquire().await {
                Ok(_guard) => self.news.fetch_news(stock, start, end).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(events) => {
                    self.failure_cache.clear(DataFeed::News, stock);
                    return Some(events);
                }
                Err(AppError::RateLimited) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    warn!(
                        "News rate limited for {}, retrying in {:?} (attempt {}/{})",
                        stock, delay, attempt, self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("Failed to fetch news for {}: {}", stock, e);
                    self.failure_cache.record_failure(DataFeed::News, stock, FailureType::from(&e));
                    return None;
                }
            }
        }
    }

    async fn fetch_bars_for(&self, stock: &str, start: NaiveDate, end: NaiveDate) -> Option<Vec<PriceBar>> {
        if let Some(failure) = self.failure_cache.is_failed(DataFeed::Prices, stock) {
            info!("Skipping price fetch for {} - recent failure ({:?})", stock, failure.error_type);
            return None;
        }

        let mut attempt = 0;
        loop {
            let result = match self.rate_limiter.acquire().await {
                Ok(_guard) => self.prices.fetch_daily_bars(stock, start, end).await.map_err(AppError::from),
                Err(e) => Err(e),
            };

            match result {
                Ok(bars) => {
                    self.failure_cache.clear(DataFeed::Prices, stock);
                    return Some(bars);
                }
                Err(AppError::RateLimited) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    warn!(
                        "Prices rate limited for {}, retrying in {:?} (attempt {}/{})",
                        stock, delay, attempt, self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("Failed to fetch prices for {}: {}", stock, e);
                    self.failure_cache.record_failure(DataFeed::Prices, stock, FailureType::from(&e));
                    return None;
                }
            }
        }
    }
}
