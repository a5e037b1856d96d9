//! Seeded sample data for demos and tests.
//!
//! Used when no news API key is configured. Output depends only on the seed, the stock
//! symbol and the date range, never on call order.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::errors::AppError;
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{NewsEvent, PriceBar};
use crate::services::news_service::NewsProvider;

const POSITIVE_NEWS: &[&str] = &[
    "reports record profits",
    "exceeds expectations",
    "announces new product",
    "expands into new markets",
    "increases dividend",
];

const NEGATIVE_NEWS: &[&str] = &[
    "misses earnings expectations",
    "announces layoffs",
    "faces regulatory issues",
    "product recall affects sales",
    "stock downgraded",
];

const NEUTRAL_NEWS: &[&str] = &[
    "appoints new board member",
    "to present at conference",
    "releases annual report",
    "announces earnings date",
    "updates corporate policies",
];

const SOURCES: &[&str] = &["MarketWatch", "Bloomberg", "CNBC", "Reuters"];

/// Share of calendar days that get an article, per stock
const NEWS_PER_DAY: f64 = 0.2;

const PRICE_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone, Copy)]
pub struct SampleDataProvider {
    seed: u64,
}

impl SampleDataProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, stock: &str, stream: u64) -> StdRng {
        // FNV-1a so the per-stock seed is stable across builds
        let hash = stock
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
        StdRng::seed_from_u64(self.seed ^ hash ^ stream)
    }

    /// Articles for `stock` on random days between `start` and `end`.
    pub fn generate_news(&self, stock: &str, start: NaiveDate, end: NaiveDate) -> Vec<NewsEvent> {
        if end < start {
            return Vec::new();
        }
        let days = (end - start).num_days() + 1;
        let count = (days as f64 * NEWS_PER_DAY) as usize;
        let mut rng = self.rng_for(stock, 0);

        let pick = |rng: &mut StdRng, pool: &[&'static str]| -> &'static str {
            pool.choose(rng).copied().unwrap_or_default()
        };

        let mut events: Vec<NewsEvent> = (0..count)
            .map(|n| {
                let date = start + Duration::days(rng.random_range(0..days));
                let minute_of_day = rng.random_range(0..24 * 60);
                let timestamp = (date.and_time(NaiveTime::default())
                    + Duration::minutes(minute_of_day))
                .and_utc();

                let roll: f64 = rng.random();
                let pool = if roll < 0.4 {
                    POSITIVE_NEWS
                } else if roll < 0.8 {
                    NEGATIVE_NEWS
                } else {
                    NEUTRAL_NEWS
                };

                NewsEvent {
                    timestamp,
                    stock: stock.to_string(),
                    title: format!("{} {}", stock, pick(&mut rng, pool)),
                    description: Some(format!("The company {}.", pick(&mut rng, pool))),
                    source: pick(&mut rng, SOURCES).to_string(),
                    url: format!("https://example.com/news/{}-{}", stock.to_lowercase(), n),
                }
            })
            .collect();

        events.sort_by_key(|e| e.timestamp);
        events
    }

    /// Random-walk daily bars on weekdays between `start` and `end`.
    pub fn generate_bars(&self, stock: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
        let mut rng = self.rng_for(stock, PRICE_STREAM);
        let mut close = 50.0 + rng.random::<f64>() * 250.0;
        let mut bars = Vec::new();

        let mut date = start;
        while date <= end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let open = close * (1.0 + (rng.random::<f64>() - 0.5) * 0.01);
                close = (open * (1.0 + (rng.random::<f64>() - 0.5) * 0.04)).max(1.0);
                let high = open.max(close) * (1.0 + rng.random::<f64>() * 0.01);
                let low = open.min(close) * (1.0 - rng.random::<f64>() * 0.01);
                let volume = rng.random_range(1_000_000..5_000_000);
                bars.push(PriceBar::new(date, open, high, low, close, volume));
            }
            date += Duration::days(1);
        }

        bars
    }
}

#[async_trait]
impl NewsProvider for SampleDataProvider {
    async fn fetch_news(
        &self,
        stock: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NewsEvent>, AppError> {
        Ok(self.generate_news(stock, start, end))
    }
}

#[async_trait]
impl PriceProvider for SampleDataProvider {
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError> {
        Ok(self.generate_bars(ticker, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_same_seed_same_data() {
        let (start, end) = range();
        let a = SampleDataProvider::new(7);
        let b = SampleDataProvider::new(7);

        // generating another stock first must not change the result
        b.generate_news("MSFT", start, end);
        assert_eq!(a.generate_news("AAPL", start, end), b.generate_news("AAPL", start, end));
        assert_eq!(a.generate_bars("AAPL", start, end), b.generate_bars("AAPL", start, end));
    }

    #[test]
    fn test_different_seed_different_data() {
        let (start, end) = range();
        let a = SampleDataProvider::new(1).generate_news("AAPL", start, end);
        let b = SampleDataProvider::new(2).generate_news("AAPL", start, end);
        assert_ne!(a, b);
    }

    #[test]
    fn test_news_volume_and_shape() {
        let (start, end) = range();
        let events = SampleDataProvider::new(42).generate_news("AAPL", start, end);

        // 60 calendar days * 0.2
        assert_eq!(events.len(), 12);
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        for event in &events {
            assert!(event.title.starts_with("AAPL "));
            assert!(event.date() >= start && event.date() <= end);
            assert!(SOURCES.contains(&event.source.as_str()));
            assert!(event.url.starts_with("https://example.com/news/aapl-"));
        }
    }

    #[test]
    fn test_bars_skip_weekends_and_are_consistent() {
        let (start, end) = range();
        let bars = SampleDataProvider::new(42).generate_bars("AAPL", start, end);

        assert!(!bars.is_empty());
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        for bar in &bars {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.high >= bar.open.max(bar.close));
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let (start, end) = range();
        let provider = SampleDataProvider::new(42);
        assert!(provider.generate_news("AAPL", end, start).is_empty());
        assert!(provider.generate_bars("AAPL", end, start).is_empty());
    }
}
