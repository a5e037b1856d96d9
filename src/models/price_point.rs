use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// One trading day of OHLCV data for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self { date, open, high, low, close, volume }
    }

    /// Intraday range as a percentage of the open, `None` when the open is not positive.
    pub fn intraday_volatility_pct(&self) -> Option<f64> {
        if self.open > 0.0 && self.open.is_finite() {
            Some((self.high - self.low) / self.open * 100.0)
        } else {
            None
        }
    }
}
