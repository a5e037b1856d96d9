use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{SentimentCategory, ScoredEvent};

/// Mean sentiment of one stock on one calendar date.
/// Only dates with at least one article get a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentimentSummary {
    pub date: NaiveDate,
    pub stock: String,
    pub mean_compound: f64,
    pub news_count: usize,
}

/// One trading day with the sentiment of that day joined on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub stock: String,
    pub close: f64,
    pub next_day_return: Option<f64>, // percent
    pub mean_compound: Option<f64>,   // None means no news, not zero sentiment
    pub news_count: usize,
}

/// Sentiment vs. next-day return for one stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub stock: String,
    pub correlation: Option<f64>, // -1 to +1, None when undefined
    pub avg_sentiment: f64,
    pub news_count: usize,
}

/// Why a correlation does or does not have a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationDiagnostic {
    Computed { pairs: usize },
    InsufficientPairs { pairs: usize },
    ZeroVariance { pairs: usize },
}

impl CorrelationDiagnostic {
    pub fn pairs(&self) -> usize {
        match *self {
            CorrelationDiagnostic::Computed { pairs }
            | CorrelationDiagnostic::InsufficientPairs { pairs }
            | CorrelationDiagnostic::ZeroVariance { pairs } => pairs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoPriceData,
    NoNewsData,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoPriceData => write!(f, "no price data"),
            SkipReason::NoNewsData => write!(f, "no news data"),
        }
    }
}

/// A requested stock that was left out of the results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStock {
    pub stock: String,
    pub reason: SkipReason,
}

/// Everything computed for a single stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub result: CorrelationResult,
    pub diagnostic: CorrelationDiagnostic,
    pub daily: Vec<DailySentimentSummary>,
    pub aligned: Vec<AlignedRow>,
}

/// Output of one full pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub scored_events: Vec<ScoredEvent>,
    pub results: Vec<CorrelationResult>,
    pub details: Vec<StockAnalysis>,
    pub skipped: Vec<SkippedStock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub stock: String,
    pub category: SentimentCategory,
    pub count: usize,
}

/// Average intraday volatility of trading days grouped by how many articles they had
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeVolatility {
    pub stock: String,
    pub news_count: usize,
    pub avg_volatility: f64,
    pub trading_days: usize,
}
