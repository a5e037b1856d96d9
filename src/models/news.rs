use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single news article about one stock, as delivered by a news provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub timestamp: DateTime<Utc>,
    pub stock: String,
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub url: String,
}

impl NewsEvent {
    /// Text that gets scored: title and description joined by a single space.
    /// A missing description is treated as an empty string.
    pub fn content(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or(""))
    }

    /// Calendar date of the event (UTC), time of day discarded.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Sentiment classification for a compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentCategory {
    Negative,
    Neutral,
    Positive,
}

impl std::fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SentimentCategory::Negative => "Negative",
            SentimentCategory::Neutral => "Neutral",
            SentimentCategory::Positive => "Positive",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub compound: f64, // -1.0 to +1.0
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub category: SentimentCategory,
}

/// A news event together with the score of its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    pub event: NewsEvent,
    pub content: String,
    pub score: SentimentScore,
}

impl ScoredEvent {
    pub fn stock(&self) -> &str {
        &self.event.stock
    }

    pub fn date(&self) -> NaiveDate {
        self.event.date()
    }

    pub fn compound(&self) -> f64 {
        self.score.compound
    }
}
