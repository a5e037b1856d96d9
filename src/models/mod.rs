mod news;
mod price_point;
mod sentiment;
pub mod sector;

pub use news::{NewsEvent, ScoredEvent, SentimentCategory, SentimentScore};
pub use price_point::PriceBar;
pub use sector::{stocks_for_sectors, Sector};
pub use sentiment::{
    AlignedRow, AnalysisReport, CategoryCount, CorrelationDiagnostic, CorrelationResult,
    DailySentimentSummary, SkipReason, SkippedStock, StockAnalysis, VolumeVolatility,
};
