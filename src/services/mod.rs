pub mod aggregation_service;
pub mod alignment_service;
pub mod analysis_service;
pub mod correlation_service;
pub mod csv_export_service;
pub mod data_fetch_service;
pub mod failure_cache;
pub mod lexicon;
pub mod monitor_service;
pub mod news_service;
pub mod rate_limiter;
pub mod report_service;
pub mod sentiment_service;
