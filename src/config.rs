use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::news_service::NewsConfig;

const DEFAULT_STOCKS: &str = "AAPL,MSFT,GOOGL";

/// Limits for outbound provider requests
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_concurrent: usize,
    pub requests_per_minute: u32,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            requests_per_minute: 30,
            max_retries: 3,
            retry_backoff: Duration::from_secs(5),
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent: env_or("FETCH_MAX_CONCURRENT", defaults.max_concurrent),
            requests_per_minute: env_or("FETCH_REQUESTS_PER_MINUTE", defaults.requests_per_minute),
            ..defaults
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub news: NewsConfig,
    pub stocks: Vec<String>,
    pub lookback_days: i64,
    pub output_dir: PathBuf,
    pub sample_seed: u64,
    pub lexicon_overrides_path: Option<PathBuf>,
    pub fetch: FetchConfig,
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        Self {
            news: NewsConfig::from_env(),
            stocks: parse_stock_list(
                &std::env::var("STOCKS").unwrap_or_else(|_| DEFAULT_STOCKS.to_string()),
            ),
            lookback_days: env_or("LOOKBACK_DAYS", 30),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("results")),
            sample_seed: env_or("SAMPLE_SEED", 42),
            lexicon_overrides_path: std::env::var("LEXICON_OVERRIDES_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            fetch: FetchConfig::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.stocks.is_empty() {
            return Err("No stocks configured".to_string());
        }
        if self.lookback_days < 1 {
            return Err(format!("LOOKBACK_DAYS must be positive, got {}", self.lookback_days));
        }
        Ok(())
    }
}

/// Split a comma-separated symbol list, uppercasing and dropping blanks.
pub fn parse_stock_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stock_list() {
        assert_eq!(parse_stock_list(" aapl, MSFT ,,googl "), vec!["AAPL", "MSFT", "GOOGL"]);
        assert!(parse_stock_list("").is_empty());
    }

    #[test]
    fn test_fetch_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.requests_per_minute, 30);
    }

    #[test]
    fn test_validate() {
        let mut config = AnalyzerConfig {
            news: NewsConfig::default(),
            stocks: parse_stock_list(DEFAULT_STOCKS),
            lookback_days: 30,
            output_dir: PathBuf::from("results"),
            sample_seed: 42,
            lexicon_overrides_path: None,
            fetch: FetchConfig::default(),
        };
        assert!(config.validate().is_ok());

        config.lookback_days = 0;
        assert!(config.validate().is_err());

        config.lookback_days = 30;
        config.stocks.clear();
        assert!(config.validate().is_err());
    }
}
