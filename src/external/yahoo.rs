use crate::external::price_provider::{normalize_bars, PriceProvider, PriceProviderError};
use crate::models::PriceBar;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn parse_chart(body: YahooChartResponse, ticker: &str) -> Result<Vec<PriceBar>, PriceProviderError> {
    if let Some(err) = body.chart.error {
        if !err.is_null() {
            return Err(PriceProviderError::NotFound(format!("{ticker}: {err}")));
        }
    }

    let result = body.chart.result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| PriceProviderError::BadResponse("missing result".into()))?;

    // timestamp aligns with every quote list by index
    let quote = result.indicators.quote
        .into_iter()
        .next()
        .ok_or_else(|| PriceProviderError::BadResponse("missing quote".into()))?;

    let mut out = Vec::with_capacity(result.timestamp.len());

    for (i, ts) in result.timestamp.iter().enumerate() {
        let field = |values: &Vec<Option<f64>>| values.get(i).copied().flatten();

        // skip rows with any missing price
        let (Some(open), Some(high), Some(low), Some(close)) =
            (field(&quote.open), field(&quote.high), field(&quote.low), field(&quote.close))
        else {
            continue;
        };
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

        let dt = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| PriceProviderError::Parse("bad timestamp".into()))?;

        out.push(PriceBar::new(dt.date_naive(), open, high, low, close, volume));
    }

    Ok(normalize_bars(out))
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError> {
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end + Duration::days(1));

        let url = format!(
            "{}/v8/finance/chart/{ticker}?period1={period1}&period2={period2}&interval=1d",
            self.base_url
        );

        let resp = self.client
            .get(url)
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0 (news-impact-analyzer)")
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(PriceProviderError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => return Err(PriceProviderError::NotFound(ticker.to_string())),
            status if !status.is_success() => {
                return Err(PriceProviderError::BadResponse(format!("HTTP {status}")))
            }
            _ => {}
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_chart(body, ticker)
    }
}
