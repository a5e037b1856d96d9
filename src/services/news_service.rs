use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::NewsEvent;
use crate::utils::clean_text;

const NEWSAPI_BASE_URL: &str = "https://newsapi.org";

/// Configuration for news retrieval
#[derive(Debug, Clone, Default)]
pub struct NewsConfig {
    pub api_key: Option<String>,
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NEWS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }

    /// Real news needs a key; without one the sample generator is used.
    pub fn use_live_sources(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Trait for news providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(
        &self,
        stock: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NewsEvent>, AppError>;
}

/// NewsAPI "everything" endpoint
pub struct NewsApiProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl NewsApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, NEWSAPI_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn request_url(&self, stock: &str, start: NaiveDate, end: NaiveDate) -> Result<url::Url, AppError> {
        url::Url::parse_with_params(
            &format!("{}/v2/everything", self.base_url),
            &[
                ("q", stock.to_string()),
                ("from", start.format("%Y-%m-%d").to_string()),
                ("to", end.format("%Y-%m-%d").to_string()),
                ("language", "en".to_string()),
                ("apiKey", self.api_key.clone()),
            ],
        )
        .map_err(|e| AppError::Validation(format!("Invalid news API URL: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

fn to_events(response: NewsApiResponse, stock: &str) -> Result<Vec<NewsEvent>, AppError> {
    if response.status != "ok" {
        return Err(AppError::External(format!(
            "News API returned status '{}': {}",
            response.status,
            response.message.unwrap_or_default()
        )));
    }

    let events = response
        .articles
        .into_iter()
        .filter_map(|article| {
            let timestamp = match DateTime::parse_from_rfc3339(&article.published_at) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    warn!("Skipping article with unparseable date '{}': {}", article.published_at, e);
                    return None;
                }
            };

            let description = article
                .description
                .map(|d| clean_text(&d))
                .filter(|d| !d.is_empty());

            Some(NewsEvent {
                timestamp,
                stock: stock.to_string(),
                title: article.title.unwrap_or_default(),
                description,
                source: article.source.and_then(|s| s.name).unwrap_or_default(),
                url: article.url.unwrap_or_default(),
            })
        })
        .collect();

    Ok(events)
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch_news(
        &self,
        stock: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NewsEvent>, AppError> {
        info!("Fetching news from NewsAPI for {}", stock);

        let url = self.request_url(stock, start, end)?;
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("NewsAPI request failed: {}", e);
            AppError::External(format!("News API error: {}", e))
        })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("NewsAPI error {}: {}", status, error_text);
            return Err(AppError::External(format!(
                "News API returned error {}: {}",
                status, error_text
            )));
        }

        let body: NewsApiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse NewsAPI response: {}", e);
            AppError::External(format!("Failed to parse news response: {}", e))
        })?;

        let events = to_events(body, stock)?;
        info!("Fetched {} news articles for {}", events.len(), stock);
        Ok(events)
    }
}
