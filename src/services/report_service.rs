use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use crate::models::{
    AnalysisReport, CategoryCount, DailySentimentSummary, PriceBar, ScoredEvent,
    SentimentCategory, VolumeVolatility,
};
use crate::services::correlation_service::classify_correlation_strength;

/// Article counts per (stock, category), ordered by stock then category.
pub fn category_counts(scored_events: &[ScoredEvent]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<(&str, SentimentCategory), usize> = BTreeMap::new();
    for scored in scored_events {
        *counts.entry((scored.stock(), scored.score.category)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((stock, category), count)| CategoryCount {
            stock: stock.to_string(),
            category,
            count,
        })
        .collect()
}

/// Mean intraday volatility of trading days grouped by article count.
///
/// Trading days without news fall in the `news_count == 0` group. This only fills the
/// count for display; no sentiment value is implied for those days.
pub fn volatility_by_news_volume(
    stock: &str,
    price_bars: &[PriceBar],
    daily: &[DailySentimentSummary],
) -> Vec<VolumeVolatility> {
    let counts: BTreeMap<_, _> = daily
        .iter()
        .filter(|d| d.stock == stock)
        .map(|d| (d.date, d.news_count))
        .collect();

    let mut groups: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
    for bar in price_bars {
        let Some(volatility) = bar.intraday_volatility_pct() else { continue };
        let news_count = counts.get(&bar.date).copied().unwrap_or(0);
        let group = groups.entry(news_count).or_insert((0.0, 0));
        group.0 += volatility;
        group.1 += 1;
    }

    groups
        .into_iter()
        .map(|(news_count, (sum, days))| VolumeVolatility {
            stock: stock.to_string(),
            news_count,
            avg_volatility: sum / days as f64,
            trading_days: days,
        })
        .collect()
}

/// Plain-text summary of a pipeline run.
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:<8} {:>12} {:>10} {:>14} {:>6}", "STOCK", "CORRELATION", "STRENGTH", "AVG SENTIMENT", "NEWS");
    for result in &report.results {
        let (corr, strength) = match result.correlation {
            Some(c) => (format!("{:.4}", c), classify_correlation_strength(c)),
            None => ("n/a".to_string(), "-"),
        };
        let _ = writeln!(
            out,
            "{:<8} {:>12} {:>10} {:>14.4} {:>6}",
            result.stock, corr, strength, result.avg_sentiment, result.news_count
        );
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out);
        for skipped in &report.skipped {
            let _ = writeln!(out, "skipped {}: {}", skipped.stock, skipped.reason);
        }
    }

    let counts = category_counts(&report.scored_events);
    if !counts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sentiment distribution:");
        for count in counts {
            let _ = writeln!(out, "  {:<8} {:<9} {}", count.stock, count.category, count.count);
        }
    }

    out
}

/// Volatility-by-news-volume table for every analyzed stock.
pub fn render_volatility(report: &AnalysisReport, prices: &HashMap<String, Vec<PriceBar>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:>6} {:>14} {:>6}", "STOCK", "NEWS", "AVG VOL %", "DAYS");

    for detail in &report.details {
        let stock = &detail.result.stock;
        let bars = prices.get(stock).map(Vec::as_slice).unwrap_or(&[]);
        for group in volatility_by_news_volume(stock, bars, &detail.daily) {
            let _ = writeln!(
                out,
                "{:<8} {:>6} {:>14.4} {:>6}",
                group.stock, group.news_count, group.avg_volatility, group.trading_days
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CorrelationResult, NewsEvent, SentimentScore, SkipReason, SkippedStock};
    use crate::services::sentiment_service::categorize;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    fn scored(stock: &str, compound: f64) -> ScoredEvent {
        ScoredEvent {
            event: NewsEvent {
                timestamp: Utc.with_ymd_and_hms(2023, 1, 2, 9, 0, 0).unwrap(),
                stock: stock.to_string(),
                title: "t".to_string(),
                description: None,
                source: "Reuters".to_string(),
                url: "https://example.com/news/t".to_string(),
            },
            content: "t ".to_string(),
            score: SentimentScore { compound, positive: 0.0, negative: 0.0, neutral: 1.0, category: categorize(compound) },
        }
    }

    #[test]
    fn test_category_counts_are_grouped_and_ordered() {
        let events = vec![scored("MSFT", 0.5), scored("AAPL", -0.5), scored("AAPL", 0.6), scored("AAPL", 0.9)];
        let counts = category_counts(&events);

        assert_eq!(counts.len(), 3);
        assert_eq!((counts[0].stock.as_str(), counts[0].category, counts[0].count), ("AAPL", SentimentCategory::Negative, 1));
        assert_eq!((counts[1].stock.as_str(), counts[1].category, counts[1].count), ("AAPL", SentimentCategory::Positive, 2));
        assert_eq!((counts[2].stock.as_str(), counts[2].category, counts[2].count), ("MSFT", SentimentCategory::Positive, 1));
    }

    #[test]
    fn test_volatility_groups_treat_missing_news_as_zero() {
        let bars = vec![
            PriceBar::new(date(2), 100.0, 102.0, 98.0, 101.0, 10),  // 4%
            PriceBar::new(date(3), 100.0, 101.0, 99.0, 100.0, 10),  // 2%
            PriceBar::new(date(4), 200.0, 212.0, 200.0, 210.0, 10), // 6%
            PriceBar::new(date(5), 0.0, 1.0, 0.0, 1.0, 10),         // skipped
        ];
        let daily = vec![DailySentimentSummary {
            date: date(4),
            stock: "AAPL".to_string(),
            mean_compound: 0.3,
            news_count: 2,
        }];

        let groups = volatility_by_news_volume("AAPL", &bars, &daily);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].news_count, 0);
        assert_eq!(groups[0].trading_days, 2);
        assert!((groups[0].avg_volatility - 3.0).abs() < 1e-12);
        assert_eq!(groups[1].news_count, 2);
        assert!((groups[1].avg_volatility - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_render_summary_marks_null_correlation() {
        let report = AnalysisReport {
            scored_events: vec![scored("AAPL", 0.5)],
            results: vec![
                CorrelationResult { stock: "AAPL".to_string(), correlation: None, avg_sentiment: 0.5, news_count: 1 },
                CorrelationResult { stock: "MSFT".to_string(), correlation: Some(0.82), avg_sentiment: 0.1, news_count: 9 },
            ],
            details: vec![],
            skipped: vec![SkippedStock { stock: "TSLA".to_string(), reason: SkipReason::NoPriceData }],
        };

        let text = render_summary(&report);
        let aapl = text.lines().find(|l| l.starts_with("AAPL")).unwrap();
        assert!(aapl.contains("n/a"));
        let msft = text.lines().find(|l| l.starts_with("MSFT")).unwrap();
        assert!(msft.contains("0.8200") && msft.contains("strong"));
        assert!(text.contains("skipped TSLA: no price data"));
    }

    #[test]
    fn test_render_volatility_lists_groups() {
        let bars = vec![
            PriceBar::new(date(2), 100.0, 102.0, 98.0, 101.0, 10),
            PriceBar::new(date(3), 100.0, 101.0, 99.0, 100.0, 10),
        ];
        let daily = vec![DailySentimentSummary { date: date(2), stock: "AAPL".to_string(), mean_compound: 0.4, news_count: 1 }];
        let result = CorrelationResult { stock: "AAPL".to_string(), correlation: None, avg_sentiment: 0.4, news_count: 1 };
        let report = AnalysisReport {
            details: vec![crate::models::StockAnalysis {
                result: result.clone(),
                diagnostic: crate::models::CorrelationDiagnostic::InsufficientPairs { pairs: 1 },
                daily,
                aligned: vec![],
            }],
            results: vec![result],
            ..AnalysisReport::default()
        };
        let prices = HashMap::from([("AAPL".to_string(), bars)]);

        let text = render_volatility(&report, &prices);
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("AAPL") && rows[0].contains("2.0000"));
        assert!(rows[1].contains("4.0000"));
    }
}
