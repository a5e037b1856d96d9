use crate::models::{AlignedRow, CorrelationDiagnostic, CorrelationResult, ScoredEvent};

/// Rounding slack, in ulps of the largest magnitude, left over after centering a flat series
const FLAT_SERIES_ULPS: f64 = 16.0;

/// Minimum number of (sentiment, return) pairs for a correlation
const MIN_PAIRS: usize = 2;

/// Calculate Pearson correlation coefficient.
/// `None` when the series differ in length, have fewer than two points, either is flat,
/// or the sums overflow.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < MIN_PAIRS {
        return None;
    }

    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let (numerator, sum_sq_x, sum_sq_y) = x.iter().zip(y.iter()).fold(
        (0.0, 0.0, 0.0),
        |(num, sx, sy), (&xi, &yi)| {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            (num + dx * dy, sx + dx * dx, sy + dy * dy)
        },
    );

    if !(numerator.is_finite() && sum_sq_x.is_finite() && sum_sq_y.is_finite()) {
        return None;
    }
    if is_flat(x, sum_sq_x) || is_flat(y, sum_sq_y) {
        return None;
    }

    let r = numerator / (sum_sq_x.sqrt() * sum_sq_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Zero variance up to rounding. The threshold scales with the series' magnitude.
fn is_flat(values: &[f64], sum_sq_dev: f64) -> bool {
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let noise = FLAT_SERIES_ULPS * f64::EPSILON * scale;
    sum_sq_dev <= values.len() as f64 * noise * noise
}

/// Rows where both the day's mean sentiment and its next-day return are known.
pub fn paired_observations(rows: &[AlignedRow]) -> (Vec<f64>, Vec<f64>) {
    rows.iter()
        .filter_map(|r| match (r.mean_compound, r.next_day_return) {
            (Some(sentiment), Some(ret)) => Some((sentiment, ret)),
            _ => None,
        })
        .unzip()
}

/// Correlate daily sentiment with next-day return for one stock.
///
/// `avg_sentiment` and `news_count` cover every scored event of the stock, including
/// those on days without price data. The correlation only uses complete pairs.
pub fn correlate(stock: &str, scored_events: &[ScoredEvent], aligned_rows: &[AlignedRow]) -> CorrelationResult {
    correlate_with_diagnostic(stock, scored_events, aligned_rows).0
}

/// Same as [`correlate`], also reporting why a correlation is missing.
pub fn correlate_with_diagnostic(
    stock: &str,
    scored_events: &[ScoredEvent],
    aligned_rows: &[AlignedRow],
) -> (CorrelationResult, CorrelationDiagnostic) {
    let compounds: Vec<f64> = scored_events
        .iter()
        .filter(|e| e.stock() == stock)
        .map(|e| e.compound())
        .collect();

    let news_count = compounds.len();
    let avg_sentiment = if news_count > 0 {
        compounds.iter().sum::<f64>() / news_count as f64
    } else {
        0.0
    };

    let (sentiment, returns) = paired_observations(aligned_rows);
    let pairs = sentiment.len();
    let correlation = pearson_correlation(&sentiment, &returns);

    let diagnostic = match correlation {
        Some(_) => CorrelationDiagnostic::Computed { pairs },
        None if pairs < MIN_PAIRS => CorrelationDiagnostic::InsufficientPairs { pairs },
        None => CorrelationDiagnostic::ZeroVariance { pairs },
    };

    (
        CorrelationResult {
            stock: stock.to_string(),
            correlation,
            avg_sentiment,
            news_count,
        },
        diagnostic,
    )
}

/// Classify correlation strength
pub fn classify_correlation_strength(correlation: f64) -> &'static str {
    let abs_corr = correlation.abs();
    if abs_corr >= 0.7 {
        "strong"
    } else if abs_corr >= 0.4 {
        "moderate"
    } else {
        "weak"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsEvent, SentimentScore};
    use crate::services::sentiment_service::categorize;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn row(day: u32, mean: Option<f64>, ret: Option<f64>) -> AlignedRow {
        AlignedRow {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            stock: "AAPL".to_string(),
            close: 100.0,
            next_day_return: ret,
            mean_compound: mean,
            news_count: usize::from(mean.is_some()),
        }
    }

    fn scored(stock: &str, compound: f64) -> ScoredEvent {
        ScoredEvent {
            event: NewsEvent {
                timestamp: Utc.with_ymd_and_hms(2023, 1, 7, 12, 0, 0).unwrap(),
                stock: stock.to_string(),
                title: "headline".to_string(),
                description: None,
                source: "CNBC".to_string(),
                url: "https://example.com/news/x".to_string(),
            },
            content: "headline ".to_string(),
            score: SentimentScore {
                compound,
                positive: 0.0,
                negative: 0.0,
                neutral: 1.0,
                category: categorize(compound),
            },
        }
    }

    #[test]
    fn test_pearson_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = pearson_correlation(&x, &y).unwrap();
        assert!((corr - 1.0).abs() < 1e-12);

        let inverse: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson_correlation(&x, &inverse).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined_cases() {
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), None);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[3.0]), None);
        assert_eq!(pearson_correlation(&[0.3, 0.3, 0.3], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson_correlation(&[0.1, 0.1, 0.1, 0.1], &[4.0, 1.0, 2.0, 3.0]), None);
        assert_eq!(pearson_correlation(&[0.0, 0.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn test_small_spread_is_not_flat() {
        let corr = pearson_correlation(&[0.1, 0.1000001, 0.1000002], &[1.0, 2.0, 3.0]).unwrap();
        assert!((corr - 1.0).abs() < 1e-6);

        // Same shape at a tiny absolute scale
        let corr = pearson_correlation(&[1e-9, 2e-9, 3e-9], &[3e-9, 2e-9, 1e-9]).unwrap();
        assert!((corr + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_series_is_null() {
        assert_eq!(pearson_correlation(&[0.0, 0.1, 0.2], &[1e300, -1e300, 1e300]), None);
        assert_eq!(pearson_correlation(&[0.0, 0.1, 0.2], &[f64::INFINITY, -100.0, 100.0]), None);
    }

    #[test]
    fn test_increasing_series_correlate_perfectly() {
        let rows = vec![
            row(2, Some(-0.4), Some(-1.0)),
            row(3, Some(-0.2), Some(0.0)),
            row(4, Some(0.0), Some(1.0)),
            row(5, Some(0.2), Some(2.0)),
            row(6, Some(0.4), None),
        ];
        let events = vec![scored("AAPL", 0.4), scored("AAPL", -0.2)];

        let (result, diagnostic) = correlate_with_diagnostic("AAPL", &events, &rows);
        assert!((result.correlation.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(diagnostic, CorrelationDiagnostic::Computed { pairs: 4 });
        assert!((result.avg_sentiment - 0.1).abs() < 1e-12);
        assert_eq!(result.news_count, 2);
    }

    #[test]
    fn test_incomplete_pairs_are_excluded_pairwise() {
        let rows = vec![
            row(2, Some(0.1), Some(1.0)),
            row(3, None, Some(50.0)),
            row(4, Some(0.3), Some(3.0)),
            row(5, Some(0.9), None),
            row(6, Some(0.5), Some(5.0)),
        ];
        let result = correlate("AAPL", &[scored("AAPL", 0.2)], &rows);
        assert!((result.correlation.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_pairs_is_null_not_zero() {
        let rows = vec![row(2, Some(0.5), Some(1.0)), row(3, None, Some(2.0)), row(4, Some(0.1), None)];
        let (result, diagnostic) = correlate_with_diagnostic("AAPL", &[scored("AAPL", 0.5)], &rows);
        assert_eq!(result.correlation, None);
        assert_eq!(diagnostic, CorrelationDiagnostic::InsufficientPairs { pairs: 1 });
    }

    #[test]
    fn test_zero_variance_is_null() {
        let rows = vec![
            row(2, Some(0.5), Some(1.0)),
            row(3, Some(0.5), Some(-2.0)),
            row(4, Some(0.5), Some(3.0)),
        ];
        let (result, diagnostic) = correlate_with_diagnostic("AAPL", &[scored("AAPL", 0.5)], &rows);
        assert_eq!(result.correlation, None);
        assert_eq!(diagnostic, CorrelationDiagnostic::ZeroVariance { pairs: 3 });
    }

    #[test]
    fn test_summary_stats_ignore_other_stocks() {
        let events = vec![scored("AAPL", 0.6), scored("MSFT", -0.9), scored("AAPL", 0.2)];
        let result = correlate("AAPL", &events, &[]);
        assert_eq!(result.news_count, 2);
        assert!((result.avg_sentiment - 0.4).abs() < 1e-12);
        assert_eq!(result.correlation, None);
    }

    #[test]
    fn test_strength_bands_are_symmetric() {
        // Lower band edges are inclusive
        let cases = [
            (1.0, "strong"),
            (0.7, "strong"),
            (0.6999, "moderate"),
            (0.4, "moderate"),
            (0.3999, "weak"),
            (0.0, "weak"),
        ];
        for (corr, band) in cases {
            assert_eq!(classify_correlation_strength(corr), band, "r = {}", corr);
            assert_eq!(classify_correlation_strength(-corr), band, "r = {}", -corr);
        }
    }
}
