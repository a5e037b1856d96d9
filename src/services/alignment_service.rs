use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{AlignedRow, DailySentimentSummary, PriceBar};

/// Percentage change from `close` to `next_close`. `None` when `close` cannot be divided
/// by or the change overflows.
pub fn forward_return(close: f64, next_close: f64) -> Option<f64> {
    if close == 0.0 || !close.is_finite() || !next_close.is_finite() {
        return None;
    }
    let pct = (next_close - close) / close * 100.0;
    pct.is_finite().then_some(pct)
}

/// Left-join daily sentiment onto the trading calendar given by `price_bars`.
///
/// Every bar produces exactly one row. Days without a summary get `mean_compound: None`
/// and `news_count: 0`; summaries dated on non-trading days are dropped. The last row
/// has no next-day return.
pub fn align(
    stock: &str,
    price_bars: &[PriceBar],
    daily_summaries: &[DailySentimentSummary],
) -> Vec<AlignedRow> {
    let by_date: HashMap<NaiveDate, &DailySentimentSummary> = daily_summaries
        .iter()
        .filter(|s| s.stock == stock)
        .map(|s| (s.date, s))
        .collect();

    price_bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let next_day_return = price_bars
                .get(i + 1)
                .and_then(|next| forward_return(bar.close, next.close));
            let summary = by_date.get(&bar.date);

            AlignedRow {
                date: bar.date,
                stock: stock.to_string(),
                close: bar.close,
                next_day_return,
                mean_compound: summary.map(|s| s.mean_compound),
                news_count: summary.map_or(0, |s| s.news_count),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::correlation_service::{paired_observations, pearson_correlation};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    fn bars(closes: &[(u32, f64)]) -> Vec<PriceBar> {
        closes
            .iter()
            .map(|(day, close)| PriceBar::new(date(*day), *close - 2.0, *close + 3.0, *close - 7.0, *close, 1_000_000))
            .collect()
    }

    fn summary(day: u32, mean: f64, count: usize) -> DailySentimentSummary {
        DailySentimentSummary {
            date: date(day),
            stock: "AAPL".to_string(),
            mean_compound: mean,
            news_count: count,
        }
    }

    #[test]
    fn test_left_join_keeps_every_trading_day() {
        // Jan 2-5 2023 are Monday-Thursday
        let prices = bars(&[(2, 152.0), (3, 153.0), (4, 156.0), (5, 157.0)]);
        let daily = vec![summary(2, 0.5, 1), summary(4, -0.5, 1)];

        let rows = align("AAPL", &prices, &daily);
        assert_eq!(rows.len(), 4);

        let counts: Vec<usize> = rows.iter().map(|r| r.news_count).collect();
        assert_eq!(counts, vec![1, 0, 1, 0]);

        let means: Vec<Option<f64>> = rows.iter().map(|r| r.mean_compound).collect();
        assert_eq!(means, vec![Some(0.5), None, Some(-0.5), None]);
    }

    #[test]
    fn test_next_day_return_and_final_row() {
        let prices = bars(&[(2, 152.0), (3, 153.0), (4, 156.0), (5, 157.0)]);
        let rows = align("AAPL", &prices, &[]);

        let expected = [
            (153.0 - 152.0) / 152.0 * 100.0,
            (156.0 - 153.0) / 153.0 * 100.0,
            (157.0 - 156.0) / 156.0 * 100.0,
        ];
        for (row, want) in rows.iter().zip(expected.iter()) {
            assert!((row.next_day_return.unwrap() - want).abs() < 1e-12);
        }
        assert_eq!(rows[3].next_day_return, None);
    }

    #[test]
    fn test_weekend_news_is_dropped() {
        // Jan 7-8 2023 is a weekend
        let prices = bars(&[(6, 100.0), (9, 101.0)]);
        let daily = vec![summary(7, 0.8, 3), summary(8, -0.1, 1)];

        let rows = align("AAPL", &prices, &daily);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.mean_compound.is_none() && r.news_count == 0));
    }

    #[test]
    fn test_zero_close_has_no_return() {
        let prices = bars(&[(2, 0.0), (3, 10.0), (4, 11.0)]);
        let rows = align("AAPL", &prices, &[]);
        assert_eq!(rows[0].next_day_return, None);
        assert!((rows[1].next_day_return.unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_overflowing_return_is_absent() {
        assert_eq!(forward_return(1e-300, 1e300), None);

        let prices = bars(&[(2, 1e-300), (3, 1e300), (4, 1.0), (5, 2.0)]);
        let daily = vec![summary(2, 0.0, 1), summary(3, 0.1, 1), summary(4, 0.2, 1), summary(5, 0.3, 1)];
        let rows = align("AAPL", &prices, &daily);

        let returns: Vec<Option<f64>> = rows.iter().map(|r| r.next_day_return).collect();
        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() + 100.0).abs() < 1e-9);
        assert!((returns[2].unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(returns[3], None);

        let (sentiment, rets) = paired_observations(&rows);
        assert_eq!(sentiment, vec![0.1, 0.2]);
        let corr = pearson_correlation(&sentiment, &rets).unwrap();
        assert!((corr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_prices_gives_no_rows() {
        assert!(align("AAPL", &[], &[summary(2, 0.3, 1)]).is_empty());
    }

    #[test]
    fn test_other_stock_summaries_are_ignored() {
        let prices = bars(&[(2, 100.0), (3, 101.0)]);
        let mut other = summary(2, 0.9, 4);
        other.stock = "MSFT".to_string();

        let rows = align("AAPL", &prices, &[other]);
        assert_eq!(rows[0].mean_compound, None);
    }
}
