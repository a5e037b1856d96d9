use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailySentimentSummary, ScoredEvent};

/// Group a stock's scored events by calendar date.
///
/// Returns one row per date that has at least one event, ascending by date, with the
/// mean compound score and the article count. Events for other stocks are ignored.
pub fn aggregate(scored_events: &[ScoredEvent], stock: &str) -> Vec<DailySentimentSummary> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for scored in scored_events.iter().filter(|e| e.stock() == stock) {
        let entry = by_date.entry(scored.date()).or_insert((0.0, 0));
        entry.0 += scored.compound();
        entry.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| DailySentimentSummary {
            date,
            stock: stock.to_string(),
            mean_compound: sum / count as f64,
            news_count: count,
        })
        .collect()
}
