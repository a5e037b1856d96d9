use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::models::{
    AnalysisReport, NewsEvent, PriceBar, ScoredEvent, SkipReason, SkippedStock, StockAnalysis,
};
use crate::services::aggregation_service::aggregate;
use crate::services::alignment_service::align;
use crate::services::correlation_service::correlate_with_diagnostic;
use crate::services::sentiment_service::{score_events, LexiconScorer};

/// Runs scoring, aggregation, alignment and correlation for a set of stocks.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    scorer: LexiconScorer,
}

impl AnalysisPipeline {
    pub fn new(scorer: LexiconScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &LexiconScorer {
        &self.scorer
    }

    /// Analyze `stocks` against the given news and price snapshot.
    ///
    /// Every event is scored, whatever its stock. Stocks without price bars or without
    /// news are reported in `skipped` instead of `results`. Results follow the order of
    /// `stocks`; repeated symbols are analyzed once.
    pub fn run(
        &self,
        events: &[NewsEvent],
        prices: &HashMap<String, Vec<PriceBar>>,
        stocks: &[String],
    ) -> AnalysisReport {
        let scored_events = score_events(&self.scorer, events);
        info!("Analyzed sentiment for {} articles", scored_events.len());

        let mut by_stock: HashMap<&str, Vec<ScoredEvent>> = HashMap::new();
        for scored in &scored_events {
            by_stock.entry(scored.stock()).or_default().push(scored.clone());
        }

        let mut seen = HashSet::new();
        let requested: Vec<&String> = stocks.iter().filter(|s| seen.insert(s.as_str())).collect();

        let outcomes: Vec<Result<StockAnalysis, SkippedStock>> = requested
            .par_iter()
            .map(|stock| {
                let bars = prices.get(stock.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                let news = by_stock.get(stock.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                analyze_stock(stock, news, bars)
            })
            .collect();

        let mut report = AnalysisReport {
            scored_events,
            ..AnalysisReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(analysis) => {
                    report.results.push(analysis.result.clone());
                    report.details.push(analysis);
                }
                Err(skipped) => {
                    debug!("Skipping {}: {}", skipped.stock, skipped.reason);
                    report.skipped.push(skipped);
                }
            }
        }

        info!(
            "Calculated correlations for {} stocks ({} skipped)",
            report.results.len(),
            report.skipped.len()
        );
        report
    }
}

/// Full per-stock chain. `scored_events` must already be filtered to `stock`.
pub fn analyze_stock(
    stock: &str,
    scored_events: &[ScoredEvent],
    price_bars: &[PriceBar],
) -> Result<StockAnalysis, SkippedStock> {
    if price_bars.is_empty() {
        return Err(SkippedStock {
            stock: stock.to_string(),
            reason: SkipReason::NoPriceData,
        });
    }
    if scored_events.is_empty() {
        return Err(SkippedStock {
            stock: stock.to_string(),
            reason: SkipReason::NoNewsData,
        });
    }

    let daily = aggregate(scored_events, stock);
    let aligned = align(stock, price_bars, &daily);
    let (result, diagnostic) = correlate_with_diagnostic(stock, scored_events, &aligned);

    Ok(StockAnalysis {
        result,
        diagnostic,
        daily,
        aligned,
    })
}
