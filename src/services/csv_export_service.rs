use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::models::{
    AnalysisReport, CorrelationDiagnostic, CorrelationResult, NewsEvent, ScoredEvent, SkippedStock,
};

/// File name variant for an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSuffix {
    Plain,
    Timestamped(DateTime<Utc>),
    Comparison,
}

impl ExportSuffix {
    fn file_name(&self, stem: &str, extension: &str) -> String {
        match self {
            ExportSuffix::Plain => format!("{}.{}", stem, extension),
            ExportSuffix::Timestamped(at) => {
                format!("{}_{}.{}", stem, at.format("%Y%m%d_%H%M%S"), extension)
            }
            ExportSuffix::Comparison => format!("{}_comparison.{}", stem, extension),
        }
    }
}

#[derive(Debug, Serialize)]
struct NewsRow<'a> {
    timestamp: String,
    stock: &'a str,
    title: &'a str,
    description: Option<&'a str>,
    source: &'a str,
    url: &'a str,
}

impl<'a> From<&'a NewsEvent> for NewsRow<'a> {
    fn from(event: &'a NewsEvent) -> Self {
        Self {
            timestamp: event.timestamp.to_rfc3339(),
            stock: &event.stock,
            title: &event.title,
            description: event.description.as_deref(),
            source: &event.source,
            url: &event.url,
        }
    }
}

// csv cannot serialize flattened structs, so the news columns are repeated here
#[derive(Debug, Serialize)]
struct SentimentRow<'a> {
    timestamp: String,
    stock: &'a str,
    title: &'a str,
    description: Option<&'a str>,
    source: &'a str,
    url: &'a str,
    date: String,
    content: &'a str,
    compound: f64,
    positive: f64,
    negative: f64,
    neutral: f64,
    category: String,
}

impl<'a> From<&'a ScoredEvent> for SentimentRow<'a> {
    fn from(scored: &'a ScoredEvent) -> Self {
        let news = NewsRow::from(&scored.event);
        Self {
            timestamp: news.timestamp,
            stock: news.stock,
            title: news.title,
            description: news.description,
            source: news.source,
            url: news.url,
            date: scored.date().to_string(),
            content: &scored.content,
            compound: scored.score.compound,
            positive: scored.score.positive,
            negative: scored.score.negative,
            neutral: scored.score.neutral,
            category: scored.score.category.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryEntry<'a> {
    #[serde(flatten)]
    result: &'a CorrelationResult,
    diagnostic: CorrelationDiagnostic,
}

#[derive(Debug, Serialize)]
struct AnalysisSummary<'a> {
    generated_at: DateTime<Utc>,
    stocks: Vec<SummaryEntry<'a>>,
    skipped: &'a [SkippedStock],
}

/// Files written by one export
#[derive(Debug, Clone, Default)]
pub struct ExportedFiles {
    pub paths: Vec<PathBuf>,
}

/// Write the news, sentiment and correlation tables plus a JSON summary into `dir`.
/// Empty tables are not written.
pub fn export_report(
    dir: &Path,
    report: &AnalysisReport,
    suffix: ExportSuffix,
) -> Result<ExportedFiles> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut exported = ExportedFiles::default();

    if !report.scored_events.is_empty() {
        let path = dir.join(suffix.file_name("news_data", "csv"));
        write_rows(&path, report.scored_events.iter().map(|s| NewsRow::from(&s.event)))?;
        exported.paths.push(path);

        let path = dir.join(suffix.file_name("sentiment_data", "csv"));
        write_rows(&path, report.scored_events.iter().map(SentimentRow::from))?;
        exported.paths.push(path);
    }

    if !report.results.is_empty() {
        let path = dir.join(suffix.file_name("correlation_data", "csv"));
        write_rows(&path, report.results.iter())?;
        exported.paths.push(path);
    }

    let path = dir.join(suffix.file_name("analysis_summary", "json"));
    write_summary(&path, report)?;
    exported.paths.push(path);

    for path in &exported.paths {
        info!("Saved results to {}", path.display());
    }
    Ok(exported)
}

fn write_rows<T, I>(path: &Path, rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

fn write_summary(path: &Path, report: &AnalysisReport) -> Result<()> {
    let summary = AnalysisSummary {
        generated_at: Utc::now(),
        stocks: report
            .details
            .iter()
            .map(|d| SummaryEntry { result: &d.result, diagnostic: d.diagnostic })
            .collect(),
        skipped: &report.skipped,
    };

    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
