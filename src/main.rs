use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use news_impact::config::{parse_stock_list, AnalyzerConfig};
use news_impact::external::price_provider::PriceProvider;
use news_impact::external::sample::SampleDataProvider;
use news_impact::external::yahoo::YahooProvider;
use news_impact::logging::{init_logging, LoggingConfig};
use news_impact::models::stocks_for_sectors;
use news_impact::services::analysis_service::AnalysisPipeline;
use news_impact::services::csv_export_service::{export_report, ExportSuffix};
use news_impact::services::data_fetch_service::DataFetchService;
use news_impact::services::lexicon::{load_overrides_csv, Lexicon};
use news_impact::services::monitor_service::{MonitorService, MonitorSettings};
use news_impact::services::news_service::{NewsApiProvider, NewsProvider};
use news_impact::services::report_service::{render_summary, render_volatility};
use news_impact::services::sentiment_service::LexiconScorer;
use news_impact::utils::parse_date;

/// Monitoring looks back a week unless a start date is given
const MONITOR_LOOKBACK_DAYS: i64 = 7;

#[derive(Parser)]
#[command(name = "news-impact")]
#[command(about = "Analyze the impact of financial news on stock prices")]
struct Cli {
    /// Stock symbols to analyze, comma-separated (defaults to STOCKS or AAPL,MSFT,GOOGL)
    #[arg(long, global = true)]
    stocks: Option<String>,

    /// Start date for analysis
    #[arg(long, global = true, value_parser = parse_date_arg)]
    start_date: Option<NaiveDate>,

    /// End date for analysis (defaults to today)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    end_date: Option<NaiveDate>,

    /// NewsAPI key; without one, seeded sample data is used
    #[arg(long, global = true, env = "NEWS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory to save results
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Save news, sentiment and correlation tables
    #[arg(long, global = true)]
    save_data: bool,

    /// Seed for sample data
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// CSV of extra `phrase,weight` lexicon overrides
    #[arg(long, global = true)]
    lexicon_overrides: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run standard analysis
    Analyze,
    /// Re-run the analysis on a fixed interval
    Monitor {
        /// Update interval in seconds
        #[arg(long, default_value_t = 3600)]
        interval: u64,

        /// Monitoring duration in seconds (omit to run until Ctrl-C)
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Compare stocks or whole sectors
    Compare {
        /// Sectors to compare (tech, retail, financial, healthcare, energy, telecom)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        sectors: Vec<String>,
    },
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("unrecognized date '{}'", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = apply_overrides(AnalyzerConfig::from_env(), &cli);
    config.validate().map_err(anyhow::Error::msg)?;

    let pipeline = Arc::new(AnalysisPipeline::new(LexiconScorer::new(build_lexicon(&config)?)));
    let fetcher = build_fetcher(&config);

    match cli.command.take().unwrap_or(Commands::Analyze) {
        Commands::Analyze => {
            let (start, end) = date_range(&cli, config.lookback_days)?;
            run_once(&fetcher, &pipeline, &config, &config.stocks, start, end, cli.save_data, ExportSuffix::Plain).await?;
            info!("Analysis complete");
        }
        Commands::Compare { sectors } => {
            let stocks = if sectors.is_empty() {
                config.stocks.clone()
            } else {
                stocks_for_sectors(sectors.as_slice())
            };
            if stocks.is_empty() {
                bail!("No valid sectors specified");
            }
            info!("Comparing {} stocks: {}", stocks.len(), stocks.join(", "));

            let (start, end) = date_range(&cli, config.lookback_days)?;
            run_once(&fetcher, &pipeline, &config, &stocks, start, end, cli.save_data, ExportSuffix::Comparison).await?;
            info!("Comparison complete");
        }
        Commands::Monitor { interval, duration } => {
            let lookback_days = cli
                .start_date
                .map(|start| (Utc::now().date_naive() - start).num_days().max(1))
                .unwrap_or(MONITOR_LOOKBACK_DAYS);

            let settings = MonitorSettings {
                stocks: config.stocks.clone(),
                interval: Duration::from_secs(interval.max(1)),
                duration: duration.map(Duration::from_secs),
                lookback_days,
                output_dir: cli.save_data.then(|| config.output_dir.clone()),
            };
            MonitorService::new(fetcher, pipeline, settings).await?.run().await?;
        }
    }

    Ok(())
}

fn apply_overrides(mut config: AnalyzerConfig, cli: &Cli) -> AnalyzerConfig {
    if let Some(stocks) = &cli.stocks {
        config.stocks = parse_stock_list(stocks);
    }
    if let Some(key) = cli.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        config.news.api_key = Some(key.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(seed) = cli.seed {
        config.sample_seed = seed;
    }
    if let Some(path) = &cli.lexicon_overrides {
        config.lexicon_overrides_path = Some(path.clone());
    }
    config
}

fn build_lexicon(config: &AnalyzerConfig) -> anyhow::Result<Arc<Lexicon>> {
    let lexicon = match &config.lexicon_overrides_path {
        Some(path) => {
            let extra = load_overrides_csv(path)
                .with_context(|| format!("Failed to load lexicon overrides from {}", path.display()))?;
            info!("Loaded {} extra lexicon overrides", extra.len());
            Lexicon::with_extra_overrides(&extra)
        }
        None => Lexicon::default(),
    };
    Ok(Arc::new(lexicon))
}

fn build_fetcher(config: &AnalyzerConfig) -> DataFetchService {
    let (news, prices): (Arc<dyn NewsProvider>, Arc<dyn PriceProvider>) = match &config.news.api_key {
        Some(key) => {
            info!("Using NewsAPI for news and Yahoo Finance for prices");
            (Arc::new(NewsApiProvider::new(key.clone())), Arc::new(YahooProvider::new()))
        }
        None => {
            info!("No news API key configured, using sample data (seed {})", config.sample_seed);
            let sample = Arc::new(SampleDataProvider::new(config.sample_seed));
            (sample.clone(), sample)
        }
    };
    DataFetchService::new(news, prices, &config.fetch)
}

fn date_range(cli: &Cli, lookback_days: i64) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let end = cli.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start = cli.start_date.unwrap_or(end - ChronoDuration::days(lookback_days));
    if start > end {
        bail!("Start date {} is after end date {}", start, end);
    }
    Ok((start, end))
}

#[allow(clippy::too_many_arguments)]
async fn run_once(
    fetcher: &DataFetchService,
    pipeline: &AnalysisPipeline,
    config: &AnalyzerConfig,
    stocks: &[String],
    start: NaiveDate,
    end: NaiveDate,
    save_data: bool,
    suffix: ExportSuffix,
) -> anyhow::Result<()> {
    let snapshot = fetcher.fetch_snapshot(stocks, start, end).await;
    let report = pipeline.run(&snapshot.events, &snapshot.prices, stocks);

    println!("{}", render_summary(&report));
    if !report.details.is_empty() {
        println!("Volatility by news volume:");
        println!("{}", render_volatility(&report, &snapshot.prices));
    }

    if save_data {
        export_report(&config.output_dir, &report, suffix)?;
    }
    Ok(())
}
