use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::AnalysisReport;
use crate::services::analysis_service::AnalysisPipeline;
use crate::services::csv_export_service::{export_report, ExportSuffix};
use crate::services::data_fetch_service::DataFetchService;
use crate::services::report_service::render_summary;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub stocks: Vec<String>,
    pub interval: Duration,
    /// Stop after this long; `None` runs until Ctrl-C
    pub duration: Option<Duration>,
    pub lookback_days: i64,
    /// Write timestamped tables here after each run
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone)]
struct MonitorContext {
    fetcher: DataFetchService,
    pipeline: Arc<AnalysisPipeline>,
    settings: Arc<MonitorSettings>,
    iterations: Arc<AtomicUsize>,
}

/// Re-runs fetch and analysis on a fixed interval.
pub struct MonitorService {
    scheduler: JobScheduler,
    context: MonitorContext,
}

impl MonitorService {
    pub async fn new(
        fetcher: DataFetchService,
        pipeline: Arc<AnalysisPipeline>,
        settings: MonitorSettings,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            context: MonitorContext {
                fetcher,
                pipeline,
                settings: Arc::new(settings),
                iterations: Arc::new(AtomicUsize::new(0)),
            },
        })
    }

    /// Run once right away, then on every interval until the duration elapses
    /// or Ctrl-C. Returns the number of completed iterations.
    pub async fn run(mut self) -> Result<usize, AppError> {
        let settings = self.context.settings.clone();
        info!(
            "Starting monitoring for {} (interval {:?})",
            settings.stocks.join(", "),
            settings.interval
        );

        run_iteration(self.context.clone()).await;

        let context = self.context.clone();
        let job = Job::new_repeated_async(settings.interval, move |_uuid, _l| {
            let context = context.clone();
            Box::pin(async move {
                run_iteration(context).await;
            })
        })
        .map_err(|e| AppError::Scheduler(format!("Failed to create monitor job: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to add monitor job: {}", e)))?;
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to start scheduler: {}", e)))?;

        match settings.duration {
            Some(limit) => {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        info!("Reached monitoring duration of {:?}", limit);
                    }
                    _ = tokio::signal::ctrl_c() => info!("Monitoring stopped by user"),
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Monitoring stopped by user");
            }
        }

        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to stop scheduler: {}", e)))?;

        let completed = self.context.iterations.load(Ordering::SeqCst);
        info!("Monitoring complete after {} iterations", completed);
        Ok(completed)
    }
}

async fn run_iteration(context: MonitorContext) {
    let iteration = context.iterations.load(Ordering::SeqCst) + 1;
    info!("Monitoring iteration {}", iteration);

    match analyze_latest(&context).await {
        Ok(report) => {
            info!("Iteration {} summary:\n{}", iteration, render_summary(&report));

            if let Some(dir) = &context.settings.output_dir {
                if let Err(e) = export_report(dir, &report, ExportSuffix::Timestamped(Utc::now())) {
                    error!("Failed to save monitoring results: {:#}", e);
                }
            }
            context.iterations.fetch_add(1, Ordering::SeqCst);
        }
        Err(e) => error!("Monitoring iteration {} failed: {}", iteration, e),
    }
}

async fn analyze_latest(context: &MonitorContext) -> Result<AnalysisReport, AppError> {
    let end = Utc::now().date_naive();
    let start = end - ChronoDuration::days(context.settings.lookback_days);
    let stocks = context.settings.stocks.clone();

    let snapshot = context.fetcher.fetch_snapshot(&stocks, start, end).await;

    let pipeline = context.pipeline.clone();
    tokio::task::spawn_blocking(move || pipeline.run(&snapshot.events, &snapshot.prices, &stocks))
        .await
        .map_err(|e| AppError::External(format!("Analysis task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::external::sample::SampleDataProvider;

    fn context(output_dir: Option<PathBuf>) -> MonitorContext {
        let sample = Arc::new(SampleDataProvider::new(42));
        let config = FetchConfig { requests_per_minute: 0, ..FetchConfig::default() };
        MonitorContext {
            fetcher: DataFetchService::new(sample.clone(), sample, &config),
            pipeline: Arc::new(AnalysisPipeline::default()),
            settings: Arc::new(MonitorSettings {
                stocks: vec!["AAPL".to_string(), "MSFT".to_string()],
                interval: Duration::from_secs(3600),
                duration: Some(Duration::from_millis(50)),
                lookback_days: 30,
                output_dir,
            }),
            iterations: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[tokio::test]
    async fn test_iteration_runs_pipeline_and_saves() {
        let dir = std::env::temp_dir().join(format!("news-impact-monitor-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let context = context(Some(dir.clone()));

        let report = analyze_latest(&context).await.unwrap();
        assert_eq!(report.results.len() + report.skipped.len(), 2);

        run_iteration(context.clone()).await;
        assert_eq!(context.iterations.load(Ordering::SeqCst), 1);

        let saved: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(saved.iter().any(|name| name.starts_with("news_data_") && name.ends_with(".csv")));
        assert!(saved.iter().any(|name| name.starts_with("analysis_summary_")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_stops_after_duration() {
        let context = context(None);
        let service = MonitorService {
            scheduler: JobScheduler::new().await.unwrap(),
            context,
        };

        let completed = service.run().await.unwrap();
        assert_eq!(completed, 1);
    }
}
