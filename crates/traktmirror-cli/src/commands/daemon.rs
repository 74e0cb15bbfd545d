use super::config::load_config;
use super::sync::build_orchestrator;
use crate::output::Output;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use media_sync_config::{Config, PathManager, SchedulerConfig};
use media_sync_core::SyncReport;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Everything one scheduled run needs; shared across ticks
struct RunContext {
    paths: PathManager,
    config: Config,
    /// Held for the duration of a run so ticks never overlap
    running: Mutex<()>,
}

impl RunContext {
    fn new(paths: PathManager, config: Config) -> Self {
        Self {
            paths,
            config,
            running: Mutex::new(()),
        }
    }

    /// A complete, independent sync: fresh clients, fresh reads
    async fn run_once(&self) -> Result<SyncReport> {
        let orchestrator = build_orchestrator(&self.paths, &self.config, self.config.sync.dry_run, false).await?;
        let report = orchestrator.sync(&self.config.list_selection()).await?;
        Ok(report)
    }

    /// Run one sync unless another is still in progress. Returns whether it ran.
    async fn run_logged(&self, trigger: &'static str) -> bool {
        let Ok(_guard) = self.running.try_lock() else {
            warn!(
                operation = "scheduled_sync_skipped",
                trigger,
                "Previous sync still running; skipping this tick"
            );
            return false;
        };

        info!(operation = "scheduled_sync_start", trigger, "Starting sync");
        match self.run_once().await {
            Ok(report) => info!(
                operation = "scheduled_sync_complete",
                trigger,
                lists = report.lists_synced,
                changes = report.total_changes(),
                duration_ms = report.duration.as_millis() as u64,
                "Sync completed"
            ),
            Err(e) => error!(
                operation = "scheduled_sync_error",
                trigger,
                error = ?e,
                "Sync failed; waiting for the next scheduled run"
            ),
        }
        true
    }
}

fn effective_scheduler(config: &SchedulerConfig, schedule: Option<String>, no_startup_sync: bool) -> SchedulerConfig {
    SchedulerConfig {
        schedule: schedule.unwrap_or_else(|| config.schedule.clone()),
        run_on_startup: config.run_on_startup && !no_startup_sync,
    }
}

pub async fn run_daemon(
    paths: &PathManager,
    schedule: Option<String>,
    no_startup_sync: bool,
    output: &Output,
) -> Result<()> {
    let config = load_config(paths, None)?;
    let scheduler_config = effective_scheduler(&config.scheduler, schedule, no_startup_sync);
    let context = Arc::new(RunContext::new(paths.clone(), config));

    let mut scheduler = JobScheduler::new().await.wrap_err("Failed to create scheduler")?;
    let job_context = context.clone();
    let job = Job::new_async(scheduler_config.schedule.as_str(), move |_id, _lock| {
        let context = job_context.clone();
        Box::pin(async move {
            context.run_logged("schedule").await;
        })
    })
    .wrap_err_with(|| format!("Invalid cron schedule '{}'", scheduler_config.schedule))?;
    scheduler.add(job).await.wrap_err("Failed to register sync job")?;

    output.info(format!(
        "Daemon started with schedule '{}'. Press Ctrl-C to stop.",
        scheduler_config.schedule
    ));
    info!(
        operation = "scheduler_started",
        schedule = %scheduler_config.schedule,
        run_on_startup = scheduler_config.run_on_startup,
        "Scheduler started"
    );

    if scheduler_config.run_on_startup {
        context.run_logged("startup").await;
    }

    scheduler.start().await.wrap_err("Failed to start scheduler")?;
    tokio::signal::ctrl_c()
        .await
        .wrap_err("Failed to listen for Ctrl-C")?;

    info!(operation = "scheduler_stopping", "Shutting down");
    scheduler.shutdown().await.wrap_err("Failed to stop scheduler")?;
    output.success("Daemon stopped");
    Ok(())
}
