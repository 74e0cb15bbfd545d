use std::time::Instant;

use media_sync_config::ListSelection;
use media_sync_sources::{MirrorClient, SourceClient};
use tracing::{info, instrument};

use crate::dry_run::DryRunMirror;
use crate::error::Result;
use crate::hydrate::Hydrator;
use crate::ratings::RatingSynchronizer;
use crate::reconcile::ListReconciler;
use crate::report::SyncReport;

/// Runs one complete reconciliation: hydrate, then lists, then ratings.
///
/// Every run starts from live reads of both services; nothing is kept
/// between runs.
pub struct SyncOrchestrator {
    source: Box<dyn SourceClient>,
    mirror: Box<dyn MirrorClient>,
    dry_run: bool,
}

impl SyncOrchestrator {
    pub fn new(source: Box<dyn SourceClient>, mirror: Box<dyn MirrorClient>) -> Self {
        Self {
            source,
            mirror,
            dry_run: false,
        }
    }

    /// Route every mirror write through [`DryRunMirror`]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        if dry_run && !self.dry_run {
            self.mirror = Box::new(DryRunMirror::new(self.mirror));
        }
        self.dry_run = self.dry_run || dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[instrument(skip_all, fields(source = self.source.source_name(), mirror = self.mirror.mirror_name()))]
    pub async fn sync(&self, selection: &ListSelection) -> Result<SyncReport> {
        let started = Instant::now();
        let mut report = SyncReport {
            dry_run: self.dry_run,
            ..Default::default()
        };
        info!(dry_run = self.dry_run, "Starting sync");

        let state = Hydrator::new(self.source.as_ref(), self.mirror.as_ref())
            .hydrate(selection, &mut report)
            .await?;

        ListReconciler::new(self.mirror.as_ref())
            .reconcile(&state.lists, &mut report)
            .await?;

        RatingSynchronizer::new(self.mirror.as_ref())
            .synchronize(&state.ratings, &mut report)
            .await?;

        report.duration = started.elapsed();
        info!(
            lists = report.lists_synced,
            changes = report.total_changes(),
            duration_secs = report.duration.as_secs_f64(),
            "Sync complete"
        );
        Ok(report)
    }
}
