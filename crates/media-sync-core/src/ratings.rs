use media_sync_models::Item;
use media_sync_sources::MirrorClient;
use tracing::{debug, info};

use crate::diff::rating_updates;
use crate::error::{RemoteContext, Result, SyncError};
use crate::pairing::CollectionPairing;
use crate::report::SyncReport;

/// Mirrors source ratings and keeps watch history consistent with them
pub struct RatingSynchronizer<'a> {
    mirror: &'a dyn MirrorClient,
}

impl<'a> RatingSynchronizer<'a> {
    pub fn new(mirror: &'a dyn MirrorClient) -> Self {
        Self { mirror }
    }

    pub async fn synchronize(&self, ratings: &CollectionPairing, report: &mut SyncReport) -> Result<()> {
        let diff = ratings
            .difference()
            .map_err(|e| SyncError::item("diff ratings", e))?;

        if !diff.to_add.is_empty() {
            self.add(&diff.to_add, report).await?;
        }
        if !diff.to_remove.is_empty() {
            self.remove(&diff.to_remove, report).await?;
        }
        self.update(ratings, report).await
    }

    async fn add(&self, items: &[Item], report: &mut SyncReport) -> Result<()> {
        let mirror = self.mirror.mirror_name();
        self.mirror
            .ratings_add(items)
            .await
            .remote(|| format!("add {} ratings", mirror))?;
        report.ratings_added += items.len();

        let mut unwatched = Vec::new();
        for item in items {
            if self.has_history(item).await? {
                debug!(item = ?item.ids.imdb_id, "Already in history, not adding a watch");
                continue;
            }
            unwatched.push(item.clone());
        }
        if !unwatched.is_empty() {
            self.mirror
                .history_add(&unwatched)
                .await
                .remote(|| format!("add {} history", mirror))?;
            report.history_added += unwatched.len();
        }

        info!(ratings = items.len(), history = unwatched.len(), "Added ratings");
        Ok(())
    }

    async fn remove(&self, items: &[Item], report: &mut SyncReport) -> Result<()> {
        let mirror = self.mirror.mirror_name();
        self.mirror
            .ratings_remove(items)
            .await
            .remote(|| format!("remove {} ratings", mirror))?;
        report.ratings_removed += items.len();

        let mut watched = Vec::new();
        for item in items {
            if self.has_history(item).await? {
                watched.push(item.clone());
            }
        }
        if !watched.is_empty() {
            self.mirror
                .history_remove(&watched)
                .await
                .remote(|| format!("remove {} history", mirror))?;
            report.history_removed += watched.len();
        }

        info!(ratings = items.len(), history = watched.len(), "Removed ratings");
        Ok(())
    }

    /// Ratings present on both sides with different values. Rating adds are
    /// upserts on the mirror, so updates reuse them.
    async fn update(&self, ratings: &CollectionPairing, report: &mut SyncReport) -> Result<()> {
        let updates = rating_updates(&ratings.source_items, &ratings.mirror_items)
            .map_err(|e| SyncError::item("compare ratings", e))?;
        if updates.is_empty() {
            return Ok(());
        }

        let mirror = self.mirror.mirror_name();
        self.mirror
            .ratings_add(&updates)
            .await
            .remote(|| format!("update {} ratings", mirror))?;
        report.ratings_updated += updates.len();
        info!(ratings = updates.len(), "Updated ratings");
        Ok(())
    }

    async fn has_history(&self, item: &Item) -> Result<bool> {
        let key = item
            .key()
            .map_err(|e| SyncError::item("look up watch history", e))?;
        let history = self
            .mirror
            .history_get(item.media_type, key)
            .await
            .remote(|| format!("fetch {} history for {} {}", self.mirror.mirror_name(), item.media_type, key))?;
        Ok(!history.is_empty())
    }
}
