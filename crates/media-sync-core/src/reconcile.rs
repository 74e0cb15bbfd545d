use media_sync_sources::MirrorClient;
use tracing::{debug, info};

use crate::error::{RemoteContext, Result, SyncError};
use crate::pairing::{contains, CollectionPairing};
use crate::report::SyncReport;

/// Applies list diffs to the mirror and removes orphaned mirror lists
pub struct ListReconciler<'a> {
    mirror: &'a dyn MirrorClient,
}

impl<'a> ListReconciler<'a> {
    pub fn new(mirror: &'a dyn MirrorClient) -> Self {
        Self { mirror }
    }

    pub async fn reconcile(&self, pairings: &[CollectionPairing], report: &mut SyncReport) -> Result<()> {
        for pairing in pairings {
            self.apply(pairing, report).await?;
            report.lists_synced += 1;
        }
        self.remove_orphans(pairings, report).await
    }

    async fn apply(&self, pairing: &CollectionPairing, report: &mut SyncReport) -> Result<()> {
        let diff = pairing
            .difference()
            .map_err(|e| SyncError::item(format!("diff list {}", pairing.display_name), e))?;
        if diff.is_empty() {
            debug!(list = %pairing.display_name, "List already in sync");
            return Ok(());
        }
        let mirror = self.mirror.mirror_name();

        if pairing.is_watchlist {
            if !diff.to_add.is_empty() {
                self.mirror
                    .watchlist_items_add(&diff.to_add)
                    .await
                    .remote(|| format!("add items to {} watchlist", mirror))?;
            }
            if !diff.to_remove.is_empty() {
                self.mirror
                    .watchlist_items_remove(&diff.to_remove)
                    .await
                    .remote(|| format!("remove items from {} watchlist", mirror))?;
            }
        } else {
            let id = pairing.mirror_id();
            if !diff.to_add.is_empty() {
                self.mirror
                    .list_items_add(&id, &diff.to_add)
                    .await
                    .remote(|| format!("add items to {} list {}", mirror, id))?;
            }
            if !diff.to_remove.is_empty() {
                self.mirror
                    .list_items_remove(&id, &diff.to_remove)
                    .await
                    .remote(|| format!("remove items from {} list {}", mirror, id))?;
            }
        }

        info!(
            list = %pairing.display_name,
            added = diff.to_add.len(),
            removed = diff.to_remove.len(),
            "Synced list"
        );
        report.items_added += diff.to_add.len();
        report.items_removed += diff.to_remove.len();
        Ok(())
    }

    /// Delete mirror lists whose name matches no pairing. The watchlist is
    /// not part of the mirror's list set and is never touched.
    async fn remove_orphans(&self, pairings: &[CollectionPairing], report: &mut SyncReport) -> Result<()> {
        let mirror = self.mirror.mirror_name();
        let mirror_lists = self
            .mirror
            .lists_get_all()
            .await
            .remote(|| format!("fetch {} lists", mirror))?;

        for list in mirror_lists {
            if contains(pairings, &list.name) {
                continue;
            }
            self.mirror
                .list_delete(&list.slug)
                .await
                .remote(|| format!("delete {} list {}", mirror, list.name))?;
            info!(list = %list.name, slug = %list.slug, "Deleted orphaned mirror list");
            report.lists_deleted += 1;
        }
        Ok(())
    }
}
