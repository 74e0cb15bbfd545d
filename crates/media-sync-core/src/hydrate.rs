use std::collections::HashSet;

use media_sync_config::ListSelection;
use media_sync_models::{Item, SourceList};
use media_sync_sources::{MirrorClient, SourceClient};
use tracing::{debug, info, warn};

use crate::error::{RemoteContext, Result, SyncError};
use crate::pairing::CollectionPairing;
use crate::report::SyncReport;

/// Everything a run reconciles, read fresh from both services
#[derive(Debug, Clone, PartialEq)]
pub struct HydratedState {
    /// Named lists in source order, then the watchlist
    pub lists: Vec<CollectionPairing>,
    pub ratings: CollectionPairing,
}

/// Reads both services and builds the pairings for a run
pub struct Hydrator<'a> {
    source: &'a dyn SourceClient,
    mirror: &'a dyn MirrorClient,
}

impl<'a> Hydrator<'a> {
    pub fn new(source: &'a dyn SourceClient, mirror: &'a dyn MirrorClient) -> Self {
        Self { source, mirror }
    }

    pub async fn hydrate(
        &self,
        selection: &ListSelection,
        report: &mut SyncReport,
    ) -> Result<HydratedState> {
        let source_lists = match selection {
            ListSelection::All => self
                .source
                .lists_discover_all()
                .await
                .remote(|| format!("discover {} lists", self.source.source_name()))?,
            ListSelection::Explicit(ids) => self.fetch_explicit_lists(ids).await?,
        };
        info!(lists = source_lists.len(), "Hydrated source lists");

        // source watchlist is read before any mirror list is created
        let watchlist = self
            .source
            .watchlist_get()
            .await
            .remote(|| format!("fetch {} watchlist", self.source.source_name()))?;

        let mut lists = Vec::with_capacity(source_lists.len() + 1);
        for source_list in source_lists {
            let mut pairing = CollectionPairing::for_list(source_list);
            pairing.mirror_items = self.mirror_list_items(&pairing, report).await?;
            lists.push(pairing);
        }

        let mirror_watchlist = self
            .mirror
            .watchlist_get()
            .await
            .remote(|| format!("fetch {} watchlist", self.mirror.mirror_name()))?;
        lists.push(CollectionPairing::for_watchlist(watchlist, mirror_watchlist));

        let ratings = self.ratings().await?;
        Ok(HydratedState { lists, ratings })
    }

    /// Fetch user-supplied list ids, skipping repeats and lists the source
    /// no longer has.
    async fn fetch_explicit_lists(&self, ids: &[String]) -> Result<Vec<SourceList>> {
        let mut seen = HashSet::new();
        let mut lists = Vec::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id.as_str()) {
                debug!(list_id = %id, "Skipping duplicate list id");
                continue;
            }
            match self.source.list_get(id).await {
                Ok(list) => lists.push(list),
                Err(e) if e.is_not_found() => {
                    warn!(list_id = %id, error = %e, "Ignoring list that was not found on the source");
                }
                Err(e) => {
                    return Err(SyncError::remote(
                        format!("fetch {} list {}", self.source.source_name(), id),
                        e,
                    ))
                }
            }
        }
        Ok(lists)
    }

    /// Current mirror contents of a named list, creating the list when the
    /// mirror does not have it yet.
    async fn mirror_list_items(
        &self,
        pairing: &CollectionPairing,
        report: &mut SyncReport,
    ) -> Result<Vec<Item>> {
        let mirror_id = pairing.mirror_id();
        if mirror_id.is_empty() {
            warn!(
                list_id = %pairing.source_list_id,
                name = %pairing.display_name,
                "List name has no ASCII letters or digits; its mirror list id is empty"
            );
        }
        match self.mirror.list_get(&mirror_id).await {
            Ok(items) => Ok(items),
            Err(e) if e.is_not_found() => {
                warn!(
                    list = %mirror_id,
                    name = %pairing.display_name,
                    "Mirror list not found, creating it"
                );
                self.mirror
                    .list_create(&mirror_id, &pairing.display_name)
                    .await
                    .remote(|| format!("create {} list {}", self.mirror.mirror_name(), mirror_id))?;
                report.lists_created += 1;
                Ok(Vec::new())
            }
            Err(e) => Err(SyncError::remote(
                format!("fetch {} list {}", self.mirror.mirror_name(), mirror_id),
                e,
            )),
        }
    }

    async fn ratings(&self) -> Result<CollectionPairing> {
        let source_ratings = self
            .source
            .ratings_get()
            .await
            .remote(|| format!("fetch {} ratings", self.source.source_name()))?;
        let mirror_ratings = self
            .mirror
            .ratings_get()
            .await
            .remote(|| format!("fetch {} ratings", self.mirror.mirror_name()))?;
        debug!(
            source = source_ratings.len(),
            mirror = mirror_ratings.len(),
            "Hydrated ratings"
        );
        Ok(CollectionPairing::for_ratings(source_ratings, mirror_ratings))
    }
}
