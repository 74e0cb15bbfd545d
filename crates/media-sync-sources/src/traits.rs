use async_trait::async_trait;
use media_sync_models::{HistoryEntry, Item, MediaType, MirrorList, SourceList};

use crate::error::SourceError;

/// Read access to the service of record.
#[async_trait]
pub trait SourceClient: Send + Sync {
    fn source_name(&self) -> &str;

    /// Fetch one list by id; `NotFound` when it does not exist
    async fn list_get(&self, id: &str) -> Result<SourceList, SourceError>;

    /// Every list owned by the account
    async fn lists_discover_all(&self) -> Result<Vec<SourceList>, SourceError>;

    async fn watchlist_get(&self) -> Result<SourceList, SourceError>;

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError>;
}

/// Read/write access to the service kept in sync.
///
/// List operations address lists by slug. Rating adds behave as upserts.
#[async_trait]
pub trait MirrorClient: Send + Sync {
    fn mirror_name(&self) -> &str;

    async fn list_get(&self, id: &str) -> Result<Vec<Item>, SourceError>;
    async fn list_create(&self, id: &str, name: &str) -> Result<(), SourceError>;
    async fn list_delete(&self, slug: &str) -> Result<(), SourceError>;
    async fn lists_get_all(&self) -> Result<Vec<MirrorList>, SourceError>;
    async fn list_items_add(&self, id: &str, items: &[Item]) -> Result<(), SourceError>;
    async fn list_items_remove(&self, id: &str, items: &[Item]) -> Result<(), SourceError>;

    async fn watchlist_get(&self) -> Result<Vec<Item>, SourceError>;
    async fn watchlist_items_add(&self, items: &[Item]) -> Result<(), SourceError>;
    async fn watchlist_items_remove(&self, items: &[Item]) -> Result<(), SourceError>;

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError>;
    async fn ratings_add(&self, items: &[Item]) -> Result<(), SourceError>;
    async fn ratings_remove(&self, items: &[Item]) -> Result<(), SourceError>;

    async fn history_get(
        &self,
        media_type: MediaType,
        item_id: &str,
    ) -> Result<Vec<HistoryEntry>, SourceError>;
    async fn history_add(&self, items: &[Item]) -> Result<(), SourceError>;
    async fn history_remove(&self, items: &[Item]) -> Result<(), SourceError>;
}
