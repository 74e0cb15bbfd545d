use async_trait::async_trait;
use media_sync_models::{HistoryEntry, Item, MediaType, MirrorList};
use media_sync_sources::{MirrorClient, SourceError};
use tracing::info;

/// Mirror wrapper that reads through and logs writes instead of sending them
pub struct DryRunMirror {
    inner: Box<dyn MirrorClient>,
}

impl DryRunMirror {
    pub fn new(inner: Box<dyn MirrorClient>) -> Self {
        Self { inner }
    }

    fn skip(&self, operation: &str, items: &[Item]) {
        let keys: Vec<&str> = items.iter().filter_map(|i| i.key().ok()).collect();
        info!(
            mirror = self.inner.mirror_name(),
            operation,
            count = items.len(),
            items = ?keys,
            "Dry run: skipping write"
        );
    }
}

#[async_trait]
impl MirrorClient for DryRunMirror {
    fn mirror_name(&self) -> &str {
        self.inner.mirror_name()
    }

    async fn list_get(&self, id: &str) -> Result<Vec<Item>, SourceError> {
        self.inner.list_get(id).await
    }

    async fn list_create(&self, id: &str, name: &str) -> Result<(), SourceError> {
        info!(list = id, name, "Dry run: skipping list creation");
        Ok(())
    }

    async fn list_delete(&self, slug: &str) -> Result<(), SourceError> {
        info!(list = slug, "Dry run: skipping list deletion");
        Ok(())
    }

    async fn lists_get_all(&self) -> Result<Vec<MirrorList>, SourceError> {
        self.inner.lists_get_all().await
    }

    async fn list_items_add(&self, id: &str, items: &[Item]) -> Result<(), SourceError> {
        self.skip(&format!("add items to list {}", id), items);
        Ok(())
    }

    async fn list_items_remove(&self, id: &str, items: &[Item]) -> Result<(), SourceError> {
        self.skip(&format!("remove items from list {}", id), items);
        Ok(())
    }

    async fn watchlist_get(&self) -> Result<Vec<Item>, SourceError> {
        self.inner.watchlist_get().await
    }

    async fn watchlist_items_add(&self, items: &[Item]) -> Result<(), SourceError> {
        self.skip("add watchlist items", items);
        Ok(())
    }

    async fn watchlist_items_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        self.skip("remove watchlist items", items);
        Ok(())
    }

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError> {
        self.inner.ratings_get().await
    }

    async fn ratings_add(&self, items: &[Item]) -> Result<(), SourceError> {
        self.skip("add ratings", items);
        Ok(())
    }

    async fn ratings_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        self.skip("remove ratings", items);
        Ok(())
    }

    async fn history_get(
        &self,
        media_type: MediaType,
        item_id: &str,
    ) -> Result<Vec<HistoryEntry>, SourceError> {
        self.inner.history_get(media_type, item_id).await
    }

    async fn history_add(&self, items: &[Item]) -> Result<(), SourceError> {
        self.skip("add history", items);
        Ok(())
    }

    async fn history_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        self.skip("remove history", items);
        Ok(())
    }
}
