use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// What a sync run changed (or, in dry-run mode, would have changed)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub lists_synced: usize,
    pub lists_created: usize,
    pub lists_deleted: usize,
    pub items_added: usize,
    pub items_removed: usize,
    pub ratings_added: usize,
    pub ratings_removed: usize,
    pub ratings_updated: usize,
    pub history_added: usize,
    pub history_removed: usize,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub dry_run: bool,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl SyncReport {
    pub fn total_changes(&self) -> usize {
        self.lists_created
            + self.lists_deleted
            + self.items_added
            + self.items_removed
            + self.ratings_added
            + self.ratings_removed
            + self.ratings_updated
            + self.history_added
            + self.history_removed
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lists synced ({} created, {} deleted), items +{}/-{}, ratings +{}/-{}/~{}, history +{}/-{} in {:.1}s",
            self.lists_synced,
            self.lists_created,
            self.lists_deleted,
            self.items_added,
            self.items_removed,
            self.ratings_added,
            self.ratings_removed,
            self.ratings_updated,
            self.history_added,
            self.history_removed,
            self.duration.as_secs_f64()
        )?;
        if self.dry_run {
            write!(f, " [dry run]")?;
        }
        Ok(())
    }
}
