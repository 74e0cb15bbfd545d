// Key-based diff between the two sides of a pairing

use std::collections::HashSet;

use media_sync_models::{Item, ItemError};
use tracing::debug;

/// Items to push to and pull from the mirror for one pairing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    pub to_add: Vec<Item>,
    pub to_remove: Vec<Item>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

fn keys(items: &[Item]) -> Result<HashSet<&str>, ItemError> {
    items.iter().map(Item::key).collect()
}

/// Items of `items` whose key is absent from `other`, first occurrence wins
fn missing_from(items: &[Item], other: &HashSet<&str>) -> Result<Vec<Item>, ItemError> {
    let mut seen = HashSet::new();
    let mut missing = Vec::new();
    for item in items {
        let key = item.key()?;
        if !other.contains(key) && seen.insert(key) {
            missing.push(item.clone());
        }
    }
    Ok(missing)
}

/// Symmetric difference of two collections by item key.
///
/// Rating values are ignored here; see [`rating_updates`].
pub fn compute_diff(source: &[Item], mirror: &[Item]) -> Result<DiffResult, ItemError> {
    let source_keys = keys(source)?;
    let mirror_keys = keys(mirror)?;

    let diff = DiffResult {
        to_add: missing_from(source, &mirror_keys)?,
        to_remove: missing_from(mirror, &source_keys)?,
    };
    debug!(
        source = source.len(),
        mirror = mirror.len(),
        to_add = diff.to_add.len(),
        to_remove = diff.to_remove.len(),
        "Computed diff"
    );
    Ok(diff)
}

/// Mirror ratings that disagree with the source, restamped with the source
/// rating and its timestamp. Builds a new list; neither input is modified.
pub fn rating_updates(source: &[Item], mirror: &[Item]) -> Result<Vec<Item>, ItemError> {
    let mut updates = Vec::new();
    for source_item in source {
        let Some(rating) = source_item.rating else {
            continue;
        };
        let key = source_item.key()?;
        for mirror_item in mirror {
            if mirror_item.media_type != source_item.media_type {
                continue;
            }
            if mirror_item.key()? == key && mirror_item.rating != Some(rating) {
                let mut updated = mirror_item.clone();
                updated.rating = Some(rating);
                updated.rated_at = source_item.rated_at;
                updates.push(updated);
            }
        }
    }
    Ok(updates)
}
