use media_sync_models::{mirror_list_slug, Item, ItemError, SourceList};

use crate::diff::{compute_diff, DiffResult};

/// One source collection matched with its mirror counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPairing {
    pub source_list_id: String,
    /// Slug of the mirror list; `None` for the watchlist and ratings
    pub mirror_list_id: Option<String>,
    pub display_name: String,
    pub is_watchlist: bool,
    pub source_items: Vec<Item>,
    pub mirror_items: Vec<Item>,
}

impl CollectionPairing {
    /// Pairing for a named source list. The mirror id is derived from the
    /// display name and the mirror side starts empty.
    pub fn for_list(list: SourceList) -> Self {
        Self {
            mirror_list_id: Some(mirror_list_slug(&list.name)),
            source_list_id: list.id,
            display_name: list.name,
            is_watchlist: false,
            source_items: list.items,
            mirror_items: Vec::new(),
        }
    }

    pub fn for_watchlist(list: SourceList, mirror_items: Vec<Item>) -> Self {
        Self {
            source_list_id: list.id,
            mirror_list_id: None,
            display_name: list.name,
            is_watchlist: true,
            source_items: list.items,
            mirror_items,
        }
    }

    pub fn for_ratings(source_items: Vec<Item>, mirror_items: Vec<Item>) -> Self {
        Self {
            source_list_id: String::new(),
            mirror_list_id: None,
            display_name: "ratings".to_string(),
            is_watchlist: false,
            source_items,
            mirror_items,
        }
    }

    /// Mirror list slug, derived from the display name when unset
    pub fn mirror_id(&self) -> String {
        self.mirror_list_id
            .clone()
            .unwrap_or_else(|| mirror_list_slug(&self.display_name))
    }

    pub fn difference(&self) -> Result<DiffResult, ItemError> {
        compute_diff(&self.source_items, &self.mirror_items)
    }
}

/// Whether any pairing carries the given mirror list name
pub fn contains(pairings: &[CollectionPairing], name: &str) -> bool {
    pairings.iter().any(|p| p.display_name == name)
}
