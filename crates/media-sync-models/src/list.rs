use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::media::MediaType;

/// A collection read from the source service: a named list or the watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceList {
    pub id: String,
    pub name: String,
    pub items: Vec<Item>,
}

/// Metadata of a list that exists on the mirror service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorList {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trakt_id: Option<u64>,
}

/// One watch event recorded on the mirror
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub media_type: MediaType,
    pub watched_at: DateTime<Utc>,
}

/// Derive the mirror list slug from a display name.
///
/// Lowercases, collapses whitespace runs into a single `-` and drops every
/// character outside `[a-z0-9_-]`.
pub fn mirror_list_slug(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect()
}
