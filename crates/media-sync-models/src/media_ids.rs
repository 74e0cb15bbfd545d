use serde::{Deserialize, Serialize};

/// Identifiers an item is known by across both services.
///
/// The IMDb id is the cross-service key; the Trakt-side ids are carried along
/// so that writes can address items precisely when Trakt returned them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trakt_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl MediaIds {
    pub fn from_imdb(imdb_id: impl Into<String>) -> Self {
        Self {
            imdb_id: Some(imdb_id.into()),
            ..Self::default()
        }
    }

    /// Check if all ID fields are empty
    pub fn is_empty(&self) -> bool {
        self.imdb_id.is_none()
            && self.trakt_id.is_none()
            && self.tmdb_id.is_none()
            && self.tvdb_id.is_none()
            && self.slug.is_none()
    }

    /// Fill in ids missing on `self` from `other`. Existing values win.
    pub fn merge(&mut self, other: &MediaIds) {
        if self.imdb_id.is_none() {
            self.imdb_id = other.imdb_id.clone();
        }
        if self.trakt_id.is_none() {
            self.trakt_id = other.trakt_id;
        }
        if self.tmdb_id.is_none() {
            self.tmdb_id = other.tmdb_id;
        }
        if self.tvdb_id.is_none() {
            self.tvdb_id = other.tvdb_id;
        }
        if self.slug.is_none() {
            self.slug = other.slug.clone();
        }
    }
}
