use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::MediaType;
use crate::media_ids::MediaIds;

/// An item that cannot be matched across services
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("{media_type} item {title:?} has no IMDb id")]
    MissingKey {
        media_type: MediaType,
        title: Option<String>,
    },
}

/// A single work reference, as held by either service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub ids: MediaIds,
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// 1-10, only set in a ratings context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(imdb_id: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            ids: MediaIds::from_imdb(imdb_id),
            media_type,
            title: None,
            year: None,
            rating: None,
            rated_at: None,
            listed_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_rating(mut self, rating: u8, rated_at: DateTime<Utc>) -> Self {
        self.rating = Some(rating);
        self.rated_at = Some(rated_at);
        self
    }

    /// The cross-service key (the IMDb id).
    pub fn key(&self) -> Result<&str, ItemError> {
        match self.ids.imdb_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ItemError::MissingKey {
                media_type: self.media_type,
                title: self.title.clone(),
            }),
        }
    }

    /// Rating timestamp in UTC RFC 3339 form, e.g. `2024-03-01T20:15:00Z`
    pub fn rated_at_utc(&self) -> Option<String> {
        self.rated_at
            .map(|at| at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}
