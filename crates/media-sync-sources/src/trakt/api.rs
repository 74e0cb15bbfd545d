use chrono::{DateTime, Utc};
use media_sync_models::{HistoryEntry, Item, MediaIds, MediaType, MirrorList};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::SourceError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    pub imdb: Option<String>,
    pub trakt: Option<u64>,
    pub tmdb: Option<u32>,
    pub tvdb: Option<u32>,
    pub slug: Option<String>,
}

impl From<TraktIds> for MediaIds {
    fn from(ids: TraktIds) -> Self {
        MediaIds {
            // Trakt sometimes includes slashes in IMDb ids
            imdb_id: ids
                .imdb
                .map(|s| s.replace('/', ""))
                .filter(|s| !s.is_empty()),
            trakt_id: ids.trakt,
            tmdb_id: ids.tmdb,
            tvdb_id: ids.tvdb,
            slug: ids.slug,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktMedia {
    pub title: Option<String>,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

/// Entry of a list, the watchlist or the ratings collection
#[derive(Debug, Deserialize)]
pub struct TraktEntry {
    #[serde(rename = "type")]
    pub item_type: String,
    pub rating: Option<u8>,
    pub rated_at: Option<String>,
    pub listed_at: Option<String>,
    pub movie: Option<TraktMedia>,
    pub show: Option<TraktMedia>,
    pub episode: Option<TraktMedia>,
}

#[derive(Debug, Deserialize)]
pub struct TraktListIds {
    pub trakt: Option<u64>,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct TraktList {
    pub name: String,
    pub ids: TraktListIds,
}

impl From<TraktList> for MirrorList {
    fn from(list: TraktList) -> Self {
        MirrorList {
            name: list.name,
            slug: list.ids.slug,
            trakt_id: list.ids.trakt,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktHistoryItem {
    pub id: u64,
    pub watched_at: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

/// What a write payload carries besides the ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Membership,
    Rating,
    History,
}

fn parse_timestamp(value: &str, operation: &str) -> Result<DateTime<Utc>, SourceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SourceError::parse(operation, format!("bad timestamp '{}': {}", value, e)))
}

fn media_type_of(item_type: &str) -> Option<MediaType> {
    match item_type {
        "movie" => Some(MediaType::Movie),
        "show" => Some(MediaType::Show),
        "episode" => Some(MediaType::Episode),
        _ => None,
    }
}

/// Convert Trakt entries into items. Entry types the sync does not handle
/// (seasons, people) are skipped.
pub fn entries_to_items(entries: Vec<TraktEntry>, operation: &str) -> Result<Vec<Item>, SourceError> {
    let mut items = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for entry in entries {
        let Some(media_type) = media_type_of(&entry.item_type) else {
            skipped += 1;
            continue;
        };
        let media = match media_type {
            MediaType::Movie => entry.movie,
            MediaType::Show => entry.show,
            MediaType::Episode => entry.episode,
        }
        .ok_or_else(|| {
            SourceError::parse(operation, format!("{} entry without {} data", media_type, media_type))
        })?;

        let rated_at = entry
            .rated_at
            .as_deref()
            .map(|at| parse_timestamp(at, operation))
            .transpose()?;
        let listed_at = entry
            .listed_at
            .as_deref()
            .map(|at| parse_timestamp(at, operation))
            .transpose()?;

        items.push(Item {
            ids: media.ids.into(),
            media_type,
            title: media.title,
            year: media.year,
            rating: entry.rating,
            rated_at,
            listed_at,
        });
    }

    if skipped > 0 {
        debug!(operation, skipped, "Skipped Trakt entries of unsupported type");
    }
    Ok(items)
}

pub fn history_to_entries(
    history: Vec<TraktHistoryItem>,
    operation: &str,
) -> Result<Vec<HistoryEntry>, SourceError> {
    history
        .into_iter()
        .filter_map(|h| media_type_of(&h.item_type).map(|media_type| (h, media_type)))
        .map(|(h, media_type)| {
            Ok(HistoryEntry {
                id: h.id,
                media_type,
                watched_at: parse_timestamp(&h.watched_at, operation)?,
            })
        })
        .collect()
}

fn ids_object(ids: &MediaIds) -> Map<String, Value> {
    let mut obj = Map::new();
    if let Some(ref imdb) = ids.imdb_id {
        obj.insert("imdb".to_string(), Value::String(imdb.clone()));
    }
    if let Some(trakt) = ids.trakt_id {
        obj.insert("trakt".to_string(), Value::Number(trakt.into()));
    }
    if let Some(tmdb) = ids.tmdb_id {
        obj.insert("tmdb".to_string(), Value::Number(tmdb.into()));
    }
    if let Some(tvdb) = ids.tvdb_id {
        obj.insert("tvdb".to_string(), Value::Number(tvdb.into()));
    }
    if let Some(ref slug) = ids.slug {
        obj.insert("slug".to_string(), Value::String(slug.clone()));
    }
    obj
}

/// Build a `/sync/*` or list-items payload, bucketing items by type
pub fn sync_payload(items: &[Item], kind: PayloadKind) -> Value {
    let mut movies = Vec::new();
    let mut shows = Vec::new();
    let mut episodes = Vec::new();

    for item in items {
        let mut entry = Map::new();
        entry.insert("ids".to_string(), Value::Object(ids_object(&item.ids)));

        match kind {
            PayloadKind::Membership => {}
            PayloadKind::Rating => {
                if let Some(rating) = item.rating {
                    entry.insert("rating".to_string(), json!(rating));
                }
                if let Some(rated_at) = item.rated_at_utc() {
                    entry.insert("rated_at".to_string(), json!(rated_at));
                }
            }
            PayloadKind::History => {
                if let Some(watched_at) = item.rated_at_utc() {
                    entry.insert("watched_at".to_string(), json!(watched_at));
                }
            }
        }

        let bucket = match item.media_type {
            MediaType::Movie => &mut movies,
            MediaType::Show => &mut shows,
            MediaType::Episode => &mut episodes,
        };
        bucket.push(Value::Object(entry));
    }

    json!({
        "movies": movies,
        "shows": shows,
        "episodes": episodes
    })
}

pub fn create_list_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Synced from IMDb",
        "privacy": "private",
        "display_numbers": false,
        "allow_comments": true,
        "sort_by": "rank",
        "sort_how": "asc"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entries(json: Value) -> Vec<TraktEntry> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_entries_to_items() {
        let raw = entries(json!([
            {
                "rank": 1, "listed_at": "2024-01-02T03:04:05.000Z", "type": "movie",
                "movie": {"title": "Heat", "year": 1995, "ids": {"trakt": 1, "imdb": "tt0113277", "slug": "heat-1995"}}
            },
            {
                "rated_at": "2024-02-01T10:00:00.000Z", "rating": 8, "type": "episode",
                "episode": {"title": "Pilot", "ids": {"trakt": 7, "imdb": "/tt0959621/"}},
                "show": {"title": "Breaking Bad", "ids": {"trakt": 9, "imdb": "tt0903747"}}
            },
            {
                "type": "season", "season": {"number": 1}
            }
        ]));

        let items = entries_to_items(raw, "test").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key().unwrap(), "tt0113277");
        assert_eq!(items[0].ids.trakt_id, Some(1));
        assert_eq!(
            items[0].listed_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(items[1].media_type, MediaType::Episode);
        assert_eq!(items[1].key().unwrap(), "tt0959621");
        assert_eq!(items[1].rating, Some(8));
    }

    #[test]
    fn test_entries_without_imdb_id_are_kept() {
        let raw = entries(json!([
            {"type": "show", "show": {"title": "Obscure", "ids": {"trakt": 3, "imdb": null}}}
        ]));
        let items = entries_to_items(raw, "test").unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].key().is_err());
    }

    #[test]
    fn test_entry_missing_media_is_error() {
        let raw = entries(json!([{"type": "movie"}]));
        let err = entries_to_items(raw, "fetch trakt watchlist").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn test_rating_payload() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 20, 15, 0).unwrap();
        let items = vec![
            Item::new("tt1", MediaType::Movie).with_rating(9, at),
            Item::new("tt2", MediaType::Episode).with_rating(6, at),
        ];
        let payload = sync_payload(&items, PayloadKind::Rating);

        assert_eq!(
            payload["movies"],
            json!([{"ids": {"imdb": "tt1"}, "rating": 9, "rated_at": "2024-03-01T20:15:00Z"}])
        );
        assert_eq!(payload["episodes"][0]["ids"]["imdb"], "tt2");
        assert_eq!(payload["shows"], json!([]));
    }

    #[test]
    fn test_history_and_membership_payloads() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let items = vec![Item::new("tt1", MediaType::Show).with_rating(7, at)];

        let history = sync_payload(&items, PayloadKind::History);
        assert_eq!(history["shows"][0]["watched_at"], "2024-03-01T00:00:00Z");
        assert!(history["shows"][0].get("rating").is_none());

        let membership = sync_payload(&items, PayloadKind::Membership);
        assert_eq!(membership["shows"], json!([{"ids": {"imdb": "tt1"}}]));
    }

    #[test]
    fn test_history_to_entries() {
        let raw: Vec<TraktHistoryItem> = serde_json::from_value(json!([
            {"id": 11, "watched_at": "2024-01-01T00:00:00.000Z", "action": "watch", "type": "movie"}
        ]))
        .unwrap();
        let entries = history_to_entries(raw, "test").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 11);
        assert_eq!(entries[0].media_type, MediaType::Movie);
    }
}
