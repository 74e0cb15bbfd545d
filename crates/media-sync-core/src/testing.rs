//! In-memory source and mirror clients that record every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use media_sync_models::{mirror_list_slug, HistoryEntry, Item, MediaType, MirrorList, SourceList};
use media_sync_sources::{MirrorClient, SourceClient, SourceError};

pub fn movie(imdb_id: &str) -> Item {
    Item::new(imdb_id, MediaType::Movie)
}

pub fn rated(imdb_id: &str, rating: u8) -> Item {
    let at = Utc.with_ymd_and_hms(2024, 1, 15, 18, 30, 0).unwrap();
    Item::new(imdb_id, MediaType::Movie).with_rating(rating, at)
}

pub fn source_list(id: &str, name: &str, items: Vec<Item>) -> SourceList {
    SourceList {
        id: id.to_string(),
        name: name.to_string(),
        items,
    }
}

fn keys(items: &[Item]) -> Vec<String> {
    items.iter().filter_map(|i| i.key().ok()).map(str::to_string).collect()
}

fn server_error(operation: &str) -> SourceError {
    SourceError::Api {
        operation: operation.to_string(),
        status: 500,
        body: "internal error".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    ListGet(String),
    ListsDiscoverAll,
    WatchlistGet,
    RatingsGet,
}

#[derive(Default)]
struct SourceState {
    lists: Vec<SourceList>,
    watchlist: Option<SourceList>,
    ratings: Vec<Item>,
    failing_lists: HashSet<String>,
    failing_watchlist: bool,
    calls: Vec<SourceCall>,
}

#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<SourceState>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap()
    }

    pub fn with_list(self, list: SourceList) -> Self {
        self.state().lists.push(list);
        self
    }

    pub fn with_watchlist(self, items: Vec<Item>) -> Self {
        self.state().watchlist = Some(source_list("ls-watch", "watchlist", items));
        self
    }

    pub fn with_ratings(self, ratings: Vec<Item>) -> Self {
        self.state().ratings = ratings;
        self
    }

    /// Make `list_get` for this id fail with a server error
    pub fn failing_list(self, id: &str) -> Self {
        self.state().failing_lists.insert(id.to_string());
        self
    }

    /// Make `watchlist_get` fail with a server error
    pub fn failing_watchlist(self) -> Self {
        self.state().failing_watchlist = true;
        self
    }

    pub fn set_list_items(&self, id: &str, items: Vec<Item>) {
        if let Some(list) = self.state().lists.iter_mut().find(|l| l.id == id) {
            list.items = items;
        }
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl SourceClient for FakeSource {
    fn source_name(&self) -> &str {
        "fake-source"
    }

    async fn list_get(&self, id: &str) -> Result<SourceList, SourceError> {
        let mut state = self.state();
        state.calls.push(SourceCall::ListGet(id.to_string()));
        if state.failing_lists.contains(id) {
            return Err(server_error("export list"));
        }
        state
            .lists
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("list {}", id)))
    }

    async fn lists_discover_all(&self) -> Result<Vec<SourceList>, SourceError> {
        let mut state = self.state();
        state.calls.push(SourceCall::ListsDiscoverAll);
        Ok(state.lists.clone())
    }

    async fn watchlist_get(&self) -> Result<SourceList, SourceError> {
        let mut state = self.state();
        state.calls.push(SourceCall::WatchlistGet);
        if state.failing_watchlist {
            return Err(server_error("fetch watchlist"));
        }
        Ok(state
            .watchlist
            .clone()
            .unwrap_or_else(|| source_list("ls-watch", "watchlist", Vec::new())))
    }

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError> {
        let mut state = self.state();
        state.calls.push(SourceCall::RatingsGet);
        Ok(state.ratings.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorCall {
    ListGet(String),
    ListCreate { id: String, name: String },
    ListDelete(String),
    ListsGetAll,
    ListItemsAdd { id: String, keys: Vec<String> },
    ListItemsRemove { id: String, keys: Vec<String> },
    WatchlistGet,
    WatchlistAdd(Vec<String>),
    WatchlistRemove(Vec<String>),
    RatingsGet,
    RatingsAdd(Vec<(String, Option<u8>)>),
    RatingsRemove(Vec<String>),
    HistoryGet(MediaType, String),
    HistoryAdd(Vec<String>),
    HistoryRemove(Vec<String>),
}

impl MirrorCall {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            MirrorCall::ListGet(_)
                | MirrorCall::ListsGetAll
                | MirrorCall::WatchlistGet
                | MirrorCall::RatingsGet
                | MirrorCall::HistoryGet(..)
        )
    }
}

struct FakeList {
    name: String,
    slug: String,
    items: Vec<Item>,
}

#[derive(Default)]
struct MirrorState {
    lists: Vec<FakeList>,
    watchlist: Vec<Item>,
    ratings: Vec<Item>,
    history: HashMap<String, Vec<HistoryEntry>>,
    next_history_id: u64,
    fail_on: Option<&'static str>,
    calls: Vec<MirrorCall>,
}

impl MirrorState {
    fn record(&mut self, call: MirrorCall, operation: &'static str) -> Result<(), SourceError> {
        self.calls.push(call);
        if self.fail_on == Some(operation) {
            return Err(server_error(operation));
        }
        Ok(())
    }

    fn list_mut(&mut self, id: &str) -> Result<&mut FakeList, SourceError> {
        self.lists
            .iter_mut()
            .find(|l| l.slug == id)
            .ok_or_else(|| SourceError::not_found(format!("list {}", id)))
    }
}

fn add_missing(target: &mut Vec<Item>, items: &[Item]) {
    for item in items {
        if !target.iter().any(|t| t.key().ok() == item.key().ok()) {
            target.push(item.clone());
        }
    }
}

fn remove_present(target: &mut Vec<Item>, items: &[Item]) {
    let gone = keys(items);
    target.retain(|t| !t.key().map(|k| gone.iter().any(|g| g == k)).unwrap_or(false));
}

/// Stateful mirror: writes are applied so a second run sees their effect.
#[derive(Clone, Default)]
pub struct FakeMirror {
    state: Arc<Mutex<MirrorState>>,
}

impl FakeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap()
    }

    pub fn seed_list(&self, name: &str, items: Vec<Item>) {
        self.state().lists.push(FakeList {
            name: name.to_string(),
            slug: mirror_list_slug(name),
            items,
        });
    }

    pub fn seed_watchlist(&self, items: Vec<Item>) {
        self.state().watchlist = items;
    }

    pub fn seed_ratings(&self, items: Vec<Item>) {
        self.state().ratings = items;
    }

    pub fn seed_history(&self, imdb_id: &str) {
        let mut state = self.state();
        state.next_history_id += 1;
        let entry = HistoryEntry {
            id: state.next_history_id,
            media_type: MediaType::Movie,
            watched_at: Utc::now(),
        };
        state.history.entry(imdb_id.to_string()).or_default().push(entry);
    }

    /// Fail the named operation (e.g. `"ratings_add"`) with a server error
    pub fn fail_on(&self, operation: &'static str) {
        self.state().fail_on = Some(operation);
    }

    pub fn calls(&self) -> Vec<MirrorCall> {
        self.state().calls.clone()
    }

    pub fn writes(&self) -> Vec<MirrorCall> {
        self.calls().into_iter().filter(MirrorCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn list_names(&self) -> Vec<String> {
        self.state().lists.iter().map(|l| l.name.clone()).collect()
    }

    pub fn list_keys(&self, slug: &str) -> Vec<String> {
        self.state()
            .lists
            .iter()
            .find(|l| l.slug == slug)
            .map(|l| keys(&l.items))
            .unwrap_or_default()
    }

    pub fn watchlist_keys(&self) -> Vec<String> {
        keys(&self.state().watchlist)
    }

    pub fn rating_of(&self, imdb_id: &str) -> Option<u8> {
        self.state()
            .ratings
            .iter()
            .find(|r| r.key().ok() == Some(imdb_id))
            .and_then(|r| r.rating)
    }

    pub fn rated_at_of(&self, imdb_id: &str) -> Option<DateTime<Utc>> {
        self.state()
            .ratings
            .iter()
            .find(|r| r.key().ok() == Some(imdb_id))
            .and_then(|r| r.rated_at)
    }

    pub fn history_count(&self, imdb_id: &str) -> usize {
        self.state().history.get(imdb_id).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl MirrorClient for FakeMirror {
    fn mirror_name(&self) -> &str {
        "fake-mirror"
    }

    async fn list_get(&self, id: &str) -> Result<Vec<Item>, SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::ListGet(id.to_string()), "list_get")?;
        Ok(state.list_mut(id)?.items.clone())
    }

    async fn list_create(&self, id: &str, name: &str) -> Result<(), SourceError> {
        let mut state = self.state();
        let call = MirrorCall::ListCreate {
            id: id.to_string(),
            name: name.to_string(),
        };
        state.record(call, "list_create")?;
        state.lists.push(FakeList {
            name: name.to_string(),
            slug: mirror_list_slug(name),
            items: Vec::new(),
        });
        Ok(())
    }

    async fn list_delete(&self, slug: &str) -> Result<(), SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::ListDelete(slug.to_string()), "list_delete")?;
        state.lists.retain(|l| l.slug != slug);
        Ok(())
    }

    async fn lists_get_all(&self) -> Result<Vec<MirrorList>, SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::ListsGetAll, "lists_get_all")?;
        Ok(state
            .lists
            .iter()
            .map(|l| MirrorList {
                name: l.name.clone(),
                slug: l.slug.clone(),
                trakt_id: None,
            })
            .collect())
    }

    async fn list_items_add(&self, id: &str, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        let call = MirrorCall::ListItemsAdd {
            id: id.to_string(),
            keys: keys(items),
        };
        state.record(call, "list_items_add")?;
        add_missing(&mut state.list_mut(id)?.items, items);
        Ok(())
    }

    async fn list_items_remove(&self, id: &str, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        let call = MirrorCall::ListItemsRemove {
            id: id.to_string(),
            keys: keys(items),
        };
        state.record(call, "list_items_remove")?;
        remove_present(&mut state.list_mut(id)?.items, items);
        Ok(())
    }

    async fn watchlist_get(&self) -> Result<Vec<Item>, SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::WatchlistGet, "watchlist_get")?;
        Ok(state.watchlist.clone())
    }

    async fn watchlist_items_add(&self, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::WatchlistAdd(keys(items)), "watchlist_items_add")?;
        add_missing(&mut state.watchlist, items);
        Ok(())
    }

    async fn watchlist_items_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::WatchlistRemove(keys(items)), "watchlist_items_remove")?;
        remove_present(&mut state.watchlist, items);
        Ok(())
    }

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::RatingsGet, "ratings_get")?;
        Ok(state.ratings.clone())
    }

    async fn ratings_add(&self, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        let rated = items
            .iter()
            .filter_map(|i| i.key().ok().map(|k| (k.to_string(), i.rating)))
            .collect();
        state.record(MirrorCall::RatingsAdd(rated), "ratings_add")?;
        remove_present(&mut state.ratings, items);
        state.ratings.extend(items.iter().cloned());
        Ok(())
    }

    async fn ratings_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::RatingsRemove(keys(items)), "ratings_remove")?;
        remove_present(&mut state.ratings, items);
        Ok(())
    }

    async fn history_get(
        &self,
        media_type: MediaType,
        item_id: &str,
    ) -> Result<Vec<HistoryEntry>, SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::HistoryGet(media_type, item_id.to_string()), "history_get")?;
        Ok(state.history.get(item_id).cloned().unwrap_or_default())
    }

    async fn history_add(&self, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::HistoryAdd(keys(items)), "history_add")?;
        for key in keys(items) {
            state.next_history_id += 1;
            let entry = HistoryEntry {
                id: state.next_history_id,
                media_type: MediaType::Movie,
                watched_at: Utc::now(),
            };
            state.history.entry(key).or_default().push(entry);
        }
        Ok(())
    }

    async fn history_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        let mut state = self.state();
        state.record(MirrorCall::HistoryRemove(keys(items)), "history_remove")?;
        for key in keys(items) {
            state.history.remove(&key);
        }
        Ok(())
    }
}
