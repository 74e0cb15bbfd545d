use async_trait::async_trait;
use chrono::{Duration, Utc};
use media_sync_config::CredentialStore;
use media_sync_models::{HistoryEntry, Item, MediaType, MirrorList};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{check_response, SourceError};
use crate::traits::MirrorClient;
use crate::trakt::api::{self, PayloadKind, TraktEntry, TraktHistoryItem, TraktList};
use crate::trakt::auth;

const BASE_URL: &str = "https://api.trakt.tv";
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

pub struct TraktClient {
    client: Client,
    client_id: String,
    client_secret: String,
    username: String,
    access_token: Option<String>,
}

impl TraktClient {
    pub fn new(client_id: String, client_secret: String, username: String) -> Result<Self, SourceError> {
        Ok(Self {
            client: auth::create_trakt_client()?,
            client_id,
            client_secret,
            username,
            access_token: None,
        })
    }

    /// Client with a known token, no credential store involved
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Obtain an access token: the saved one while it has more than five
    /// minutes left, else a refreshed one, else (when allowed) the
    /// interactive authorization-code flow. New tokens are persisted.
    pub async fn authenticate(
        &mut self,
        store: &mut CredentialStore,
        allow_prompt: bool,
    ) -> Result<(), SourceError> {
        if let (Some(token), Some(expires_at)) = (store.trakt_access_token(), store.trakt_token_expires()) {
            if expires_at > Utc::now() + Duration::minutes(5) {
                info!(%expires_at, "Using saved Trakt access token");
                self.access_token = Some(token.to_string());
                return Ok(());
            }
            info!(%expires_at, "Trakt access token expired or expiring soon");
        }

        let refreshed = match store.trakt_refresh_token() {
            Some(refresh_token) => {
                match auth::refresh_access_token(
                    &self.client,
                    &self.client_id,
                    &self.client_secret,
                    refresh_token,
                )
                .await
                {
                    Ok(token) => Some(token),
                    Err(e) => {
                        warn!(error = %e, "Failed to refresh Trakt token");
                        None
                    }
                }
            }
            None => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None if allow_prompt => {
                auth::authorize_interactive(&self.client, &self.client_id, &self.client_secret).await?
            }
            None => {
                return Err(SourceError::Auth(
                    "no valid Trakt token; run `traktmirror config trakt` to authorize".to_string(),
                ))
            }
        };

        self.access_token = Some(token.access_token.clone());
        store.set_trakt_tokens(token.access_token, token.refresh_token, token.expires_at);
        store
            .save()
            .map_err(|e| SourceError::Auth(format!("failed to save Trakt credentials: {}", e)))?;

        info!("Authenticated to Trakt");
        Ok(())
    }

    fn access_token(&self) -> Result<&str, SourceError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| SourceError::Auth("Trakt client is not authenticated".to_string()))
    }

    fn user_path(&self) -> String {
        format!("/users/{}", urlencoding::encode(&self.username))
    }

    fn request(&self, builder: RequestBuilder) -> Result<RequestBuilder, SourceError> {
        Ok(builder
            .header("Content-Type", "application/json")
            .header("trakt-api-version", "2")
            .header("trakt-api-key", &self.client_id)
            .bearer_auth(self.access_token()?))
    }

    /// Send a request, waiting out `429` responses as told by `Retry-After`
    async fn send(
        &self,
        build: impl Fn() -> RequestBuilder,
        operation: &str,
        resource: &str,
    ) -> Result<Response, SourceError> {
        let mut attempt = 0;
        loop {
            let response = self.request(build())?.send().await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS || attempt >= MAX_RATE_LIMIT_RETRIES {
                return check_response(response, operation, resource).await;
            }

            attempt += 1;
            let wait = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!(operation, attempt, wait_secs = wait, "Trakt rate limit hit, retrying");
            tokio::time::sleep(std::time::Duration::from_secs(wait)).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, operation: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", BASE_URL, path);
        let response = self.send(|| self.client.get(&url), operation, path).await?;
        response.json().await.map_err(|e| SourceError::parse(operation, e))
    }

    async fn post_json(&self, path: &str, body: &Value, operation: &str) -> Result<(), SourceError> {
        let url = format!("{}{}", BASE_URL, path);
        self.send(|| self.client.post(&url).json(body), operation, path)
            .await?;
        Ok(())
    }

    async fn post_items(
        &self,
        path: &str,
        items: &[Item],
        kind: PayloadKind,
        operation: &str,
    ) -> Result<(), SourceError> {
        if items.is_empty() {
            return Ok(());
        }
        let payload = api::sync_payload(items, kind);
        self.post_json(path, &payload, operation).await?;
        debug!(operation, items = items.len(), "Trakt write complete");
        Ok(())
    }

    async fn get_items(&self, path: &str, operation: &str) -> Result<Vec<Item>, SourceError> {
        let entries: Vec<TraktEntry> = self.get_json(path, operation).await?;
        api::entries_to_items(entries, operation)
    }
}

#[async_trait]
impl MirrorClient for TraktClient {
    fn mirror_name(&self) -> &str {
        "trakt"
    }

    async fn list_get(&self, id: &str) -> Result<Vec<Item>, SourceError> {
        let path = format!("{}/lists/{}/items", self.user_path(), id);
        self.get_items(&path, "fetch trakt list items").await
    }

    async fn list_create(&self, id: &str, name: &str) -> Result<(), SourceError> {
        let path = format!("{}/lists", self.user_path());
        self.post_json(&path, &api::create_list_payload(name), "create trakt list")
            .await?;
        info!(list = id, name, "Created Trakt list");
        Ok(())
    }

    async fn list_delete(&self, slug: &str) -> Result<(), SourceError> {
        let operation = "delete trakt list";
        let path = format!("{}/lists/{}", self.user_path(), slug);
        let url = format!("{}{}", BASE_URL, path);
        self.send(|| self.client.delete(&url), operation, &path).await?;
        info!(list = slug, "Deleted Trakt list");
        Ok(())
    }

    async fn lists_get_all(&self) -> Result<Vec<MirrorList>, SourceError> {
        let path = format!("{}/lists", self.user_path());
        let lists: Vec<TraktList> = self.get_json(&path, "fetch trakt lists").await?;
        Ok(lists.into_iter().map(MirrorList::from).collect())
    }

    async fn list_items_add(&self, id: &str, items: &[Item]) -> Result<(), SourceError> {
        let path = format!("{}/lists/{}/items", self.user_path(), id);
        self.post_items(&path, items, PayloadKind::Membership, "add trakt list items")
            .await
    }

    async fn list_items_remove(&self, id: &str, items: &[Item]) -> Result<(), SourceError> {
        let path = format!("{}/lists/{}/items/remove", self.user_path(), id);
        self.post_items(&path, items, PayloadKind::Membership, "remove trakt list items")
            .await
    }

    async fn watchlist_get(&self) -> Result<Vec<Item>, SourceError> {
        self.get_items("/sync/watchlist", "fetch trakt watchlist").await
    }

    async fn watchlist_items_add(&self, items: &[Item]) -> Result<(), SourceError> {
        self.post_items("/sync/watchlist", items, PayloadKind::Membership, "add trakt watchlist items")
            .await
    }

    async fn watchlist_items_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        self.post_items(
            "/sync/watchlist/remove",
            items,
            PayloadKind::Membership,
            "remove trakt watchlist items",
        )
        .await
    }

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError> {
        self.get_items("/sync/ratings", "fetch trakt ratings").await
    }

    async fn ratings_add(&self, items: &[Item]) -> Result<(), SourceError> {
        self.post_items("/sync/ratings", items, PayloadKind::Rating, "add trakt ratings")
            .await
    }

    async fn ratings_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        self.post_items("/sync/ratings/remove", items, PayloadKind::Membership, "remove trakt ratings")
            .await
    }

    async fn history_get(
        &self,
        media_type: MediaType,
        item_id: &str,
    ) -> Result<Vec<HistoryEntry>, SourceError> {
        let operation = "fetch trakt history";
        let path = format!("/sync/history/{}/{}", media_type.plural(), item_id);
        let history: Vec<TraktHistoryItem> = self.get_json(&path, operation).await?;
        api::history_to_entries(history, operation)
    }

    async fn history_add(&self, items: &[Item]) -> Result<(), SourceError> {
        self.post_items("/sync/history", items, PayloadKind::History, "add trakt history")
            .await
    }

    async fn history_remove(&self, items: &[Item]) -> Result<(), SourceError> {
        self.post_items("/sync/history/remove", items, PayloadKind::Membership, "remove trakt history")
            .await
    }
}
