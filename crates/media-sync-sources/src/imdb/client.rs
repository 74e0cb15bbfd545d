use async_trait::async_trait;
use media_sync_models::{Item, SourceList};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{check_response, SourceError};
use crate::imdb::{parser, scrape};
use crate::traits::SourceClient;

const BASE_URL: &str = "https://www.imdb.com";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Display name given to the watchlist pairing
pub const WATCHLIST_NAME: &str = "watchlist";

/// IMDb accessed with the browser session cookies of a signed-in user
pub struct ImdbClient {
    client: Client,
    user_id: String,
}

impl ImdbClient {
    /// Build the client and resolve the user id from the profile redirect
    /// when it was not configured.
    pub async fn new(
        cookie_at_main: &str,
        cookie_ubid_main: &str,
        user_id: Option<String>,
    ) -> Result<Self, SourceError> {
        let cookie = format!("at-main={}; ubid-main={}", cookie_at_main, cookie_ubid_main);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&cookie)
                .map_err(|_| SourceError::Auth("IMDb cookies contain invalid characters".to_string()))?,
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let user_id = match user_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => Self::resolve_user_id(&client).await?,
        };
        info!(user_id = %user_id, "Using IMDb account");

        Ok(Self { client, user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn resolve_user_id(client: &Client) -> Result<String, SourceError> {
        let response = client.get(format!("{}/profile", BASE_URL)).send().await?;
        let response = check_response(response, "resolve imdb user id", "imdb profile").await?;
        scrape::extract_user_id(response.url().as_str()).ok_or_else(|| {
            SourceError::Auth(
                "could not resolve the IMDb user id; the session cookies may have expired".to_string(),
            )
        })
    }

    async fn get_page(&self, path: &str, operation: &str) -> Result<String, SourceError> {
        let response = self.client.get(format!("{}{}", BASE_URL, path)).send().await?;
        let response = check_response(response, operation, path).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SourceClient for ImdbClient {
    fn source_name(&self) -> &str {
        "imdb"
    }

    async fn list_get(&self, id: &str) -> Result<SourceList, SourceError> {
        let operation = "export imdb list";
        let response = self
            .client
            .get(format!("{}/list/{}/export", BASE_URL, id))
            .send()
            .await?;
        let response = check_response(response, operation, &format!("imdb list {}", id)).await?;

        let name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(scrape::list_name_from_content_disposition)
            .unwrap_or_else(|| id.to_string());
        let body = response.text().await?;
        let items =
            parser::parse_list_csv(body.as_bytes()).map_err(|e| SourceError::parse(operation, e))?;

        debug!(list_id = id, name = %name, items = items.len(), "Fetched IMDb list");
        Ok(SourceList {
            id: id.to_string(),
            name,
            items,
        })
    }

    async fn lists_discover_all(&self) -> Result<Vec<SourceList>, SourceError> {
        let html = self
            .get_page(&format!("/user/{}/lists", self.user_id), "scrape imdb lists")
            .await?;
        let ids = scrape::extract_list_ids(&html);
        info!(lists = ids.len(), "Discovered IMDb lists");

        let mut lists = Vec::with_capacity(ids.len());
        for id in ids {
            lists.push(self.list_get(&id).await?);
        }
        Ok(lists)
    }

    async fn watchlist_get(&self) -> Result<SourceList, SourceError> {
        let operation = "scrape imdb watchlist";
        let html = self
            .get_page(&format!("/user/{}/watchlist", self.user_id), operation)
            .await?;
        let id = scrape::extract_watchlist_id(&html)
            .ok_or_else(|| SourceError::parse(operation, "watchlist page has no list id"))?;

        let mut watchlist = self.list_get(&id).await?;
        watchlist.name = WATCHLIST_NAME.to_string();
        Ok(watchlist)
    }

    async fn ratings_get(&self) -> Result<Vec<Item>, SourceError> {
        let operation = "export imdb ratings";
        let body = self
            .get_page(&format!("/user/{}/ratings/export", self.user_id), operation)
            .await?;
        let ratings =
            parser::parse_ratings_csv(body.as_bytes()).map_err(|e| SourceError::parse(operation, e))?;
        debug!(ratings = ratings.len(), "Fetched IMDb ratings");
        Ok(ratings)
    }
}
