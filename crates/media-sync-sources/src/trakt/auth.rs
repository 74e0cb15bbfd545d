use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::io::{self, Write};

use crate::error::{check_response, SourceError};

const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const TOKEN_URL: &str = "https://api.trakt.tv/oauth/token";
const AUTHORIZE_URL: &str = "https://trakt.tv/oauth/authorize";

/// Create a reqwest Client with browser-like headers to bypass Cloudflare
pub fn create_trakt_client() -> Result<Client, SourceError> {
    Ok(Client::builder()
        .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .build()?)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

#[derive(Debug)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenResponse> for TokenInfo {
    fn from(token: TokenResponse) -> Self {
        // Two minutes of slack so a token is never used right at its expiry
        let expires_at = Utc::now() + Duration::seconds(token.expires_in - 120);
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
        }
    }
}

pub fn authorization_url(client_id: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(REDIRECT_URI)
    )
}

pub async fn refresh_access_token(
    client: &Client,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenInfo, SourceError> {
    let payload = serde_json::json!({
        "refresh_token": refresh_token,
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": REDIRECT_URI,
        "grant_type": "refresh_token"
    });
    request_token(client, &payload, "refresh trakt token").await
}

pub async fn exchange_code(
    client: &Client,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenInfo, SourceError> {
    let payload = serde_json::json!({
        "code": code,
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": REDIRECT_URI,
        "grant_type": "authorization_code"
    });
    request_token(client, &payload, "exchange trakt authorization code").await
}

/// Authorization-code flow on the terminal: print the URL, read the code.
pub async fn authorize_interactive(
    client: &Client,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenInfo, SourceError> {
    println!("\nPlease visit the following URL to authorize this application:");
    println!("{}\n", authorization_url(client_id));
    print!("Please enter the authorization code from the URL: ");

    let mut code = String::new();
    io::stdout()
        .flush()
        .and_then(|_| io::stdin().read_line(&mut code))
        .map_err(|e| SourceError::Auth(format!("failed to read authorization code: {}", e)))?;
    let code = code.trim();

    if code.is_empty() {
        return Err(SourceError::Auth("Authorization code cannot be empty".to_string()));
    }

    exchange_code(client, client_id, client_secret, code).await
}

async fn request_token(
    client: &Client,
    payload: &serde_json::Value,
    operation: &str,
) -> Result<TokenInfo, SourceError> {
    let response = client
        .post(TOKEN_URL)
        .json(payload)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .header("Origin", "https://trakt.tv")
        .header("Referer", "https://trakt.tv/")
        .send()
        .await?;

    let response = check_response(response, operation, "trakt oauth token").await?;
    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SourceError::parse(operation, e))?;
    Ok(token.into())
}
