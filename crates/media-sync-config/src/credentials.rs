use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const TRAKT_ACCESS_TOKEN: &str = "trakt_access_token";
const TRAKT_REFRESH_TOKEN: &str = "trakt_refresh_token";
const TRAKT_TOKEN_EXPIRES: &str = "trakt_token_expires";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: BTreeMap<String, String>,
}

/// Trakt OAuth tokens persisted between runs in `credentials.toml`
pub struct CredentialStore {
    path: PathBuf,
    credentials: BTreeMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: BTreeMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)
                .with_context(|| format!("reading {}", self.path.display()))?;
            let creds_data: CredentialsData = toml::from_str(&content)
                .with_context(|| format!("parsing {}", self.path.display()))?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    pub fn trakt_access_token(&self) -> Option<&str> {
        self.credentials.get(TRAKT_ACCESS_TOKEN).map(String::as_str)
    }

    pub fn trakt_refresh_token(&self) -> Option<&str> {
        self.credentials.get(TRAKT_REFRESH_TOKEN).map(String::as_str)
    }

    pub fn trakt_token_expires(&self) -> Option<DateTime<Utc>> {
        self.credentials
            .get(TRAKT_TOKEN_EXPIRES)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_trakt_tokens(&mut self, access: String, refresh: String, expires: DateTime<Utc>) {
        self.credentials.insert(TRAKT_ACCESS_TOKEN.to_string(), access);
        self.credentials.insert(TRAKT_REFRESH_TOKEN.to_string(), refresh);
        self.credentials
            .insert(TRAKT_TOKEN_EXPIRES.to_string(), expires.to_rfc3339());
    }
}
