use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_IMDB_COOKIE_AT_MAIN: &str = "IMDB_COOKIE_AT_MAIN";
pub const ENV_IMDB_COOKIE_UBID_MAIN: &str = "IMDB_COOKIE_UBID_MAIN";
pub const ENV_IMDB_LIST_IDS: &str = "IMDB_LIST_IDS";
pub const ENV_IMDB_USER_ID: &str = "IMDB_USER_ID";
pub const ENV_TRAKT_CLIENT_ID: &str = "TRAKT_CLIENT_ID";
pub const ENV_TRAKT_CLIENT_SECRET: &str = "TRAKT_CLIENT_SECRET";
pub const ENV_TRAKT_USERNAME: &str = "TRAKT_USERNAME";

/// Sentinel accepted for the list selection meaning "discover every list"
pub const ALL_LISTS: &str = "all";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", format_violations(.0))]
    MissingInputs(Vec<ConfigViolation>),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A required input that is absent, named by its config key and env variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigViolation {
    pub key: &'static str,
    pub env: &'static str,
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.env)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub imdb: ImdbConfig,
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImdbConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_at_main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_ubid_main: Option<String>,
    /// Resolved from the profile page when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Comma separated list ids, or "all"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lists: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            run_on_startup: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 0 */6 * * *".to_string() // Every 6 hours (sec min hour dom mon dow)
}

/// Which source lists a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSelection {
    All,
    Explicit(Vec<String>),
}

impl ListSelection {
    /// Parse a comma separated id list. Whitespace is stripped everywhere and
    /// empty fragments are dropped; duplicates are kept in input order.
    pub fn parse(input: &str) -> Self {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() || compact.eq_ignore_ascii_case(ALL_LISTS) {
            return ListSelection::All;
        }
        let ids: Vec<String> = compact
            .split(',')
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if ids.is_empty() {
            ListSelection::All
        } else {
            ListSelection::Explicit(ids)
        }
    }
}

impl Config {
    /// Load the config file if it exists, otherwise start from defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Overlay values from the environment. `lookup` is `std::env::var(..).ok()`
    /// in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut Option<String>); 7] = [
            (ENV_IMDB_COOKIE_AT_MAIN, &mut self.imdb.cookie_at_main),
            (ENV_IMDB_COOKIE_UBID_MAIN, &mut self.imdb.cookie_ubid_main),
            (ENV_IMDB_LIST_IDS, &mut self.imdb.lists),
            (ENV_IMDB_USER_ID, &mut self.imdb.user_id),
            (ENV_TRAKT_CLIENT_ID, &mut self.trakt.client_id),
            (ENV_TRAKT_CLIENT_SECRET, &mut self.trakt.client_secret),
            (ENV_TRAKT_USERNAME, &mut self.trakt.username),
        ];
        for (key, slot) in targets {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
    }

    /// Every required input that is missing. Never short-circuits.
    pub fn validate(&self) -> Vec<ConfigViolation> {
        let mut violations = Vec::new();
        // An empty list selection is meaningful ("all"), so only presence counts.
        if self.imdb.lists.is_none() {
            violations.push(ConfigViolation {
                key: "imdb.lists",
                env: ENV_IMDB_LIST_IDS,
            });
        }
        let required = [
            ("imdb.cookie_at_main", ENV_IMDB_COOKIE_AT_MAIN, &self.imdb.cookie_at_main),
            ("imdb.cookie_ubid_main", ENV_IMDB_COOKIE_UBID_MAIN, &self.imdb.cookie_ubid_main),
            ("trakt.client_id", ENV_TRAKT_CLIENT_ID, &self.trakt.client_id),
            ("trakt.client_secret", ENV_TRAKT_CLIENT_SECRET, &self.trakt.client_secret),
            ("trakt.username", ENV_TRAKT_USERNAME, &self.trakt.username),
        ];
        for (key, env, value) in required {
            if !is_set(value) {
                violations.push(ConfigViolation { key, env });
            }
        }
        violations
    }

    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let violations = self.validate();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingInputs(violations))
        }
    }

    pub fn list_selection(&self) -> ListSelection {
        ListSelection::parse(self.imdb.lists.as_deref().unwrap_or(ALL_LISTS))
    }
}

fn is_set(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|v| !v.trim().is_empty() && !v.starts_with("YOUR_"))
        .unwrap_or(false)
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn complete_config() -> Config {
        Config {
            imdb: ImdbConfig {
                cookie_at_main: Some("at".to_string()),
                cookie_ubid_main: Some("ubid".to_string()),
                user_id: None,
                lists: Some("ls001,ls002".to_string()),
            },
            trakt: TraktConfig {
                client_id: Some("id".to_string()),
                client_secret: Some("secret".to_string()),
                username: Some("someone".to_string()),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = complete_config();
        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.trakt.client_id.as_deref(), Some("id"));
        assert_eq!(loaded.imdb.lists.as_deref(), Some("ls001,ls002"));
        assert!(!loaded.sync.dry_run);
        assert_eq!(loaded.scheduler.schedule, "0 0 */6 * * *");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.imdb.lists.is_none());
        assert!(config.scheduler.run_on_startup);
    }

    #[test]
    fn test_validate_reports_every_missing_input() {
        let violations = Config::default().validate();
        let keys: Vec<&str> = violations.iter().map(|v| v.key).collect();
        assert_eq!(
            keys,
            vec![
                "imdb.lists",
                "imdb.cookie_at_main",
                "imdb.cookie_ubid_main",
                "trakt.client_id",
                "trakt.client_secret",
                "trakt.username",
            ]
        );

        let err = Config::default().ensure_valid().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("IMDB_COOKIE_AT_MAIN"));
        assert!(message.contains("TRAKT_USERNAME"));
    }

    #[test]
    fn test_validate_placeholders_and_empty_values() {
        let mut config = complete_config();
        assert!(config.validate().is_empty());

        config.trakt.client_id = Some("YOUR_CLIENT_ID".to_string());
        config.imdb.cookie_at_main = Some("  ".to_string());
        config.imdb.lists = Some(String::new());
        let keys: Vec<&str> = config.validate().iter().map(|v| v.key).collect();
        assert_eq!(keys, vec!["imdb.cookie_at_main", "trakt.client_id"]);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_IMDB_LIST_IDS, "all"),
            (ENV_TRAKT_USERNAME, "from-env"),
        ]
        .into_iter()
        .collect();

        let mut config = complete_config();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.trakt.username.as_deref(), Some("from-env"));
        assert_eq!(config.imdb.lists.as_deref(), Some("all"));
        assert_eq!(config.trakt.client_id.as_deref(), Some("id"));
    }

    #[test]
    fn test_list_selection_parse() {
        assert_eq!(ListSelection::parse(""), ListSelection::All);
        assert_eq!(ListSelection::parse("all"), ListSelection::All);
        assert_eq!(ListSelection::parse(" , "), ListSelection::All);
        assert_eq!(
            ListSelection::parse("ls001, ls 002,,ls001"),
            ListSelection::Explicit(vec![
                "ls001".to_string(),
                "ls002".to_string(),
                "ls001".to_string(),
            ])
        );
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh"), "****efgh");
        assert_eq!(mask_secret("abc"), "***");
    }
}
