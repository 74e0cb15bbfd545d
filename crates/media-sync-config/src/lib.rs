pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{
    mask_secret, Config, ConfigError, ConfigViolation, ImdbConfig, ListSelection, SchedulerConfig,
    SyncOptions, TraktConfig, ALL_LISTS,
};
pub use credentials::CredentialStore;
pub use paths::{container_base_path, PathManager};
