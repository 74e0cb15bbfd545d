use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use media_sync_config::{mask_secret, Config, CredentialStore, PathManager};
use media_sync_sources::trakt::auth;
use owo_colors::OwoColorize;
use serde_json::json;

/// Config file, then environment, then `--lists`; fails listing every
/// missing input.
pub fn load_config(paths: &PathManager, lists_override: Option<String>) -> Result<Config> {
    let mut config = read_config(paths)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(lists) = lists_override {
        config.imdb.lists = Some(lists);
    }
    config.ensure_valid()?;
    Ok(config)
}

fn read_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    Config::load(&config_file).wrap_err_with(|| format!("Failed to load config from {}", config_file.display()))
}

fn save_config(paths: &PathManager, config: &Config) -> Result<()> {
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    let config_file = paths.config_file();
    config
        .save_to_file(&config_file)
        .wrap_err_with(|| format!("Failed to save config to {}", config_file.display()))
}

pub async fn run_config(paths: &PathManager, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(paths, full, output),
        ConfigCommands::Imdb { lists, user_id } => configure_imdb(paths, lists, user_id, output),
        ConfigCommands::Trakt {
            client_id,
            client_secret,
            username,
        } => configure_trakt(paths, client_id, client_secret, username, output).await,
    }
}

fn display_secret(value: &Option<String>, full: bool) -> String {
    match value.as_deref() {
        Some(v) if full => v.to_string(),
        Some(v) => mask_secret(v),
        None => "<not set>".to_string(),
    }
}

fn display_plain(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "<not set>".to_string())
}

fn show_config(paths: &PathManager, full: bool, output: &Output) -> Result<()> {
    let mut config = read_config(paths)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    let violations = config.validate();
    let missing: Vec<String> = violations.iter().map(|v| v.to_string()).collect();

    let rows = [
        ("imdb.lists", display_plain(&config.imdb.lists)),
        ("imdb.user_id", display_plain(&config.imdb.user_id)),
        ("imdb.cookie_at_main", display_secret(&config.imdb.cookie_at_main, full)),
        ("imdb.cookie_ubid_main", display_secret(&config.imdb.cookie_ubid_main, full)),
        ("trakt.client_id", display_secret(&config.trakt.client_id, full)),
        ("trakt.client_secret", display_secret(&config.trakt.client_secret, full)),
        ("trakt.username", display_plain(&config.trakt.username)),
        ("sync.dry_run", config.sync.dry_run.to_string()),
        ("scheduler.schedule", config.scheduler.schedule.clone()),
        ("scheduler.run_on_startup", config.scheduler.run_on_startup.to_string()),
    ];

    if !output.is_human() {
        let values: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|(key, value)| (key.to_string(), json!(value)))
            .collect();
        output.json(&json!({
            "config_file": paths.config_file().display().to_string(),
            "values": values,
            "missing": missing,
        }));
        return Ok(());
    }

    output.info(format!("{}", "Configuration".bold().bright_cyan()));
    output.info(format!("  {:<26} {}", "file", paths.config_file().display()));
    for (key, value) in &rows {
        output.info(format!("  {:<26} {}", key, value));
    }
    if missing.is_empty() {
        output.success("All required settings are present");
    } else {
        output.warn(format!("Missing required settings: {}", missing.join(", ")));
    }
    Ok(())
}

fn configure_imdb(
    paths: &PathManager,
    lists: Option<String>,
    user_id: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut config = read_config(paths)?;

    output.info("Copy the at-main and ubid-main cookies from a browser signed in to imdb.com.");
    config.imdb.cookie_at_main = Some(prompts::prompt_secret("IMDb at-main cookie")?);
    config.imdb.cookie_ubid_main = Some(prompts::prompt_secret("IMDb ubid-main cookie")?);

    let current_lists = config.imdb.lists.clone();
    let lists = prompts::value_or_prompt(
        lists,
        "IMDb list ids (comma separated, or 'all')",
        Some(current_lists.as_deref().unwrap_or(media_sync_config::ALL_LISTS)),
    )?;
    config.imdb.lists = Some(lists);

    if let Some(user_id) = user_id.filter(|id| !id.trim().is_empty()) {
        config.imdb.user_id = Some(user_id.trim().to_string());
    }

    save_config(paths, &config)?;
    output.success(format!("IMDb settings saved to {}", paths.config_file().display()));
    Ok(())
}

async fn configure_trakt(
    paths: &PathManager,
    client_id: Option<String>,
    client_secret: Option<String>,
    username: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut config = read_config(paths)?;

    output.info("Create a Trakt API application at https://trakt.tv/oauth/applications");
    output.info("and use 'urn:ietf:wg:oauth:2.0:oob' as its redirect URI.");

    let client_id = prompts::value_or_prompt(client_id, "Trakt client id", config.trakt.client_id.as_deref())?;
    let client_secret = match client_secret {
        Some(secret) if !secret.trim().is_empty() => secret.trim().to_string(),
        _ => prompts::prompt_secret("Trakt client secret")?,
    };
    let username = prompts::value_or_prompt(username, "Trakt username", config.trakt.username.as_deref())?;
    if client_id.is_empty() || username.is_empty() {
        return Err(eyre!("Trakt client id and username are required"));
    }

    config.trakt.client_id = Some(client_id.clone());
    config.trakt.client_secret = Some(client_secret.clone());
    config.trakt.username = Some(username);
    save_config(paths, &config)?;

    let client = auth::create_trakt_client()?;
    let token = auth::authorize_interactive(&client, &client_id, &client_secret)
        .await
        .wrap_err("Trakt authorization failed")?;

    let mut store = CredentialStore::new(paths.credentials_file());
    store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    store.set_trakt_tokens(token.access_token, token.refresh_token, token.expires_at);
    store
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success(format!(
        "Trakt authorized; token valid until {}",
        token.expires_at.format("%Y-%m-%d")
    ));
    Ok(())
}
