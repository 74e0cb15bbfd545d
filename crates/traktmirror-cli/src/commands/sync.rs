use super::config::load_config;
use super::sync_ui::SyncUI;
use crate::output::Output;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use media_sync_config::{Config, CredentialStore, PathManager};
use media_sync_core::{SyncOrchestrator, SyncReport};
use media_sync_sources::{ImdbClient, TraktClient};
use owo_colors::OwoColorize;

fn required(value: &Option<String>, key: &str) -> Result<String> {
    value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| eyre!("{} is not configured", key))
}

/// Build both clients and the orchestrator for one run. Trakt tokens are
/// refreshed and persisted as needed; `allow_prompt` permits the
/// interactive authorization fallback.
pub async fn build_orchestrator(
    paths: &PathManager,
    config: &Config,
    dry_run: bool,
    allow_prompt: bool,
) -> Result<SyncOrchestrator> {
    let imdb = ImdbClient::new(
        &required(&config.imdb.cookie_at_main, "imdb.cookie_at_main")?,
        &required(&config.imdb.cookie_ubid_main, "imdb.cookie_ubid_main")?,
        config.imdb.user_id.clone(),
    )
    .await
    .wrap_err("Failed to connect to IMDb")?;

    let credentials_file = paths.credentials_file();
    let mut store = CredentialStore::new(credentials_file.clone());
    store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let mut trakt = TraktClient::new(
        required(&config.trakt.client_id, "trakt.client_id")?,
        required(&config.trakt.client_secret, "trakt.client_secret")?,
        required(&config.trakt.username, "trakt.username")?,
    )?;
    trakt
        .authenticate(&mut store, allow_prompt)
        .await
        .wrap_err("Failed to authenticate with Trakt")?;

    Ok(SyncOrchestrator::new(Box::new(imdb), Box::new(trakt)).with_dry_run(dry_run))
}

pub async fn run_sync(
    paths: &PathManager,
    lists: Option<String>,
    dry_run: bool,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Sync command started");

    let config = load_config(paths, lists)?;
    let dry_run = dry_run || config.sync.dry_run;
    let selection = config.list_selection();

    let ui = SyncUI::new(output.is_human());
    ui.set_message("Connecting to IMDb and Trakt...");
    let orchestrator = build_orchestrator(paths, &config, dry_run, true).await?;

    ui.set_message("Syncing lists and ratings...");
    let result = orchestrator.sync(&selection).await;
    ui.finish();
    let report = result.wrap_err("Sync failed")?;

    print_report(&report, output);
    Ok(())
}

pub fn print_report(report: &SyncReport, output: &Output) {
    if !output.is_human() {
        let mut json = serde_json::to_value(report).unwrap_or_default();
        if let Some(obj) = json.as_object_mut() {
            obj.insert("success".to_string(), serde_json::Value::Bool(true));
        }
        output.json(&json);
        return;
    }

    if report.dry_run {
        output.warn("Dry run: nothing was written to Trakt");
    }
    output.success(format!(
        "Sync completed in {:.1}s: {} lists",
        report.duration.as_secs_f64(),
        report.lists_synced
    ));
    let rows = [
        ("Lists created", report.lists_created),
        ("Lists deleted", report.lists_deleted),
        ("Items added", report.items_added),
        ("Items removed", report.items_removed),
        ("Ratings added", report.ratings_added),
        ("Ratings removed", report.ratings_removed),
        ("Ratings updated", report.ratings_updated),
        ("History added", report.history_added),
        ("History removed", report.history_removed),
    ];
    for (label, count) in rows {
        if count > 0 {
            output.info(format!("  {:<16} {}", label, count.bold()));
        }
    }
    if report.total_changes() == 0 {
        output.info("  Trakt was already up to date");
    }
}
