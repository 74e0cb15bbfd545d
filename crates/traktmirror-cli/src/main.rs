use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, sync};
use logging::LoggingOptions;
use media_sync_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "traktmirror")]
#[command(about = "Mirror IMDb lists, watchlist and ratings to Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation from IMDb to Trakt
    #[command(long_about = "Fetch the selected IMDb lists, the watchlist and all ratings, then bring Trakt in line: list items are added and removed, lists that no longer exist on IMDb are deleted, ratings are added, removed or updated and watch history is kept consistent with them.")]
    Sync {
        /// Comma separated IMDb list ids, or 'all' to discover every list
        #[arg(long, value_name = "IDS")]
        lists: Option<String>,

        /// Show what would change without writing to Trakt
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Run syncs on a cron schedule until interrupted
    #[command(long_about = "Run traktmirror in the foreground and perform a full sync on every tick of the configured cron schedule. A failed run is logged and the next tick runs as usual. Stop with Ctrl-C.")]
    Daemon {
        /// Cron schedule with seconds (e.g. '0 0 */6 * * *' for every 6 hours)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the sync that normally runs at startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_sync: bool,
    },
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Print secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Store IMDb session cookies and list selection
    #[command(long_about = "Store the at-main and ubid-main cookies of a signed-in IMDb browser session, plus the lists to mirror. Cookies are prompted for without echo when not passed as flags.")]
    Imdb {
        /// Comma separated list ids, or 'all'
        #[arg(long)]
        lists: Option<String>,

        /// IMDb user id (urNNNNNNN); resolved from the session when omitted
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Store Trakt API credentials and authorize the account
    #[command(long_about = "Store the Trakt API application credentials and run the OAuth authorization-code flow. Create an application at https://trakt.tv/oauth/applications first.")]
    Trakt {
        #[arg(long)]
        client_id: Option<String>,

        #[arg(long)]
        client_secret: Option<String>,

        /// Trakt username owning the mirrored lists
        #[arg(long)]
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let paths = PathManager::default();

    let log_file = match cli.command {
        Commands::Daemon { .. } => Some(paths.daemon_log_file()),
        _ => None,
    };
    logging::init_logging(LoggingOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        log_file,
    })
    .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::Sync { lists, dry_run } => sync::run_sync(&paths, lists, dry_run, &output).await,
        Commands::Daemon {
            schedule,
            no_startup_sync,
        } => daemon::run_daemon(&paths, schedule, no_startup_sync, &output).await,
        Commands::Config { cmd } => config::run_config(&paths, cmd, &output).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "traktmirror failed");
    }
    result
}
