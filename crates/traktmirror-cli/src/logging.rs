use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub struct LoggingOptions {
    pub verbose: u8,
    pub quiet: bool,
    /// Daily rolling file instead of stderr
    pub log_file: Option<PathBuf>,
}

/// Filter directive for the given verbosity. `RUST_LOG` wins unless quiet.
fn filter_directive(verbose: u8, quiet: bool, rust_log: Option<&str>) -> String {
    if quiet {
        return "error".to_string();
    }
    if let Some(env) = rust_log.filter(|s| !s.trim().is_empty()) {
        return env.to_string();
    }
    match verbose {
        0 => "info",
        // hyper connection chatter drowns everything at debug
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    }
    .to_string()
}

pub fn init_logging(options: LoggingOptions) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(filter_directive(options.verbose, options.quiet, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = options.log_file {
        let log_dir = log_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
        std::fs::create_dir_all(log_dir)?;

        // traktmirror.log -> traktmirror.YYYY-MM-DD
        let log_filename = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
        let log_prefix = log_filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(log_filename);
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

        if json {
            let layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);
            registry.with(layer).init();
        } else {
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);
            registry.with(layer).init();
        }
    } else if json {
        let layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(layer).init();
    } else {
        let layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(layer).init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(0, false, None), "info");
        assert!(filter_directive(1, false, None).starts_with("debug,hyper"));
        assert_eq!(filter_directive(3, false, None), "trace");
        assert_eq!(filter_directive(2, true, Some("debug")), "error");
        assert_eq!(filter_directive(0, false, Some("media_sync_core=trace")), "media_sync_core=trace");
        assert_eq!(filter_directive(0, false, Some("  ")), "info");
    }
}
