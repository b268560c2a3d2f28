//! `timeline` — operator tool for the feed store.
//!
//! Loads configuration, sets up structured logging, and then migrates the
//! store or prints feeds as JSON lines.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use timeline_track::{FeedReader, SqliteListStore, StoreError, StoreSetupError};
use timeline_types::{FeedKey, ParseFeedKeyError};
use tracing_subscriber::EnvFilter;

/// Inspect and maintain timeline activity feeds.
#[derive(Debug, Parser)]
#[command(name = "timeline", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "TIMELINE_CONFIG_PATH", default_value = "timeline.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or upgrade the feed store schema.
    Migrate,
    /// Print a feed, newest first, one JSON activity per line.
    Feed {
        /// Feed key, e.g. `global:activity` or `user:id:1:mentions`.
        key: String,
        /// Number of newest entries to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Maximum number of entries to print.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print the number of entries in a feed.
    Len {
        /// Feed key.
        key: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Setup(#[from] StoreSetupError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    FeedKey(#[from] ParseFeedKeyError),
    #[error("failed to render activity: {0}")]
    Render(#[from] serde_json::Error),
}

fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed when running under tests.
    let installed = if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load_config(Some(&cli.config))?;
    init_tracing(&config.logging);

    if !config.from_file {
        tracing::info!(path = %cli.config, "config file not found, using defaults");
    }

    tracing::info!(
        path = %cli.config,
        store = %config.store.path,
        "resolved configuration"
    );

    let store = SqliteListStore::open(&config.store.path, config.store.runtime_settings())?;
    let reader = FeedReader::new(Arc::new(store));

    match cli.command {
        Command::Migrate => {
            tracing::info!(store = %config.store.path, "feed store is up to date");
        }
        Command::Feed { key, offset, limit } => {
            let feed: FeedKey = key.parse()?;
            for activity in reader.read(&feed, offset, limit)? {
                println!("{}", serde_json::to_string(&activity)?);
            }
        }
        Command::Len { key } => {
            let feed: FeedKey = key.parse()?;
            println!("{}", reader.len(&feed)?);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("timeline: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn feed_command_parses_paging_flags() {
        let cli = Cli::try_parse_from([
            "timeline",
            "--config",
            "custom.toml",
            "feed",
            "user:id:1:activity",
            "--limit",
            "5",
        ])
        .expect("should parse");

        assert_eq!(cli.config, "custom.toml");
        match cli.command {
            Command::Feed { key, offset, limit } => {
                assert_eq!(key, "user:id:1:activity");
                assert_eq!(offset, 0);
                assert_eq!(limit, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_reports_unknown_feed_keys() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let db = dir.path().join("feeds.db");
        let config = dir.path().join("timeline.toml");
        std::fs::write(
            &config,
            format!("[store]\npath = {:?}\n", db.to_str().expect("utf-8 path")),
        )
        .expect("should write config");

        let cli = Cli {
            config: config.to_str().expect("utf-8 path").to_string(),
            command: Command::Len {
                key: "user:id:1:posts".to_string(),
            },
        };

        assert!(matches!(run(cli), Err(CliError::FeedKey(_))));
        assert!(db.exists(), "store should have been created");
    }
}
