//! Mistry Dashboard
//!
//! A live job table for the mistry build daemon.
//!
//! Architecture:
//! - Configuration: command-line flags with environment fallbacks
//! - Source: typed client for the daemon's `/index` endpoint
//! - Scheduler: cancellable recurring fetch that owns the view state
//! - Render/Mount: pure HTML rendering pushed into an injected target
//! - Server: optional HTTP front end for the in-memory mount

mod commands;
mod config;
mod error;
mod mount;
mod render;
mod scheduler;
mod server;
mod source;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Commands, handle_command};
use crate::config::{
    Config, DEFAULT_DAEMON_URL, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS,
};

#[derive(Parser)]
#[command(name = "mistry-dashboard")]
#[command(about = "Live job table for the mistry build daemon", long_about = None)]
struct Cli {
    /// Daemon URL
    #[arg(long, env = "MISTRY_DAEMON_URL", default_value = DEFAULT_DAEMON_URL)]
    daemon_url: String,

    /// Poll interval in milliseconds
    #[arg(long, env = "MISTRY_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    every: u64,

    /// Prefix for job links (e.g. the daemon's public URL)
    #[arg(long, env = "MISTRY_LINK_BASE", default_value = "")]
    link_base: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "MISTRY_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config::new(self.daemon_url.clone())
            .with_poll_interval(Duration::from_millis(self.every))
            .with_link_base(self.link_base.clone())
            .with_request_timeout(Duration::from_millis(self.request_timeout))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `once` can print the table on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mistry_dashboard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    info!(
        "Loaded configuration: daemon_url={}, poll_interval={:?}",
        config.daemon_url, config.poll_interval
    );

    handle_command(cli.command, &config).await
}
