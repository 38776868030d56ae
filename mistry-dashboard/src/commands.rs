//! Commands module
//!
//! Defines the dashboard subcommands and wires the poller to the right
//! mount target for each of them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use mistry_client::DaemonClient;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::mount::{FileMount, MemoryMount, StdoutMount};
use crate::render::{JobsView, Renderer};
use crate::scheduler::JobPoller;
use crate::server::{self, DashboardState};

/// Top-level dashboard commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the live job table over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "MISTRY_DASHBOARD_BIND", default_value = "0.0.0.0:8090")]
        bind: String,
    },
    /// Keep an HTML file up to date with the job table
    Write {
        /// Page to (re)write after every fetch
        #[arg(long)]
        out: PathBuf,
    },
    /// Fetch the job index once and print the table
    Once,
}

/// Handle a dashboard command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let renderer = renderer_for(&command, config);

    match command {
        Commands::Serve { bind } => serve(config, client, renderer, &bind).await,
        Commands::Write { out } => write(config, client, renderer, out).await,
        Commands::Once => once(config, client, renderer).await,
    }
}

/// `once` output is read next to the daemon, so its links stay as configured;
/// served and written pages link back to the daemon by default.
fn renderer_for(command: &Commands, config: &Config) -> Renderer {
    match command {
        Commands::Serve { .. } | Commands::Write { .. } => {
            Renderer::new(config.served_link_base())
        }
        Commands::Once => Renderer::new(config.link_base.clone()),
    }
}

fn build_client(config: &Config) -> Result<DaemonClient> {
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(DaemonClient::with_client(
        config.daemon_url.clone(),
        http_client,
    ))
}

async fn serve(config: &Config, client: DaemonClient, renderer: Renderer, bind: &str) -> Result<()> {
    let mount = MemoryMount::new();
    let poller = JobPoller::new(
        Arc::new(client),
        Arc::new(mount.clone()),
        renderer.clone(),
        config.poll_interval,
    )
    .start();

    let app = server::create_router(DashboardState {
        mount,
        renderer,
        refresh: config.poll_interval,
    });

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    info!("Listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server failed")?;

    poller.shutdown().await;
    Ok(())
}

async fn write(config: &Config, client: DaemonClient, renderer: Renderer, out: PathBuf) -> Result<()> {
    let mount = FileMount::new(out, renderer.clone(), Some(config.poll_interval));
    info!("Writing job table to {}", mount.path().display());

    let poller = JobPoller::new(
        Arc::new(client),
        Arc::new(mount),
        renderer,
        config.poll_interval,
    )
    .start();

    shutdown_signal().await;
    poller.shutdown().await;
    Ok(())
}

async fn once(config: &Config, client: DaemonClient, renderer: Renderer) -> Result<()> {
    let poller = JobPoller::new(
        Arc::new(client),
        Arc::new(StdoutMount),
        renderer,
        config.poll_interval,
    );

    let mut view = JobsView::new();
    let count = poller
        .poll_once(&mut view)
        .await
        .with_context(|| format!("Failed to fetch job index from {}", config.daemon_url))?;

    info!("Fetched {} job(s)", count);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistry_core::domain::job::JobSummary;

    #[test]
    fn test_served_pages_link_to_daemon() {
        let config = Config::new("http://mistry:8462".to_string());
        let job = JobSummary::new(1_i64, "p", "t", "running");

        let serve = Commands::Serve {
            bind: "127.0.0.1:0".to_string(),
        };
        assert_eq!(
            renderer_for(&serve, &config).job_link(&job),
            "http://mistry:8462/job/p/1"
        );

        let write = Commands::Write {
            out: PathBuf::from("jobs.html"),
        };
        assert_eq!(
            renderer_for(&write, &config).job_link(&job),
            "http://mistry:8462/job/p/1"
        );

        assert_eq!(renderer_for(&Commands::Once, &config).job_link(&job), "/job/p/1");
    }

    #[test]
    fn test_explicit_link_base_wins() {
        let config = Config::new("http://10.0.0.5:8462".to_string())
            .with_link_base("https://builds.example.com");
        let job = JobSummary::new("abc", "web", "t", "ready");

        let serve = Commands::Serve {
            bind: "127.0.0.1:0".to_string(),
        };
        assert_eq!(
            renderer_for(&serve, &config).job_link(&job),
            "https://builds.example.com/job/web/abc"
        );
        assert_eq!(
            renderer_for(&Commands::Once, &config).job_link(&job),
            "https://builds.example.com/job/web/abc"
        );
    }
}
