//! Dashboard configuration
//!
//! Defines the configurable parameters for the dashboard: where the daemon
//! lives, how often to poll it and how job links are built.

use std::time::Duration;

/// Default daemon address, matching mistryd's default listen port
pub const DEFAULT_DAEMON_URL: &str = "http://localhost:8462";

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Default per-request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Daemon base URL (e.g., "http://localhost:8462")
    pub daemon_url: String,

    /// How often to re-fetch the job index
    pub poll_interval: Duration,

    /// Prefix for job-detail links; empty keeps them relative (`/job/{project}/{id}`)
    pub link_base: String,

    /// Timeout applied to every request to the daemon
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(daemon_url: String) -> Self {
        Self {
            daemon_url,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            link_base: String::new(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Sets the poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the job link prefix; a trailing slash is dropped
    pub fn with_link_base(mut self, link_base: impl Into<String>) -> Self {
        self.link_base = link_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Link prefix for pages served away from the daemon (`serve`, `write`)
    ///
    /// Falls back to the daemon URL so `/job/...` links reach the daemon
    /// rather than the dashboard host.
    pub fn served_link_base(&self) -> String {
        if self.link_base.is_empty() {
            self.daemon_url.trim_end_matches('/').to_string()
        } else {
            self.link_base.clone()
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.daemon_url.is_empty() {
            anyhow::bail!("daemon_url cannot be empty");
        }

        if !self.daemon_url.starts_with("http://") && !self.daemon_url.starts_with("https://") {
            anyhow::bail!("daemon_url must start with http:// or https://");
        }

        // Becomes the served link base when none is given
        if self.daemon_url.contains(['"', '<', '>']) {
            anyhow::bail!("daemon_url cannot contain quotes or angle brackets");
        }

        if !self.link_base.is_empty() {
            if !self.link_base.starts_with("http://") && !self.link_base.starts_with("https://") {
                anyhow::bail!("link_base must start with http:// or https://");
            }
            // Used verbatim inside href attributes
            if self.link_base.contains(['"', '<', '>']) {
                anyhow::bail!("link_base cannot contain quotes or angle brackets");
            }
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DAEMON_URL.to_string())
    }
}
