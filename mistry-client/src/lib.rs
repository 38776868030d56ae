//! Mistry HTTP Client
//!
//! A small, type-safe HTTP client for the read-only parts of the mistry daemon API.
//!
//! # Example
//!
//! ```no_run
//! use mistry_client::DaemonClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DaemonClient::new("http://localhost:8462");
//!
//!     for job in client.fetch_index().await?.unwrap_or_default() {
//!         println!("{} {} {}", job.project, job.id, job.state);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use mistry_core::domain::job::{JobId, JobSummary};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the mistry daemon
#[derive(Debug, Clone)]
pub struct DaemonClient {
    /// Base URL of the daemon (e.g., "http://localhost:8462")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl DaemonClient {
    /// Create a new daemon client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the daemon (e.g., "http://localhost:8462")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new daemon client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use mistry_client::DaemonClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = DaemonClient::with_client("http://localhost:8462", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the daemon
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
