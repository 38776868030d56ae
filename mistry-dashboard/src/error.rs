//! Dashboard error types

use std::path::PathBuf;

use mistry_client::ClientError;
use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors raised while fetching or publishing the job table
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Fetching the job index from the daemon failed
    #[error("Failed to fetch job index: {0}")]
    Fetch(#[from] ClientError),

    /// Writing a rendered page to disk failed
    #[error("Failed to write {path}: {source}")]
    Mount {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to standard output failed
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
