//! Job sources
//!
//! Where the poller gets its job list from. Production code reads the
//! daemon's `/index` endpoint; tests plug in scripted sources.

use async_trait::async_trait;
use mistry_client::DaemonClient;
use mistry_core::domain::job::JobSummary;

use crate::error::Result;

/// Anything that can produce the current job index
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetches the full job list, in the order the source reports it
    ///
    /// `None` means the source has no index at all yet, which is shown the
    /// same way as never having loaded data.
    async fn fetch_jobs(&self) -> Result<Option<Vec<JobSummary>>>;
}

#[async_trait]
impl JobSource for DaemonClient {
    async fn fetch_jobs(&self) -> Result<Option<Vec<JobSummary>>> {
        Ok(self.fetch_index().await?)
    }
}
