//! Job index endpoint

use crate::DaemonClient;
use crate::error::Result;
use mistry_core::domain::job::JobSummary;
use tracing::debug;

impl DaemonClient {
    /// List the jobs the daemon knows about
    ///
    /// Issues `GET /index`. The daemon returns pending and ready jobs, newest
    /// first; the order is preserved as received. A daemon that has never
    /// seen a job answers `null`, which comes back as `None`.
    pub async fn fetch_index(&self) -> Result<Option<Vec<JobSummary>>> {
        let url = format!("{}/index", self.base_url);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
