//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Job identifier as published by the daemon
///
/// The daemon uses opaque string IDs, but numeric IDs are accepted too and
/// displayed exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{}", n),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId::Text(value.to_string())
    }
}

impl From<i64> for JobId {
    fn from(value: i64) -> Self {
        JobId::Number(value.into())
    }
}

/// One entry of the daemon's job index
///
/// Display-only: `started_at` and `state` are kept verbatim and never parsed.
/// Unknown fields (e.g. `buildInfo`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub project: String,
    pub started_at: String,
    pub state: String,
}

impl JobSummary {
    pub fn new(
        id: impl Into<JobId>,
        project: impl Into<String>,
        started_at: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project: project.into(),
            started_at: started_at.into(),
            state: state.into(),
        }
    }

    /// Path of the job-detail view on the daemon, `/job/{project}/{id}`
    pub fn detail_path(&self) -> String {
        format!("/job/{}/{}", self.project, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_numeric_id() {
        let jobs: Vec<JobSummary> = serde_json::from_str(
            r#"[{"id":1,"project":"p","startedAt":"t","state":"running"}]"#,
        )
        .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id.to_string(), "1");
        assert_eq!(jobs[0].project, "p");
        assert_eq!(jobs[0].started_at, "t");
        assert_eq!(jobs[0].state, "running");
    }

    #[test]
    fn test_decode_daemon_record_ignores_build_info() {
        let json = r#"{
            "id": "9c1f3e",
            "project": "yogurt",
            "startedAt": "2018-03-21T12:00:00Z",
            "buildInfo": {"ExitCode": 0},
            "state": "ready"
        }"#;

        let job: JobSummary = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, JobId::from("9c1f3e"));
        assert_eq!(job.state, "ready");
    }

    #[test]
    fn test_detail_path() {
        let job = JobSummary::new(1_i64, "p", "t", "running");
        assert_eq!(job.detail_path(), "/job/p/1");

        let job = JobSummary::new("abc", "web", "t", "pending");
        assert_eq!(job.detail_path(), "/job/web/abc");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let result: Result<JobSummary, _> = serde_json::from_str(r#"{"id":1,"project":"p"}"#);
        assert!(result.is_err());
    }
}
