//! Job table rendering
//!
//! Turns the poller's view state into HTML. Rendering is pure: no I/O, no
//! clocks, so every output is determined by the [`JobsView`] alone.

use std::time::Duration;

use mistry_core::domain::job::JobSummary;
use v_htmlescape::escape;

use crate::error::DashboardError;

/// Id of the element the job table is mounted into
pub const MOUNT_ELEMENT_ID: &str = "js-jobs";

/// What the dashboard currently shows
///
/// `jobs` is `None` until the first successful fetch. A failed fetch never
/// touches `jobs`; it only records a notice that the next success clears.
#[derive(Debug, Clone, Default)]
pub struct JobsView {
    jobs: Option<Vec<JobSummary>>,
    last_error: Option<String>,
}

impl JobsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs from the latest successful fetch, if any
    pub fn jobs(&self) -> Option<&[JobSummary]> {
        self.jobs.as_deref()
    }

    /// Error from the latest fetch, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replaces the held jobs wholesale and clears any error notice
    pub fn replace(&mut self, jobs: Vec<JobSummary>) {
        self.jobs = Some(jobs);
        self.last_error = None;
    }

    /// Forgets the held jobs, back to the placeholder, and clears any error notice
    ///
    /// Used when the daemon reports no job index at all (a `null` body).
    pub fn clear(&mut self) {
        self.jobs = None;
        self.last_error = None;
    }

    /// Records a failed fetch, keeping the last good jobs
    pub fn record_error(&mut self, err: &DashboardError) {
        self.last_error = Some(err.to_string());
    }
}

/// Renders views into HTML fragments and pages
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    link_base: String,
}

impl Renderer {
    /// Creates a renderer whose job links start with `link_base`
    ///
    /// An empty `link_base` produces relative links (`/job/{project}/{id}`).
    pub fn new(link_base: impl Into<String>) -> Self {
        Self {
            link_base: link_base.into(),
        }
    }

    /// Renders the fragment that goes inside the mount element
    pub fn render(&self, view: &JobsView) -> String {
        let mut html = String::new();

        if let Some(err) = view.last_error() {
            html.push_str(&format!(
                "<div class=\"callout alert\">{}</div>\n",
                escape(err)
            ));
        }

        match view.jobs() {
            None => html.push_str("<div class=\"jumbotron\">\n  <h3>No jobs...</h3>\n</div>\n"),
            Some(jobs) => self.render_table(jobs, &mut html),
        }

        html
    }

    fn render_table(&self, jobs: &[JobSummary], html: &mut String) {
        html.push_str("<table class=\"hover unstriped\">\n");
        html.push_str("  <thead>\n");
        html.push_str(
            "    <tr><th>ID</th><th>Project</th><th>Started At</th><th>State</th></tr>\n",
        );
        html.push_str("  </thead>\n");
        html.push_str("  <tbody>\n");
        for job in jobs {
            html.push_str(&format!(
                "    <tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                self.job_link(job),
                escape(&job.id.to_string()),
                escape(&job.project),
                escape(&job.started_at),
                escape(&job.state),
            ));
        }
        html.push_str("  </tbody>\n");
        html.push_str("</table>\n");
    }

    /// Link to the daemon's detail view for `job`, ready for an `href`
    ///
    /// Project and id are escaped segment by segment so the `/` separators
    /// stay literal. `link_base` comes from validated configuration.
    pub fn job_link(&self, job: &JobSummary) -> String {
        format!(
            "{}/job/{}/{}",
            self.link_base,
            escape(&job.project),
            escape(&job.id.to_string())
        )
    }

    /// Wraps a fragment in a standalone HTML document
    ///
    /// With `refresh` set, the page reloads itself at that interval (rounded
    /// up to whole seconds).
    pub fn render_page(&self, fragment: &str, refresh: Option<Duration>) -> String {
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        if let Some(refresh) = refresh {
            let secs = refresh.as_millis().div_ceil(1000).max(1);
            html.push_str(&format!(
                "<meta http-equiv=\"refresh\" content=\"{}\">\n",
                secs
            ));
        }
        html.push_str("<title>mistry jobs</title>\n</head>\n<body>\n");
        html.push_str(&format!("<div id=\"{}\">\n", MOUNT_ELEMENT_ID));
        html.push_str(fragment);
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }
}
