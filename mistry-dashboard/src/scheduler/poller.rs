//! Job poller
//!
//! Fetches the job index once on start and then on every tick, keeps the
//! latest list in a [`JobsView`] and mounts a freshly rendered table after
//! each fetch. The view is owned by the polling task, so ticks, fetch
//! completions and renders never overlap.

use std::sync::Arc;

use mistry_core::domain::job::JobSummary;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::mount::MountTarget;
use crate::render::{JobsView, Renderer};
use crate::source::JobSource;

/// Polls a job source and keeps a mount target up to date
pub struct JobPoller {
    source: Arc<dyn JobSource>,
    mount: Arc<dyn MountTarget>,
    renderer: Renderer,
    every: Duration,
}

impl JobPoller {
    /// Creates a poller with no data loaded
    pub fn new(
        source: Arc<dyn JobSource>,
        mount: Arc<dyn MountTarget>,
        renderer: Renderer,
        every: Duration,
    ) -> Self {
        Self {
            source,
            mount,
            renderer,
            every,
        }
    }

    /// Spawns the polling loop
    ///
    /// The placeholder is mounted right away, the first fetch happens
    /// immediately and later fetches every `every`. The loop runs until the
    /// returned handle is stopped or dropped.
    pub fn start(self) -> PollerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(token.clone()));

        PollerHandle {
            token,
            task: Some(task),
        }
    }

    async fn run(self, token: CancellationToken) {
        info!("Starting job poller (interval: {:?})", self.every);

        let mut view = JobsView::new();
        self.publish(&view).await;

        let mut ticker = time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            debug!("Polling job index");

            // A fetch still in flight at stop time is dropped, not applied.
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                outcome = self.source.fetch_jobs() => outcome,
            };

            // Failures are logged and flagged in the view by `apply`
            if let Ok(count) = self.apply(&mut view, outcome).await {
                debug!("Poll cycle done, {} job(s) shown", count);
            }
        }

        info!("Job poller stopped");
    }

    /// Performs a single fetch and mounts the result
    ///
    /// Returns the number of jobs fetched (0 for a missing index). On failure
    /// the view keeps its previous jobs and shows an error notice.
    pub async fn poll_once(&self, view: &mut JobsView) -> Result<usize> {
        let outcome = self.source.fetch_jobs().await;
        self.apply(view, outcome).await
    }

    async fn apply(
        &self,
        view: &mut JobsView,
        outcome: Result<Option<Vec<JobSummary>>>,
    ) -> Result<usize> {
        let result = match outcome {
            Ok(None) => {
                if view.jobs().is_some() {
                    info!("Job index is gone, showing placeholder");
                }
                view.clear();
                Ok(0)
            }
            Ok(Some(jobs)) => {
                let count = jobs.len();
                if view.jobs().map(<[JobSummary]>::len) != Some(count) {
                    info!("Job index now lists {} job(s)", count);
                }
                view.replace(jobs);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to refresh job index, keeping previous data: {:#}", e);
                view.record_error(&e);
                Err(e)
            }
        };

        self.publish(view).await;
        result
    }

    async fn publish(&self, view: &JobsView) {
        let fragment = self.renderer.render(view);
        if let Err(e) = self.mount.mount(&fragment).await {
            error!("Failed to mount job table: {:#}", e);
        }
    }
}

/// Owns a running poller
///
/// Dropping the handle stops the poller.
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Cancels the recurring fetch; calling it again is a no-op
    pub fn stop(&self) {
        if !self.is_stopped() {
            debug!("Stopping job poller");
            self.token.cancel();
        }
    }

    /// Whether `stop` was called or the handle is shutting down
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stops the poller and waits for its task to finish
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Job poller task panicked: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::mount::MemoryMount;
    use async_trait::async_trait;
    use mistry_client::ClientError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const EVERY: Duration = Duration::from_millis(3000);

    /// One canned answer from the daemon
    #[derive(Clone)]
    enum Reply {
        Jobs(Vec<JobSummary>),
        /// `null` body
        NoIndex,
        Fail,
    }

    /// Replays canned replies; once the script runs out, the last one repeats.
    struct ScriptedSource {
        calls: AtomicUsize,
        script: Mutex<VecDeque<Reply>>,
        first_delay: Option<Duration>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
                first_delay: None,
            })
        }

        /// The first fetch takes `delay`, later ones answer at once.
        fn slow_first(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(VecDeque::from([Reply::Jobs(vec![job(1, "p")])])),
                first_delay: Some(delay),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobSource for ScriptedSource {
        async fn fetch_jobs(&self) -> Result<Option<Vec<JobSummary>>> {
            let previous = self.calls.fetch_add(1, Ordering::SeqCst);
            if let (0, Some(delay)) = (previous, self.first_delay) {
                time::sleep(delay).await;
            }

            let next = {
                let mut script = self.script.lock().unwrap();
                if script.len() > 1 {
                    script.pop_front()
                } else {
                    script.front().cloned()
                }
            };

            match next {
                Some(Reply::Jobs(jobs)) => Ok(Some(jobs)),
                Some(Reply::NoIndex) | None => Ok(None),
                Some(Reply::Fail) => Err(DashboardError::Fetch(ClientError::api_error(
                    502,
                    "bad gateway",
                ))),
            }
        }
    }

    fn job(id: i64, project: &str) -> JobSummary {
        JobSummary::new(id, project, "2018-03-21T12:00:00Z", "running")
    }

    fn start(source: Arc<ScriptedSource>, mount: &MemoryMount) -> PollerHandle {
        JobPoller::new(source, Arc::new(mount.clone()), Renderer::default(), EVERY).start()
    }

    /// Lets the poller task run until it blocks again.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let source = ScriptedSource::new(vec![Reply::Jobs(vec![job(1, "p")])]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        assert_eq!(source.calls(), 1);

        time::advance(EVERY - Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(source.calls(), 1);

        time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(source.calls(), 2);

        time::advance(EVERY).await;
        settle().await;
        assert_eq!(source.calls(), 3);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_is_followed_by_one_catch_up() {
        // Ticks at 3s and 6s are missed while the first fetch runs until 7s.
        let source = ScriptedSource::slow_first(Duration::from_millis(7000));
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        assert_eq!(source.calls(), 1);

        time::advance(Duration::from_millis(7000)).await;
        settle().await;
        assert_eq!(source.calls(), 2);

        // The schedule restarts from the catch-up instead of replaying 6s.
        time::advance(EVERY - Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(source.calls(), 2);

        time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(source.calls(), 3);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_render_is_placeholder_then_table() {
        let source = ScriptedSource::new(vec![Reply::Jobs(vec![job(1, "p")])]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;

        // Placeholder on start, table after the first fetch.
        assert_eq!(mount.renders().await, 2);
        let html = mount.latest().await;
        assert!(html.contains("<a href=\"/job/p/1\">1</a>"));
        assert!(!html.contains("No jobs..."));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_fetch_replaces_first() {
        let source = ScriptedSource::new(vec![
            Reply::Jobs(vec![job(1, "alpha"), job(2, "alpha")]),
            Reply::Jobs(vec![job(3, "beta")]),
        ]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        let html = mount.latest().await;
        assert!(html.contains("/job/alpha/1"));
        assert!(html.contains("/job/alpha/2"));

        time::advance(EVERY).await;
        settle().await;
        let html = mount.latest().await;
        assert!(html.contains("/job/beta/3"));
        assert!(!html.contains("alpha"));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_previous_rows() {
        let source = ScriptedSource::new(vec![
            Reply::Jobs(vec![job(1, "p")]),
            Reply::Fail,
            Reply::Jobs(vec![job(2, "p")]),
        ]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        time::advance(EVERY).await;
        settle().await;

        let html = mount.latest().await;
        assert!(html.contains("/job/p/1"));
        assert!(html.contains("callout alert"));

        time::advance(EVERY).await;
        settle().await;

        let html = mount.latest().await;
        assert!(html.contains("/job/p/2"));
        assert!(!html.contains("callout alert"));
        assert_eq!(source.calls(), 3);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_before_any_data_keeps_placeholder() {
        let source = ScriptedSource::new(vec![Reply::Fail]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;

        let html = mount.latest().await;
        assert!(html.contains("No jobs..."));
        assert!(html.contains("callout alert"));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_index_shows_placeholder_without_notice() {
        let source = ScriptedSource::new(vec![Reply::NoIndex]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        time::advance(EVERY).await;
        settle().await;

        assert_eq!(source.calls(), 2);
        let html = mount.latest().await;
        assert!(html.contains("No jobs..."));
        assert!(!html.contains("callout alert"));
        assert!(!html.contains("<table"));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_index_after_data_returns_to_placeholder() {
        let source = ScriptedSource::new(vec![Reply::Jobs(vec![job(1, "p")]), Reply::NoIndex]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        assert!(mount.latest().await.contains("/job/p/1"));

        time::advance(EVERY).await;
        settle().await;

        let html = mount.latest().await;
        assert!(html.contains("No jobs..."));
        assert!(!html.contains("/job/p/1"));
        assert!(!html.contains("callout alert"));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_fetches() {
        let source = ScriptedSource::new(vec![Reply::Jobs(vec![job(1, "p")])]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        assert_eq!(source.calls(), 1);

        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());

        time::advance(EVERY * 5).await;
        settle().await;
        assert_eq!(source.calls(), 1);

        handle.shutdown().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_poller() {
        let source = ScriptedSource::new(vec![Reply::Jobs(vec![job(1, "p")])]);
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        drop(handle);

        time::advance(EVERY * 3).await;
        settle().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_abandons_in_flight_fetch() {
        let source = ScriptedSource::slow_first(Duration::from_secs(10));
        let mount = MemoryMount::new();
        let handle = start(source.clone(), &mount);

        settle().await;
        assert_eq!(source.calls(), 1);
        assert_eq!(mount.renders().await, 1);

        handle.shutdown().await;

        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(mount.renders().await, 1);
        assert!(mount.latest().await.contains("No jobs..."));
    }

    #[tokio::test]
    async fn test_poll_once_reports_failure() {
        let source = ScriptedSource::new(vec![Reply::Fail]);
        let mount = MemoryMount::new();
        let poller = JobPoller::new(source, Arc::new(mount.clone()), Renderer::default(), EVERY);

        let mut view = JobsView::new();
        let err = poller.poll_once(&mut view).await.unwrap_err();

        assert!(matches!(err, DashboardError::Fetch(_)));
        assert!(view.last_error().is_some());
        assert!(mount.latest().await.contains("callout alert"));
    }

    #[tokio::test]
    async fn test_poll_once_counts_jobs() {
        let source = ScriptedSource::new(vec![Reply::Jobs(vec![job(1, "p"), job(2, "q")])]);
        let mount = MemoryMount::new();
        let poller = JobPoller::new(source, Arc::new(mount.clone()), Renderer::default(), EVERY);

        let mut view = JobsView::new();
        assert_eq!(poller.poll_once(&mut view).await.unwrap(), 2);
        assert_eq!(view.jobs().map(<[JobSummary]>::len), Some(2));
    }

    #[tokio::test]
    async fn test_poll_once_missing_index_counts_zero() {
        let source = ScriptedSource::new(vec![Reply::NoIndex]);
        let mount = MemoryMount::new();
        let poller = JobPoller::new(source, Arc::new(mount.clone()), Renderer::default(), EVERY);

        let mut view = JobsView::new();
        assert_eq!(poller.poll_once(&mut view).await.unwrap(), 0);
        assert!(view.jobs().is_none());
        assert!(view.last_error().is_none());
    }
}
