//! Job table handlers
//!
//! Serve whatever the poller last mounted.

use axum::{extract::State, response::Html};

use crate::render::JobsView;
use crate::server::DashboardState;

/// GET /
/// Full HTML page, reloading itself at the poll interval
pub async fn index_page(State(state): State<DashboardState>) -> Html<String> {
    let fragment = current_fragment(&state).await;
    Html(state.renderer.render_page(&fragment, Some(state.refresh)))
}

/// GET /fragment
/// Only the job table, for embedding
pub async fn jobs_fragment(State(state): State<DashboardState>) -> Html<String> {
    Html(current_fragment(&state).await)
}

async fn current_fragment(state: &DashboardState) -> String {
    let fragment = state.mount.latest().await;
    if fragment.is_empty() {
        tracing::debug!("Nothing mounted yet, serving placeholder");
        return state.renderer.render(&JobsView::new());
    }
    fragment
}
