//! Dashboard HTTP server
//!
//! Serves the job table the poller keeps mounted in memory.

pub mod health;
pub mod page;

use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::mount::MemoryMount;
use crate::render::Renderer;

/// Shared state for the dashboard handlers
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub mount: MemoryMount,
    pub renderer: Renderer,
    pub refresh: Duration,
}

/// Create the dashboard router
pub fn create_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(page::index_page))
        .route("/fragment", get(page::jobs_fragment))
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
