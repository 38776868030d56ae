//! Scheduler layer for the dashboard
//!
//! Owns the recurring fetch of the job index and its cancellation.

pub mod poller;

pub use poller::{JobPoller, PollerHandle};
