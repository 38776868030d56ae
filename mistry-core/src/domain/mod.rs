//! Core domain types
//!
//! These types mirror the records the mistry daemon publishes. They are shared
//! between the HTTP client (decodes them) and the dashboard (renders them).

pub mod job;
