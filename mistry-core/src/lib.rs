//! Mistry Core
//!
//! Core types shared by the Mistry dashboard crates.
//!
//! This crate contains:
//! - Domain types: the job summaries published by the mistry daemon's `/index` endpoint

pub mod domain;
