//! Time-series workforce statistics engine.
//!
//! This crate turns monthly shift schedules into per-employee statistics:
//! shift-bucket counts under era-dependent rules, consecutive working-day
//! streaks stitched across month boundaries, per-day-tag aggregates
//! (weekday, weekend, public holiday, pre-holiday) and sample-gated
//! historical comparisons. Results are memoized behind deterministic
//! fingerprints and period fetches are coalesced.

#![warn(missing_docs)]

pub mod cache;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
