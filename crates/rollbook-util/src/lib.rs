//! Shared utilities for rollbook
//!
//! This crate provides:
//! - Wall-clock time-of-day and weekday-mask value types
//! - Run-date helpers (month-day parsing keyed to the run year)
//! - A mockable `now()` for testing date-relative reports

mod time;

pub use time::*;
