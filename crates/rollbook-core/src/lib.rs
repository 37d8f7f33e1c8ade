//! Session reconciliation engine for rollbook
//!
//! This crate is the heart of rollbook, containing:
//! - Elapsed-time and session-line parsing (with per-line failure reporting)
//! - Meeting-window matching with the 15-minute grace period
//! - Attendance, lab-hour, and roll-call aggregation
//!
//! Everything here is synchronous and batch-oriented: callers collect raw
//! session lines up front, parse them once, and run one or more aggregations
//! over the resulting immutable `Session` records. The only mutable
//! accumulators are explicit values threaded through the calls
//! (`StillActiveRegistry`, the caller's name-resolution cache).

mod attendance;
mod elapsed;
mod hours;
mod rollcall;
mod session;
mod window;

pub use attendance::*;
pub use elapsed::*;
pub use hours::*;
pub use rollcall::*;
pub use session::*;
pub use window::*;
