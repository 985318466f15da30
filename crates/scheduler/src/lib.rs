//! Periodic refresh of merged campaign stats.
//!
//! [`RefreshOrchestrator`] runs a single fetch, merge and upsert cycle.
//! [`RefreshScheduler`] repeats that cycle on a fixed interval until told to stop.

pub mod refresh;
pub mod scheduler;

pub use refresh::{RefreshError, RefreshOrchestrator, RefreshOutcome};
pub use scheduler::RefreshScheduler;
