//! CLI commands for cpa-sync.

pub mod sync;

pub use sync::{run_sync, SyncArgs};
