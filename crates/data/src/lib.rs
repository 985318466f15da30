//! Data storage and transformation for campaign stats.
//!
//! This crate provides:
//! - Typed spend, conversion and merged stat models
//! - The merge engine deriving cost per acquisition
//! - JSON seed file loading
//! - Database client and repository for `PostgreSQL`

pub mod database;
pub mod error;
pub mod json_storage;
pub mod merge;
pub mod models;
pub mod repositories;

// Re-export commonly used types
pub use database::DatabaseClient;
pub use error::PersistenceError;
pub use json_storage::JsonStorage;
pub use merge::{compute_cpa, merge_raw_stats, merge_stats, parse_records};

// Re-export models
pub use models::{
    parse_date, ConversionRecord, DateRange, MergedStat, RawConversionRecord, RawSpendRecord,
    SpendRecord,
};

// Re-export repositories
pub use repositories::{DailyStatsRepository, StatsStore};
