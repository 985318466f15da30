//! Data models for campaign stats.
//!
//! Monetary values use `rust_decimal::Decimal`. Raw records mirror the wire
//! format; typed records are produced from them with `TryFrom`, which is
//! where malformed dates are rejected.

pub mod calendar;
pub mod conversion;
pub mod merged_stat;
pub mod spend;

pub use calendar::{parse_date, DateRange};
pub use conversion::{ConversionRecord, RawConversionRecord};
pub use merged_stat::MergedStat;
pub use spend::{RawSpendRecord, SpendRecord};
