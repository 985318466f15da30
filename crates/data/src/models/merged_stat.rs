//! Merged daily campaign statistics.
//!
//! One row per (date, campaign_id) with spend, conversions and the derived
//! cost per acquisition. This is the shape persisted in `daily_stats`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::merge::compute_cpa;

/// Spend and conversions for a campaign on a day, with derived CPA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MergedStat {
    pub date: NaiveDate,
    pub campaign_id: String,
    /// Spend, zero when the key only appeared in the conversion series
    pub spend: Decimal,
    /// Conversions, zero when the key only appeared in the spend series
    pub conversions: i32,
    /// `spend / conversions` rounded to 2dp; `None` unless both are positive
    pub cpa: Option<Decimal>,
}

impl MergedStat {
    /// Creates a merged row, deriving CPA from spend and conversions.
    pub fn new(
        date: NaiveDate,
        campaign_id: impl Into<String>,
        spend: Decimal,
        conversions: i32,
    ) -> Self {
        Self {
            date,
            campaign_id: campaign_id.into(),
            spend,
            conversions,
            cpa: compute_cpa(spend, conversions),
        }
    }

    /// Primary key of the row.
    #[must_use]
    pub fn key(&self) -> (NaiveDate, &str) {
        (self.date, &self.campaign_id)
    }
}
