//! Advertising spend records.

use chrono::NaiveDate;
use cpa_sync_core::ParseError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::parse_record_date;

/// Spend record as delivered by the API or a seed file.
///
/// Every field is required; a record missing one fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpendRecord {
    /// ISO-8601 date string (`YYYY-MM-DD`)
    pub date: String,
    pub campaign_id: String,
    pub spend: Decimal,
}

/// Spend for one campaign on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub date: NaiveDate,
    pub campaign_id: String,
    /// Amount spent. Not validated; negative values pass through.
    pub spend: Decimal,
}

impl SpendRecord {
    pub fn new(date: NaiveDate, campaign_id: impl Into<String>, spend: Decimal) -> Self {
        Self {
            date,
            campaign_id: campaign_id.into(),
            spend,
        }
    }
}

impl TryFrom<RawSpendRecord> for SpendRecord {
    type Error = ParseError;

    fn try_from(raw: RawSpendRecord) -> Result<Self, Self::Error> {
        let date = parse_record_date(&raw.date, &raw.campaign_id)?;
        Ok(Self {
            date,
            campaign_id: raw.campaign_id,
            spend: raw.spend,
        })
    }
}

impl TryFrom<&RawSpendRecord> for SpendRecord {
    type Error = ParseError;

    fn try_from(raw: &RawSpendRecord) -> Result<Self, Self::Error> {
        Self::try_from(raw.clone())
    }
}
