//! Conversion count records.

use chrono::NaiveDate;
use cpa_sync_core::ParseError;
use serde::{Deserialize, Serialize};

use super::calendar::parse_record_date;

/// Conversion record as delivered by the API or a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConversionRecord {
    /// ISO-8601 date string (`YYYY-MM-DD`)
    pub date: String,
    pub campaign_id: String,
    pub conversions: i32,
}

/// Conversions attributed to one campaign on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub date: NaiveDate,
    pub campaign_id: String,
    pub conversions: i32,
}

impl ConversionRecord {
    pub fn new(date: NaiveDate, campaign_id: impl Into<String>, conversions: i32) -> Self {
        Self {
            date,
            campaign_id: campaign_id.into(),
            conversions,
        }
    }
}

impl TryFrom<RawConversionRecord> for ConversionRecord {
    type Error = ParseError;

    fn try_from(raw: RawConversionRecord) -> Result<Self, Self::Error> {
        let date = parse_record_date(&raw.date, &raw.campaign_id)?;
        Ok(Self {
            date,
            campaign_id: raw.campaign_id,
            conversions: raw.conversions,
        })
    }
}

impl TryFrom<&RawConversionRecord> for ConversionRecord {
    type Error = ParseError;

    fn try_from(raw: &RawConversionRecord) -> Result<Self, Self::Error> {
        Self::try_from(raw.clone())
    }
}
