//! Calendar helpers: ISO date parsing and closed date ranges.

use chrono::NaiveDate;
use cpa_sync_core::{ConfigError, ParseError};
use serde::{Deserialize, Serialize};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
/// Returns [`ParseError::InvalidDate`] if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    parse_record_date(value, "")
}

/// Parses a record's date, attaching the campaign to any error.
pub(crate) fn parse_record_date(value: &str, campaign_id: &str) -> Result<NaiveDate, ParseError> {
    let invalid = |source| ParseError::InvalidDate {
        value: value.to_string(),
        campaign_id: campaign_id.to_string(),
        source,
    };

    // chrono accepts unpadded fields, signs and surrounding whitespace
    if !is_iso_date_shape(value) {
        return Err(invalid(None));
    }
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).map_err(|e| invalid(Some(e)))
}

/// Exactly `DDDD-DD-DD` in ASCII digits.
fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Closed interval of calendar dates, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidDateRange`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range containing exactly one day.
    #[must_use]
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Smallest range covering every given date, or `None` if there are none.
    pub fn spanning<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().fold(None, |range, date| match range {
            None => Some(Self::single(date)),
            Some(Self { start, end }) => Some(Self {
                start: start.min(date),
                end: end.max(date),
            }),
        })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns true if `date` falls inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
