//! Error types shared across the sync pipeline.
//!
//! Parsing and configuration errors are fatal to the operation that raised
//! them. Fetch errors carry enough classification for the retry policy to
//! decide whether another attempt is worthwhile.

use chrono::NaiveDate;
use thiserror::Error;

/// A raw record could not be turned into a typed one.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Date string is not an ISO-8601 calendar date (`YYYY-MM-DD`).
    #[error("invalid date {value:?} for campaign {campaign_id:?}, expected YYYY-MM-DD")]
    InvalidDate {
        /// The offending input.
        value: String,
        /// Campaign the record belonged to, empty when parsing a bare date.
        campaign_id: String,
        /// Calendar error, absent when the string is not shaped `YYYY-MM-DD`.
        #[source]
        source: Option<chrono::ParseError>,
    },
}

/// Invalid startup or scheduling parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The daily request budget must be strictly positive.
    #[error("max_requests_per_day must be positive, got {0}")]
    NonPositiveRequestBudget(i64),

    /// Utilization must be a finite value in (0, 1].
    #[error("utilization_factor must be in (0, 1], got {0}")]
    InvalidUtilization(f64),

    /// Budget is so large the polling interval rounds to zero.
    #[error("polling interval of {0} minutes is shorter than 1ms")]
    IntervalTooShort(f64),

    /// Start of a date range lies after its end.
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Configuration sources could not be read or extracted.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(err.to_string())
    }
}

/// Failure while fetching raw stats from a remote source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport level failure (connect, timeout, 5xx, throttling).
    #[error("network error: {0}")]
    Network(String),

    /// Remote rejected the request outright.
    #[error("request rejected: {status} - {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Request could not be built, e.g. a malformed base URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response body did not match the expected record shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Every attempt allowed by the retry policy failed.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Creates a rejection error from status code and message.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Returns true if a later attempt might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
