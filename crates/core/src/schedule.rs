//! Polling interval derived from a daily request budget.
//!
//! The budget is spread evenly over 24 hours after reserving headroom via the
//! utilization factor: `interval = 60 / ((budget * utilization) / 24)` minutes.

use std::time::Duration;

use crate::error::ConfigError;

/// Requests per day allowed by the upstream API.
pub const DEFAULT_MAX_REQUESTS_PER_DAY: i64 = 100;

/// Share of the daily budget the scheduler is allowed to consume.
pub const DEFAULT_UTILIZATION_FACTOR: f64 = 0.8;

/// Returns the polling interval in minutes.
///
/// # Errors
/// Returns [`ConfigError::NonPositiveRequestBudget`] when the budget is zero or
/// negative, and [`ConfigError::InvalidUtilization`] when the factor is not a
/// finite value in (0, 1].
pub fn interval_minutes(
    max_requests_per_day: i64,
    utilization_factor: f64,
) -> Result<f64, ConfigError> {
    if max_requests_per_day <= 0 {
        return Err(ConfigError::NonPositiveRequestBudget(max_requests_per_day));
    }
    if !utilization_factor.is_finite() || utilization_factor <= 0.0 || utilization_factor > 1.0 {
        return Err(ConfigError::InvalidUtilization(utilization_factor));
    }

    let requests_per_day = max_requests_per_day as f64 * utilization_factor;
    let requests_per_hour = requests_per_day / 24.0;
    Ok(60.0 / requests_per_hour)
}

/// Returns the polling interval as a [`Duration`], rounded to whole milliseconds.
///
/// # Errors
/// Same conditions as [`interval_minutes`], plus
/// [`ConfigError::IntervalTooShort`] when the interval rounds to zero.
pub fn refresh_interval(
    max_requests_per_day: i64,
    utilization_factor: f64,
) -> Result<Duration, ConfigError> {
    let minutes = interval_minutes(max_requests_per_day, utilization_factor)?;
    let millis = (minutes * 60_000.0).round() as u64;
    if millis == 0 {
        return Err(ConfigError::IntervalTooShort(minutes));
    }
    Ok(Duration::from_millis(millis))
}
