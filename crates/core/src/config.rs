use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use crate::schedule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub fetch: FetchConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub max_requests_per_day: i64,
    pub utilization_factor: f64,
}

impl SchedulerConfig {
    /// Polling interval derived from the daily request budget.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the budget or utilization is not positive.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        schedule::refresh_interval(self.max_requests_per_day, self.utilization_factor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the stats API. `None` selects the built-in stub source.
    pub api_base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub base_delay_secs: u64,
}

impl FetchConfig {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.base_delay_secs))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                name: "cpa_sync".to_string(),
                max_connections: 5,
            },
            scheduler: SchedulerConfig {
                max_requests_per_day: schedule::DEFAULT_MAX_REQUESTS_PER_DAY,
                utilization_factor: schedule::DEFAULT_UTILIZATION_FACTOR,
            },
            fetch: FetchConfig {
                api_base_url: None,
                timeout_secs: 30,
                max_attempts: 10,
                base_delay_secs: 2,
            },
        }
    }
}
