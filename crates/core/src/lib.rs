pub mod config;
pub mod config_loader;
pub mod error;
pub mod retry;
pub mod schedule;

pub use config::{AppConfig, DatabaseConfig, FetchConfig, SchedulerConfig};
pub use config_loader::ConfigLoader;
pub use error::{ConfigError, FetchError, ParseError};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use schedule::{interval_minutes, refresh_interval};
