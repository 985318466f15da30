use cpa_sync_core::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::error::PersistenceError;
use crate::repositories::DailyStatsRepository;

/// Owns the connection pool for the lifetime of the process.
///
/// Construct once at startup and call [`DatabaseClient::close`] on shutdown.
pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Creates a new database client connected to the specified `PostgreSQL` database.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| PersistenceError::Connect(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Connects using discrete connection parameters.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(connect_options(config))
            .await
            .map_err(|e| {
                PersistenceError::Connect(format!(
                    "{}@{}:{}/{}: {e}",
                    config.user, config.host, config.port, config.name
                ))
            })?;

        info!(
            "Connected to database {} on {}:{}",
            config.name, config.host, config.port
        );
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Repository for the `daily_stats` table.
    #[must_use]
    pub fn daily_stats(&self) -> DailyStatsRepository {
        DailyStatsRepository::new(self.pool.clone())
    }

    /// Closes every pooled connection, waiting for checked-out ones to return.
    pub async fn close(self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

/// Builds connection options from config. An empty password is left unset.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name);

    if config.password.is_empty() {
        options
    } else {
        options.password(&config.password)
    }
}
