//! Daily stats repository.
//!
//! Provides schema bootstrap, transactional batch upsert and date-range
//! queries for the `daily_stats` table.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, info};

use super::StatsStore;
use crate::error::PersistenceError;
use crate::models::{DateRange, MergedStat};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS daily_stats (
        date date NOT NULL,
        campaign_id text NOT NULL,
        spend numeric,
        conversions integer,
        cpa numeric,
        PRIMARY KEY (date, campaign_id)
    )
"#;

const UPSERT: &str = r#"
    INSERT INTO daily_stats (date, campaign_id, spend, conversions, cpa)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (date, campaign_id) DO UPDATE
    SET spend = EXCLUDED.spend,
        conversions = EXCLUDED.conversions,
        cpa = EXCLUDED.cpa
"#;

/// Repository for daily stats operations.
#[derive(Debug, Clone)]
pub struct DailyStatsRepository {
    pool: PgPool,
}

impl DailyStatsRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `daily_stats` table if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the DDL statement fails.
    pub async fn init_schema(&self) -> Result<(), PersistenceError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!("Table 'daily_stats' created or already exists");
        Ok(())
    }

    /// Upserts a batch of merged stats in a single transaction.
    ///
    /// Returns the number of rows written. Any failure rolls the whole batch
    /// back, since the uncommitted transaction is dropped on early return.
    ///
    /// # Errors
    /// Returns an error if any statement or the commit fails.
    pub async fn upsert_batch(&self, rows: &[MergedStat]) -> Result<u64, PersistenceError> {
        if rows.is_empty() {
            debug!("Skipping upsert of empty batch");
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for row in rows {
            let result = sqlx::query(UPSERT)
                .bind(row.date)
                .bind(&row.campaign_id)
                .bind(row.spend)
                .bind(row.conversions)
                .bind(row.cpa)
                .execute(&mut *tx)
                .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        debug!(rows = written, "Committed daily_stats batch");
        Ok(written)
    }

    /// Queries stats within a date range, ordered by date then campaign.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_date_range(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MergedStat>, PersistenceError> {
        let records = sqlx::query_as::<_, MergedStat>(
            r#"
            SELECT date, campaign_id,
                   COALESCE(spend, 0) AS spend,
                   COALESCE(conversions, 0) AS conversions,
                   cpa
            FROM daily_stats
            WHERE date >= $1 AND date <= $2
            ORDER BY date ASC, campaign_id ASC
            "#,
        )
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Gets the stats row for one key.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(
        &self,
        date: NaiveDate,
        campaign_id: &str,
    ) -> Result<Option<MergedStat>, PersistenceError> {
        let record = sqlx::query_as::<_, MergedStat>(
            r#"
            SELECT date, campaign_id,
                   COALESCE(spend, 0) AS spend,
                   COALESCE(conversions, 0) AS conversions,
                   cpa
            FROM daily_stats
            WHERE date = $1 AND campaign_id = $2
            "#,
        )
        .bind(date)
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Counts all stored rows.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<i64, PersistenceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM daily_stats")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl StatsStore for DailyStatsRepository {
    async fn init_schema(&self) -> Result<(), PersistenceError> {
        DailyStatsRepository::init_schema(self).await
    }

    async fn upsert_stats(&self, rows: &[MergedStat]) -> Result<u64, PersistenceError> {
        self.upsert_batch(rows).await
    }
}
