use cpa_sync_collector::StatsSource;
use cpa_sync_core::{FetchError, ParseError};
use cpa_sync_data::{merge_stats, parse_records, DateRange, PersistenceError, StatsStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Why a refresh cycle stopped early.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// What a successful refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The source returned no records.
    NoData,
    /// Records arrived but none survived the merge.
    NothingToWrite,
    /// Rows were written in a single batch.
    Upserted { rows: usize },
}

/// Runs one fetch, merge and upsert pass.
pub struct RefreshOrchestrator {
    source: Arc<dyn StatsSource>,
    store: Arc<dyn StatsStore>,
}

impl RefreshOrchestrator {
    #[must_use]
    pub fn new(source: Arc<dyn StatsSource>, store: Arc<dyn StatsStore>) -> Self {
        Self { source, store }
    }

    /// Fetches both series, merges them over the dates they cover and upserts
    /// the result.
    ///
    /// # Errors
    /// Returns an error if the fetch fails after retries, a record carries a
    /// malformed date, or the batch write fails.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let batch = self.source.fetch().await?;
        let (spend, conversions) = parse_records(&batch.spend, &batch.conversions)?;

        let dates = spend
            .iter()
            .map(|r| r.date)
            .chain(conversions.iter().map(|r| r.date));
        let Some(range) = DateRange::spanning(dates) else {
            return Ok(RefreshOutcome::NoData);
        };

        let merged = merge_stats(&spend, &conversions, &range);
        if merged.is_empty() {
            return Ok(RefreshOutcome::NothingToWrite);
        }

        self.store.upsert_stats(&merged).await?;
        Ok(RefreshOutcome::Upserted { rows: merged.len() })
    }

    /// Runs [`refresh`](Self::refresh) and logs the result.
    ///
    /// Errors are logged, never returned.
    pub async fn run_cycle(&self) -> Option<RefreshOutcome> {
        let source = self.source.name();
        match self.refresh().await {
            Ok(RefreshOutcome::NoData) => {
                info!(source, "Refresh cycle fetched no data");
                Some(RefreshOutcome::NoData)
            }
            Ok(RefreshOutcome::NothingToWrite) => {
                info!(source, "Refresh cycle produced no rows to write");
                Some(RefreshOutcome::NothingToWrite)
            }
            Ok(outcome @ RefreshOutcome::Upserted { rows }) => {
                info!(source, rows, "Refresh cycle upserted stats");
                Some(outcome)
            }
            Err(e) => {
                error!(source, error = %e, "Refresh cycle failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use cpa_sync_collector::{FetchedBatch, StubStatsSource};
    use cpa_sync_data::{MergedStat, RawConversionRecord, RawSpendRecord};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Keyed store kept in memory.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<BTreeMap<(NaiveDate, String), MergedStat>>,
        upserts: Mutex<usize>,
    }

    impl MemoryStore {
        fn rows(&self) -> Vec<MergedStat> {
            self.rows.lock().unwrap().values().cloned().collect()
        }

        fn upsert_calls(&self) -> usize {
            *self.upserts.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatsStore for MemoryStore {
        async fn init_schema(&self) -> Result<(), PersistenceError> {
            Ok(())
        }

        async fn upsert_stats(&self, rows: &[MergedStat]) -> Result<u64, PersistenceError> {
            *self.upserts.lock().unwrap() += 1;
            let mut stored = self.rows.lock().unwrap();
            for row in rows {
                stored.insert((row.date, row.campaign_id.clone()), row.clone());
            }
            Ok(rows.len() as u64)
        }
    }

    struct FailingStore;

    #[async_trait]
    impl StatsStore for FailingStore {
        async fn init_schema(&self) -> Result<(), PersistenceError> {
            Ok(())
        }

        async fn upsert_stats(&self, _rows: &[MergedStat]) -> Result<u64, PersistenceError> {
            Err(PersistenceError::Connect("database is down".into()))
        }
    }

    struct DownSource;

    #[async_trait]
    impl StatsSource for DownSource {
        async fn fetch(&self) -> Result<FetchedBatch, FetchError> {
            Err(FetchError::rejected(500, "unavailable"))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn spend(date: &str, campaign_id: &str, spend: Decimal) -> RawSpendRecord {
        RawSpendRecord {
            date: date.to_string(),
            campaign_id: campaign_id.to_string(),
            spend,
        }
    }

    fn conversions(date: &str, campaign_id: &str, conversions: i32) -> RawConversionRecord {
        RawConversionRecord {
            date: date.to_string(),
            campaign_id: campaign_id.to_string(),
            conversions,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn orchestrator(batch: FetchedBatch, store: Arc<MemoryStore>) -> RefreshOrchestrator {
        RefreshOrchestrator::new(Arc::new(StubStatsSource::with_batch(batch)), store)
    }

    #[tokio::test]
    async fn test_refresh_upserts_merged_rows() {
        let store = Arc::new(MemoryStore::default());
        let batch = FetchedBatch::new(
            vec![
                spend("2025-06-04", "CAMP-123", dec!(37.50)),
                spend("2025-06-06", "CAMP-999", dec!(5.25)),
            ],
            vec![
                conversions("2025-06-04", "CAMP-123", 14),
                conversions("2025-06-06", "CAMP-888", 7),
            ],
        );

        let outcome = orchestrator(batch, store.clone()).refresh().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Upserted { rows: 3 });

        let rows = store.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key(), (date(4), "CAMP-123"));
        assert_eq!(rows[0].cpa, Some(dec!(2.68)));
        assert_eq!(rows[1].key(), (date(6), "CAMP-888"));
        assert_eq!(rows[1].spend, Decimal::ZERO);
        assert_eq!(rows[1].cpa, None);
        assert_eq!(rows[2].key(), (date(6), "CAMP-999"));
        assert_eq!(rows[2].conversions, 0);
    }

    #[tokio::test]
    async fn test_repeated_refresh_is_idempotent() {
        let store = Arc::new(MemoryStore::default());
        let batch = FetchedBatch::new(
            vec![spend("2025-06-05", "CAMP-123", dec!(50.50))],
            vec![conversions("2025-06-05", "CAMP-123", 12)],
        );
        let orchestrator = orchestrator(batch, store.clone());

        orchestrator.refresh().await.unwrap();
        let first = store.rows();
        orchestrator.refresh().await.unwrap();

        assert_eq!(store.rows(), first);
        assert_eq!(first[0].cpa, Some(dec!(4.21)));
        assert_eq!(store.upsert_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_fetch_skips_write() {
        let store = Arc::new(MemoryStore::default());
        let outcome = orchestrator(FetchedBatch::default(), store.clone())
            .refresh()
            .await
            .unwrap();

        assert_eq!(outcome, RefreshOutcome::NoData);
        assert_eq!(store.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_date_aborts_cycle() {
        let store = Arc::new(MemoryStore::default());
        let batch = FetchedBatch::new(
            vec![
                spend("2025-06-04", "CAMP-123", dec!(37.50)),
                spend("06/05/2025", "CAMP-456", dec!(10)),
            ],
            Vec::new(),
        );

        let err = orchestrator(batch, store.clone()).refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Parse(_)));
        assert_eq!(store.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_reported() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = RefreshOrchestrator::new(Arc::new(DownSource), store.clone());

        let err = orchestrator.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Fetch(FetchError::Rejected { .. })));
        assert_eq!(store.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_run_cycle_swallows_store_failure() {
        let orchestrator = RefreshOrchestrator::new(
            Arc::new(StubStatsSource::new()),
            Arc::new(FailingStore),
        );

        assert!(matches!(
            orchestrator.refresh().await,
            Err(RefreshError::Persistence(_))
        ));
        assert_eq!(orchestrator.run_cycle().await, None);
    }

    #[tokio::test]
    async fn test_run_cycle_reports_outcome() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = RefreshOrchestrator::new(Arc::new(StubStatsSource::new()), store.clone());

        // Sample batch spans 2025-01-02..2025-06-06 with three distinct keys
        assert_eq!(
            orchestrator.run_cycle().await,
            Some(RefreshOutcome::Upserted { rows: 3 })
        );
        assert_eq!(store.rows().len(), 3);
    }
}
