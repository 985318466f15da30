use async_trait::async_trait;
use cpa_sync_core::FetchError;
use cpa_sync_data::{RawConversionRecord, RawSpendRecord};
use rust_decimal::Decimal;

use crate::{FetchedBatch, StatsSource};

/// Source that always returns the same batch.
///
/// Stands in for the remote API until one is configured.
#[derive(Debug, Clone)]
pub struct StubStatsSource {
    batch: FetchedBatch,
}

impl StubStatsSource {
    /// Creates a stub returning the canned sample batch.
    #[must_use]
    pub fn new() -> Self {
        Self::with_batch(sample_batch())
    }

    /// Creates a stub returning `batch` on every fetch.
    #[must_use]
    pub fn with_batch(batch: FetchedBatch) -> Self {
        Self { batch }
    }
}

impl Default for StubStatsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsSource for StubStatsSource {
    async fn fetch(&self) -> Result<FetchedBatch, FetchError> {
        Ok(self.batch.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn sample_batch() -> FetchedBatch {
    let spend = |date: &str, campaign_id: &str, spend: i64| RawSpendRecord {
        date: date.to_string(),
        campaign_id: campaign_id.to_string(),
        spend: Decimal::from(spend),
    };
    let conversions = |date: &str, campaign_id: &str, conversions: i32| RawConversionRecord {
        date: date.to_string(),
        campaign_id: campaign_id.to_string(),
        conversions,
    };

    FetchedBatch::new(
        vec![
            spend("2025-06-01", "TEST", 100),
            spend("2025-01-02", "TEST-2", 30),
        ],
        vec![
            conversions("2025-06-06", "TEST", 7),
            conversions("2025-01-02", "TEST-2", 14),
        ],
    )
}
