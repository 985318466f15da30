//! Sources of raw spend and conversion data.
//!
//! Every source implements [`StatsSource`]. The refresh cycle only ever sees
//! that trait, so the stub, the HTTP client and the retry wrapper are
//! interchangeable:
//! - [`StubStatsSource`] returns a canned batch (used until a real API is configured)
//! - [`HttpStatsSource`] pulls both series from a JSON HTTP API
//! - [`RetryingSource`] wraps any source with a bounded retry policy

mod http;
mod retrying;
mod stub;

pub use http::HttpStatsSource;
pub use retrying::RetryingSource;
pub use stub::StubStatsSource;

use async_trait::async_trait;
use cpa_sync_core::FetchError;
use cpa_sync_data::{RawConversionRecord, RawSpendRecord};
use std::sync::Arc;

/// Both raw series returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBatch {
    pub spend: Vec<RawSpendRecord>,
    pub conversions: Vec<RawConversionRecord>,
}

impl FetchedBatch {
    #[must_use]
    pub fn new(spend: Vec<RawSpendRecord>, conversions: Vec<RawConversionRecord>) -> Self {
        Self { spend, conversions }
    }

    /// Returns true if neither series has any records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spend.is_empty() && self.conversions.is_empty()
    }
}

/// Fetch interface for raw stats.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedBatch, FetchError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: StatsSource + ?Sized> StatsSource for Arc<S> {
    async fn fetch(&self) -> Result<FetchedBatch, FetchError> {
        (**self).fetch().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
