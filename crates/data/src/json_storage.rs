use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::models::{RawConversionRecord, RawSpendRecord};

/// Loads seed records from JSON array files.
pub struct JsonStorage;

impl JsonStorage {
    /// Reads spend records from a JSON array file.
    ///
    /// Format: `[{"date": "YYYY-MM-DD", "campaign_id": "...", "spend": 12.5}, ...]`
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a record is malformed
    pub fn read_spend(path: impl AsRef<Path>) -> Result<Vec<RawSpendRecord>> {
        Self::read_records(path.as_ref())
    }

    /// Reads conversion records from a JSON array file.
    ///
    /// Format: `[{"date": "YYYY-MM-DD", "campaign_id": "...", "conversions": 3}, ...]`
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a record is malformed
    pub fn read_conversions(path: impl AsRef<Path>) -> Result<Vec<RawConversionRecord>> {
        Self::read_records(path.as_ref())
    }

    fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;

        let records: Vec<T> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse records in {}", path.display()))?;

        tracing::debug!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }
}
