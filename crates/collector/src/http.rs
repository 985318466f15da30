//! HTTP stats source.
//!
//! Pulls both series from a JSON API exposing `GET {base}/spend` and
//! `GET {base}/conversions`, each returning an array of raw records.

use async_trait::async_trait;
use cpa_sync_core::FetchError;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{FetchedBatch, StatsSource};

const SPEND_PATH: &str = "spend";
const CONVERSIONS_PATH: &str = "conversions";

/// Stats source backed by a JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStatsSource {
    client: Client,
    base_url: String,
}

impl HttpStatsSource {
    /// Creates a source for `base_url` with a per-request timeout.
    ///
    /// # Errors
    /// Returns [`FetchError::InvalidRequest`] if `base_url` is not an absolute
    /// http(s) URL, or an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| FetchError::InvalidRequest(format!("base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidRequest(format!(
                "base URL {base_url:?} must use http or https"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_records<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, FetchError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    FetchError::InvalidRequest(format!("GET {url}: {e}"))
                } else {
                    FetchError::Network(format!("GET {url}: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, error_text));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| FetchError::Decode(format!("GET {url}: {e}")))
    }
}

/// Server errors and throttling are worth retrying; other failures are not.
fn classify_status(status: StatusCode, message: String) -> FetchError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        FetchError::Network(format!("HTTP {status}: {message}"))
    } else {
        FetchError::rejected(status.as_u16(), message)
    }
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    async fn fetch(&self) -> Result<FetchedBatch, FetchError> {
        let spend = self.get_records(SPEND_PATH).await?;
        let conversions = self.get_records(CONVERSIONS_PATH).await?;

        tracing::debug!(
            spend = spend.len(),
            conversions = conversions.len(),
            "Fetched stats from {}",
            self.base_url
        );
        Ok(FetchedBatch::new(spend, conversions))
    }

    fn name(&self) -> &str {
        "http"
    }
}
