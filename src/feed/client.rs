//! HTTP client for upstream earthquake feeds.
//!
//! Named feeds resolve through a static table of USGS GeoJSON summary
//! feeds; any other key passes through as a literal URL, which keeps
//! ad-hoc testing against arbitrary endpoints trivial.

use std::time::Duration;

use crate::domain::Quake;
use crate::error::HubError;

use super::normalize::{RawFeedBody, normalize_feature};

/// Known feed keys and their URLs.
const FEEDS: &[(&str, &str)] = &[
    (
        "all_hour",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson",
    ),
    (
        "all_day",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson",
    ),
    (
        "all_week",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson",
    ),
    (
        "all_month",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson",
    ),
    (
        "2.5_day",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson",
    ),
    (
        "2.5_week",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_week.geojson",
    ),
    (
        "4.5_day",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_day.geojson",
    ),
    (
        "significant_week",
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/significant_week.geojson",
    ),
];

/// Resolves a source key to a feed URL.
///
/// Unknown keys are returned unchanged and treated as literal URLs.
#[must_use]
pub fn resolve_feed(source: &str) -> &str {
    FEEDS
        .iter()
        .find(|(key, _)| *key == source)
        .map_or(source, |(_, url)| url)
}

/// Feed keys known to this build, for the dashboard's feed picker.
#[must_use]
pub fn known_feeds() -> impl Iterator<Item = &'static str> {
    FEEDS.iter().map(|(key, _)| *key)
}

/// Upstream feed client with an explicit request timeout.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    /// Creates a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Internal`] if the underlying HTTP client fails
    /// to build.
    pub fn new(timeout: Duration) -> Result<Self, HubError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { http })
    }

    /// Fetches and normalizes one batch of quakes from `source`.
    ///
    /// Source order is preserved and no deduplication happens here; that
    /// is the store's job. Malformed features are dropped per record,
    /// logged, and counted; they never fail the batch.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::FetchFailed`] on transport failure or a non-2xx
    /// status, and [`HubError::FeedDecode`] when the body is not a
    /// decodable feature collection. Either aborts the ingest cycle.
    pub async fn fetch(&self, source: &str) -> Result<Vec<Quake>, HubError> {
        let url = resolve_feed(source);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| HubError::FetchFailed(format!("GET {url}: {e}")))?
            .error_for_status()
            .map_err(|e| HubError::FetchFailed(format!("GET {url}: {e}")))?;

        let body: RawFeedBody = response
            .json()
            .await
            .map_err(|e| HubError::FeedDecode(format!("GET {url}: {e}")))?;

        let total = body.features.len();
        let mut quakes = Vec::with_capacity(total);
        let mut dropped = 0_usize;
        for feature in body.features {
            match normalize_feature(feature) {
                Ok(quake) => quakes.push(quake),
                Err(reason) => {
                    dropped += 1;
                    metrics::counter!("feed_records_dropped_total").increment(1);
                    tracing::debug!(reason = reason.as_str(), "dropped feed record");
                }
            }
        }

        tracing::info!(source, url, total, kept = quakes.len(), dropped, "fetched feed");
        Ok(quakes)
    }
}
