//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

/// Form body for `POST /ingest`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct IngestForm {
    /// Feed key from the static table, or a literal URL. Defaults to
    /// `all_hour`.
    #[serde(default = "default_feed")]
    pub feed: String,
}

fn default_feed() -> String {
    "all_hour".to_string()
}

/// `limit` query parameter for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct LimitParams {
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// `days` query parameter for the daily report.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct DaysParams {
    /// Number of calendar days to include.
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    7
}

/// `n` query parameter for the event tail endpoint.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct TailParams {
    /// Number of trailing notifications to return.
    #[serde(default = "default_tail")]
    pub n: usize,
}

fn default_tail() -> usize {
    50
}
