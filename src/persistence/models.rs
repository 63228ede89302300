//! Typed rows returned by the store's reporting queries.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An alert joined with its quake and rule snapshot columns, as returned
/// by [`crate::persistence::Store::list_alerts`].
///
/// The rule columns reflect the rule as it exists now; alerts whose rule
/// has since been deleted drop out of this view while the underlying alert
/// row remains.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlertView {
    /// Alert row id.
    pub id: i64,
    /// When the alert was recorded, epoch milliseconds.
    pub created_ms: i64,
    /// The matched quake's id.
    pub quake_id: String,
    /// The matching rule's id.
    pub rule_id: i64,
    /// Quake origin time, epoch milliseconds.
    pub time_ms: i64,
    /// Quake magnitude.
    pub mag: f64,
    /// Quake location description.
    pub place: String,
    /// Quake epicenter longitude.
    pub lon: f64,
    /// Quake epicenter latitude.
    pub lat: f64,
    /// Quake depth in kilometers.
    pub depth_km: f64,
    /// Rule name.
    pub rule_name: String,
    /// Rule magnitude threshold.
    pub min_mag: f64,
    /// Rule bounding box in text form, if any.
    pub bbox: Option<String>,
}

/// One calendar day of quake activity, as returned by
/// [`crate::persistence::Store::daily_report`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyBucket {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub day: String,
    /// Number of quakes recorded that day.
    pub count: i64,
    /// Mean magnitude, rounded to 2 decimals.
    pub avg_mag: f64,
    /// Maximum magnitude, rounded to 2 decimals.
    pub max_mag: f64,
}
