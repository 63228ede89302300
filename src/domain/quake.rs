//! Normalized earthquake record.

use serde::{Deserialize, Serialize};

/// A normalized earthquake record from an upstream feed.
///
/// Immutable once stored: the upstream-assigned `id` is the primary key and
/// the first write wins, so re-ingesting an existing id is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quake {
    /// Globally unique identifier assigned by the upstream source.
    pub id: String,
    /// Origin time in epoch milliseconds.
    pub time_ms: i64,
    /// Magnitude. Never negative; 0.0 when the source omitted it.
    pub mag: f64,
    /// Free-text location description (e.g. `"10km W of Test, CA"`).
    pub place: String,
    /// Epicenter longitude in degrees.
    pub lon: f64,
    /// Epicenter latitude in degrees.
    pub lat: f64,
    /// Hypocenter depth in kilometers.
    pub depth_km: f64,
}
