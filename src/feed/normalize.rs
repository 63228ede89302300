//! Per-feature normalization of raw GeoJSON into [`Quake`] records.
//!
//! Each feature normalizes independently to `Result<Quake, DropReason>`;
//! a malformed feature drops that one record and never fails the batch.

use serde::Deserialize;

use crate::domain::Quake;

/// Why a raw feed feature was dropped during normalization.
///
/// Drops are contained here: the pipeline only ever sees the surviving
/// [`Quake`] records, plus a drop count for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The feature had no `id`.
    MissingId,
    /// `properties.time` was absent or null.
    MissingTimestamp,
    /// `geometry.coordinates` lacked longitude, latitude, or depth.
    MissingCoordinates,
    /// The feature failed type coercion into the expected shape.
    Malformed,
}

impl DropReason {
    /// Returns the reason as a static string slice, for log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::MissingTimestamp => "missing_timestamp",
            Self::MissingCoordinates => "missing_coordinates",
            Self::Malformed => "malformed",
        }
    }
}

/// Raw feature collection body as served by the upstream feed.
#[derive(Debug, Deserialize)]
pub struct RawFeedBody {
    /// Raw features, kept as JSON values so one bad feature cannot fail
    /// the whole batch decode.
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    properties: Option<RawProperties>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    place: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGeometry {
    #[serde(default)]
    coordinates: Option<Vec<Option<f64>>>,
}

/// Normalizes one raw feature into a [`Quake`].
///
/// A feature missing its id, timestamp, or any of longitude/latitude/depth
/// is dropped with the corresponding reason; missing magnitude defaults to
/// `0.0` instead of dropping; a feature that fails type coercion drops as
/// [`DropReason::Malformed`].
///
/// # Errors
///
/// Returns the [`DropReason`] for this record. Drops are per-record,
/// non-fatal outcomes, not pipeline errors.
pub fn normalize_feature(value: serde_json::Value) -> Result<Quake, DropReason> {
    let raw: RawFeature = serde_json::from_value(value).map_err(|_| DropReason::Malformed)?;

    let id = raw.id.ok_or(DropReason::MissingId)?;
    let props = raw.properties.unwrap_or_default();
    let coords = raw
        .geometry
        .unwrap_or_default()
        .coordinates
        .unwrap_or_default();

    let time_ms = props.time.ok_or(DropReason::MissingTimestamp)?;
    let lon = coords.first().copied().flatten();
    let lat = coords.get(1).copied().flatten();
    let depth_km = coords.get(2).copied().flatten();
    let (Some(lon), Some(lat), Some(depth_km)) = (lon, lat, depth_km) else {
        return Err(DropReason::MissingCoordinates);
    };

    Ok(Quake {
        id,
        time_ms,
        mag: props.mag.unwrap_or(0.0),
        place: props.place.unwrap_or_default(),
        lon,
        lat,
        depth_km,
    })
}
