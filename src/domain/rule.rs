//! Alerting rules and the pure rule matcher.
//!
//! A [`Rule`] filters quakes by a magnitude threshold and an optional
//! [`BoundingBox`]. Matching is a pure function with no I/O; recording the
//! resulting alerts (and their exactly-once guarantee) is the store's job.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Quake;
use crate::error::HubError;

/// Axis-aligned longitude/latitude rectangle used for geographic filtering.
///
/// Always held in normalized form (`lon_min <= lon_max`,
/// `lat_min <= lat_max`); the text form `"lon1,lat1,lon2,lat2"` is
/// normalized at parse time, so a box entered with swapped corners behaves
/// identically to its normalized equivalent. Containment is inclusive on
/// all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoundingBox {
    /// Western edge (smaller longitude).
    pub lon_min: f64,
    /// Southern edge (smaller latitude).
    pub lat_min: f64,
    /// Eastern edge (larger longitude).
    pub lon_max: f64,
    /// Northern edge (larger latitude).
    pub lat_max: f64,
}

impl BoundingBox {
    /// Creates a box from two corners, normalizing so min ≤ max per axis.
    #[must_use]
    pub fn new(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Self {
        let (lon_min, lon_max) = if lon1 <= lon2 { (lon1, lon2) } else { (lon2, lon1) };
        let (lat_min, lat_max) = if lat1 <= lat2 { (lat1, lat2) } else { (lat2, lat1) };
        Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    /// Returns `true` if the point lies within the box, inclusive on all
    /// four edges.
    #[must_use]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.lon_min <= lon && lon <= self.lon_max && self.lat_min <= lat && lat <= self.lat_max
    }
}

impl FromStr for BoundingBox {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let &[lon1, lat1, lon2, lat2] = parts.as_slice() else {
            return Err(HubError::InvalidBoundingBox(format!(
                "expected 4 comma-separated values, got {}",
                parts.len()
            )));
        };
        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| HubError::InvalidBoundingBox(format!("not a number: {v:?}")))
        };
        Ok(Self::new(parse(lon1)?, parse(lat1)?, parse(lon2)?, parse(lat2)?))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lon_min, self.lat_min, self.lon_max, self.lat_max
        )
    }
}

impl TryFrom<String> for BoundingBox {
    type Error = HubError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BoundingBox> for String {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_string()
    }
}

/// A user-defined magnitude/location filter used to generate alerts.
///
/// Created and deleted, never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Store-assigned identifier, monotonically increasing.
    pub id: i64,
    /// Free-text label.
    pub name: String,
    /// Minimum magnitude; a quake matches when `mag >= min_mag`.
    pub min_mag: f64,
    /// Optional geographic filter. Absent box matches all locations.
    pub bbox: Option<BoundingBox>,
}

impl Rule {
    /// Evaluates this rule against one quake.
    ///
    /// True iff the quake's magnitude meets the threshold (inclusive) and,
    /// when a bounding box is set, its epicenter lies within the box
    /// (inclusive on the edges). A rule with no box and `min_mag = 0`
    /// matches every quake.
    #[must_use]
    pub fn matches(&self, quake: &Quake) -> bool {
        if quake.mag < self.min_mag {
            return false;
        }
        match &self.bbox {
            Some(bbox) => bbox.contains(quake.lon, quake.lat),
            None => true,
        }
    }
}
