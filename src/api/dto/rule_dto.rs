//! Rule-related DTOs for create, list, and delete operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Rule;

/// Form body for `POST /rules`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRuleForm {
    /// Free-text rule name.
    pub name: String,
    /// Minimum magnitude threshold.
    pub min_mag: f64,
    /// Optional bounding box as `lon1,lat1,lon2,lat2`. An empty string is
    /// treated as absent (HTML forms submit empty fields).
    #[serde(default)]
    pub bbox: Option<String>,
}

/// Response body for `POST /rules`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRuleResponse {
    /// Id of the newly created rule.
    pub created: i64,
}

/// One rule in `GET /rules` responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RuleDto {
    /// Rule identifier.
    pub id: i64,
    /// Rule name.
    pub name: String,
    /// Minimum magnitude threshold.
    pub min_mag: f64,
    /// Bounding box in normalized `lon1,lat1,lon2,lat2` form, if any.
    pub bbox: Option<String>,
}

impl From<Rule> for RuleDto {
    fn from(rule: Rule) -> Self {
        Self {
            id: rule.id,
            name: rule.name,
            min_mag: rule.min_mag,
            bbox: rule.bbox.map(|b| b.to_string()),
        }
    }
}
