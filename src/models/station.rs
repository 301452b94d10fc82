use serde::{Deserialize, Serialize};
use validator::Validate;

/// Station identifier as it appears in the source files.
///
/// The catalog stores integers while some yearly files quote the same ids as
/// strings, so every comparison goes through [`StationKey::canonical`].
/// Any other JSON type is kept as `Other` and has no canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StationKey {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

fn integral_key(id: f64) -> Option<String> {
    if id.fract() == 0.0 && id.abs() < i64::MAX as f64 {
        Some((id as i64).to_string())
    } else {
        None
    }
}

impl StationKey {
    /// Canonical string form used for joins: trimmed, integral values rendered
    /// as plain decimal integers (`5`, `5.0`, `"05"`, `"5.0"` all become `"5"`).
    /// Returns `None` for blank identifiers and any other JSON type.
    pub fn canonical(&self) -> Option<String> {
        match self {
            StationKey::Integer(id) => Some(id.to_string()),
            StationKey::Float(id) if id.is_finite() => {
                integral_key(*id).or_else(|| Some(id.to_string()))
            }
            StationKey::Float(_) => None,
            StationKey::Text(id) => {
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return None;
                }
                if let Ok(numeric) = trimmed.parse::<i64>() {
                    return Some(numeric.to_string());
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|id| id.is_finite())
                    .and_then(integral_key)
                    .or_else(|| Some(trimmed.to_string()))
            }
            StationKey::Other(_) => None,
        }
    }
}

impl From<&str> for StationKey {
    fn from(id: &str) -> Self {
        StationKey::Text(id.to_string())
    }
}

impl From<i32> for StationKey {
    fn from(id: i32) -> Self {
        StationKey::Integer(i64::from(id))
    }
}

impl From<i64> for StationKey {
    fn from(id: i64) -> Self {
        StationKey::Integer(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Station {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub name: String,

    pub pollutants: Vec<String>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
}

impl Station {
    pub fn new(
        id: String,
        name: String,
        pollutants: Vec<String>,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            id,
            name,
            pollutants,
            longitude,
            latitude,
        }
    }

    /// Whether the catalog lists `pollutant` for this station (case-insensitive)
    pub fn monitors(&self, pollutant: &str) -> bool {
        self.pollutants
            .iter()
            .any(|p| p.eq_ignore_ascii_case(pollutant))
    }
}
