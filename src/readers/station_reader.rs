use crate::error::{AirQualityError, Result};
use crate::models::{LoadNotice, Station, StationKey};
use crate::utils::coordinates::parse_lon_lat;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use validator::Validate;

#[derive(Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Properties {
    id_amat: StationKey,
    nome: String,
    inquinanti: PollutantList,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Value,
}

/// Pollutants are either a JSON list or a single comma separated string
#[derive(Deserialize)]
#[serde(untagged)]
enum PollutantList {
    List(Vec<String>),
    Joined(String),
}

impl PollutantList {
    fn into_codes(self) -> Vec<String> {
        let codes: Vec<String> = match self {
            PollutantList::List(codes) => codes,
            PollutantList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };

        codes
            .into_iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect()
    }
}

/// Stations read from a catalog plus the features that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    pub stations: Vec<Station>,
    pub skipped: Vec<LoadNotice>,
}

pub struct StationReader {
    strict: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// In strict mode the first malformed feature fails the whole catalog
    pub fn with_strict(strict: bool) -> Self {
        Self { strict }
    }

    /// Read station metadata from a GeoJSON feature collection file
    pub fn read_stations(&self, path: &Path) -> Result<StationCatalog> {
        let content = fs::read_to_string(path)?;
        let catalog = self.parse_catalog(&content)?;

        debug!(
            path = %path.display(),
            stations = catalog.stations.len(),
            skipped = catalog.skipped.len(),
            "Read station catalog"
        );

        Ok(catalog)
    }

    /// Parse the catalog text. Only a document without a `features` array
    /// fails as a whole; individual bad features are skipped.
    pub fn parse_catalog(&self, content: &str) -> Result<StationCatalog> {
        let document: Value = serde_json::from_str(content)?;
        let features = document
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AirQualityError::MalformedCatalog(
                    "expected a feature collection with a 'features' array".to_string(),
                )
            })?;

        let mut catalog = StationCatalog::default();
        let mut seen_ids = HashSet::new();

        for (index, feature) in features.iter().enumerate() {
            let result = self.parse_feature(feature).and_then(|station| {
                if seen_ids.insert(station.id.clone()) {
                    Ok(station)
                } else {
                    Err(AirQualityError::MalformedCatalog(format!(
                        "duplicate station id '{}'",
                        station.id
                    )))
                }
            });

            match result {
                Ok(station) => catalog.stations.push(station),
                Err(e) if self.strict => return Err(e),
                Err(e) => {
                    warn!(feature = index, error = %e, "Skipping station feature");
                    catalog.skipped.push(LoadNotice::SkippedStation {
                        feature: index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(catalog)
    }

    /// Parse a single feature into a validated station
    fn parse_feature(&self, feature: &Value) -> Result<Station> {
        let feature = Feature::deserialize(feature)
            .map_err(|e| AirQualityError::MalformedCatalog(e.to_string()))?;

        let id = feature.properties.id_amat.canonical().ok_or_else(|| {
            AirQualityError::MalformedCatalog("blank or non-scalar station id".to_string())
        })?;
        let (longitude, latitude) = parse_lon_lat(&feature.geometry.coordinates)?;

        let station = Station::new(
            id,
            feature.properties.nome.trim().to_string(),
            feature.properties.inquinanti.into_codes(),
            longitude,
            latitude,
        );
        station.validate()?;

        Ok(station)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
