use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{AirQualityDataset, LoadNotice, LoadReport};
use crate::processors::{DataJoiner, DateErrorPolicy, Normalizer};
use crate::readers::{MeasurementReader, StationReader};
use crate::utils::constants::STATIONS_FILE;
use crate::utils::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loads the catalog and the yearly files, normalizes and joins them.
///
/// File and feature problems end up as notices in the load report. The only
/// error that escapes is an invalid date under [`DateErrorPolicy::Fatal`].
pub struct Pipeline {
    data_dir: PathBuf,
    stations_path: PathBuf,
    date_policy: DateErrorPolicy,
}

impl Pipeline {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            stations_path: data_dir.join(STATIONS_FILE),
            date_policy: DateErrorPolicy::default(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            stations_path: config.stations_path(),
            date_policy: config.date_policy(),
        }
    }

    pub fn with_stations_path(mut self, stations_path: PathBuf) -> Self {
        self.stations_path = stations_path;
        self
    }

    pub fn with_date_policy(mut self, date_policy: DateErrorPolicy) -> Self {
        self.date_policy = date_policy;
        self
    }

    pub fn load(&self, progress: Option<&ProgressReporter>) -> Result<AirQualityDataset> {
        let mut report = LoadReport::default();

        if let Some(p) = progress {
            p.set_message("Reading station catalog...");
        }

        let stations = match StationReader::new().read_stations(&self.stations_path) {
            Ok(catalog) => {
                report.notices.extend(catalog.skipped);
                catalog.stations
            }
            Err(e) => {
                warn!(
                    path = %self.stations_path.display(),
                    error = %e,
                    "Station catalog unavailable, continuing without station names"
                );
                report.notices.push(LoadNotice::UnreadableCatalog {
                    path: self.stations_path.clone(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };
        info!(stations = stations.len(), "Loaded station catalog");

        let load = MeasurementReader::new().read_all(&self.data_dir, progress);
        info!(
            records = load.records.len(),
            years = ?load.loaded_years,
            "Loaded measurement files"
        );
        report.loaded_years = load.loaded_years;
        report.notices.extend(load.notices);

        if let Some(p) = progress {
            p.set_message("Normalizing measurements...");
        }

        let normalizer = Normalizer::with_date_policy(self.date_policy);
        let (measurements, normalization) = normalizer.normalize(&load.records)?;
        report.normalization = normalization;

        let dataset = DataJoiner::new().into_dataset(stations, measurements, report);

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Loaded {} measurements",
                dataset.measurements().len()
            ));
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirQualityError;
    use crate::utils::filename::year_file_path;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"id_amat": 1, "nome": "Via Senato", "inquinanti": "NO2,PM10"},
             "geometry": {"type": "Point", "coordinates": [9.1973, 45.4704]}}
        ]
    }"#;

    #[test]
    fn test_load_without_catalog() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            year_file_path(dir.path(), 2019),
            r#"[{"data": "2019-05-01", "valore": "20", "inquinante": "O3", "stazione_id": 1}]"#,
        )?;

        let dataset = Pipeline::new(dir.path()).load(None)?;

        assert!(dataset.stations().is_empty());
        assert_eq!(dataset.measurements().len(), 1);
        assert!(dataset.joined().is_empty());
        assert!(dataset
            .report()
            .notices
            .iter()
            .any(|n| matches!(n, LoadNotice::UnreadableCatalog { .. })));

        Ok(())
    }

    #[test]
    fn test_strict_dates_fail_the_load() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(STATIONS_FILE), CATALOG)?;
        fs::write(
            year_file_path(dir.path(), 2020),
            r#"[{"data": "not a date", "valore": "20", "inquinante": "O3", "stazione_id": 1}]"#,
        )?;

        let lenient = Pipeline::new(dir.path()).load(None)?;
        assert!(lenient.is_empty());
        assert_eq!(lenient.report().normalization.invalid_dates, 1);

        let strict = Pipeline::new(dir.path())
            .with_date_policy(DateErrorPolicy::Fatal)
            .load(None);
        assert!(matches!(strict, Err(AirQualityError::DateParse { .. })));

        Ok(())
    }

    #[test]
    fn test_custom_stations_path() -> Result<()> {
        let dir = TempDir::new()?;
        let catalog_path = dir.path().join("stazioni.geojson");
        fs::write(&catalog_path, CATALOG)?;

        let dataset = Pipeline::new(dir.path())
            .with_stations_path(catalog_path)
            .load(None)?;

        assert_eq!(dataset.stations().len(), 1);
        assert_eq!(dataset.report().missing_years().len(), 10);

        Ok(())
    }
}
