use crate::models::{AirQualityDataset, LoadNotice};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub valid_records: usize,
    pub missing_values: usize,
    pub skipped_records: usize,
    pub joined_records: usize,
    pub unmatched_records: usize,
    pub catalog_stations: usize,
    pub stations_with_data: usize,
    pub pollutants: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub loaded_years: Vec<i32>,
    pub missing_years: Vec<i32>,
    pub notices: Vec<LoadNotice>,
}

impl DatasetSummary {
    pub fn missing_percentage(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.missing_values as f64 / self.total_records as f64) * 100.0
    }

    pub fn joined_percentage(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.joined_records as f64 / self.total_records as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        let date_range = match self.date_range {
            Some((first, last)) => format!("{} to {}", first, last),
            None => "No measurements".to_string(),
        };

        let years = if self.loaded_years.is_empty() {
            "none".to_string()
        } else {
            join_years(&self.loaded_years)
        };

        let mut summary = format!(
            "=== Milan Air Quality Dataset ===\n\
            Records: {} total, {} with a valid value ({:.1}% missing)\n\
            Skipped records: {}\n\
            Joined to a station: {} ({:.1}%), unmatched: {}\n\
            Stations: {} in catalog, {} with data\n\
            Pollutants: {}\n\
            Date Range: {}\n\
            Years loaded: {}",
            self.total_records,
            self.valid_records,
            self.missing_percentage(),
            self.skipped_records,
            self.joined_records,
            self.joined_percentage(),
            self.unmatched_records,
            self.catalog_stations,
            self.stations_with_data,
            self.pollutants.join(", "),
            date_range,
            years,
        );

        if !self.missing_years.is_empty() {
            summary.push_str(&format!("\nYears missing: {}", join_years(&self.missing_years)));
        }

        if !self.notices.is_empty() {
            summary.push_str(&format!("\n\nNotices ({}):", self.notices.len()));
            for notice in &self.notices {
                summary.push_str(&format!("\n  - {}", notice));
            }
        }

        summary
    }
}

fn join_years(years: &[i32]) -> String {
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &AirQualityDataset) -> DatasetSummary {
        let measurements = dataset.measurements();
        let report = dataset.report();

        let valid_records = measurements.iter().filter(|m| m.has_value()).count();
        let pollutants: BTreeSet<&str> =
            measurements.iter().map(|m| m.pollutant.as_str()).collect();
        let stations_with_data: BTreeSet<&str> = dataset
            .joined()
            .iter()
            .map(|j| j.measurement.station_id.as_str())
            .collect();

        let first = measurements.iter().map(|m| m.date).min();
        let last = measurements.iter().map(|m| m.date).max();

        DatasetSummary {
            total_records: measurements.len(),
            valid_records,
            missing_values: measurements.len() - valid_records,
            skipped_records: report.normalization.skipped_rows(),
            joined_records: dataset.joined().len(),
            unmatched_records: report.join.unmatched_rows,
            catalog_stations: dataset.stations().len(),
            stations_with_data: stations_with_data.len(),
            pollutants: pollutants.into_iter().map(str::to_string).collect(),
            date_range: first.zip(last),
            loaded_years: report.loaded_years.clone(),
            missing_years: report.missing_years(),
            notices: report.notices.clone(),
        }
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
