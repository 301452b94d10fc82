use crate::models::{JoinedMeasurement, LoadReport, NormalizedMeasurement, Station};

/// Everything loaded at startup. Built once by the pipeline and only read
/// afterwards; every query takes it by reference.
#[derive(Debug, Clone)]
pub struct AirQualityDataset {
    stations: Vec<Station>,
    measurements: Vec<NormalizedMeasurement>,
    joined: Vec<JoinedMeasurement>,
    report: LoadReport,
}

impl AirQualityDataset {
    pub fn new(
        stations: Vec<Station>,
        measurements: Vec<NormalizedMeasurement>,
        joined: Vec<JoinedMeasurement>,
        report: LoadReport,
    ) -> Self {
        Self {
            stations,
            measurements,
            joined,
            report,
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn measurements(&self) -> &[NormalizedMeasurement] {
        &self.measurements
    }

    pub fn joined(&self) -> &[JoinedMeasurement] {
        &self.joined
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}
