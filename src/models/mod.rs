pub mod dataset;
pub mod measurement;
pub mod report;
pub mod station;
pub mod views;

pub use dataset::AirQualityDataset;
pub use measurement::{JoinedMeasurement, NormalizedMeasurement, RawMeasurement, RawValue};
pub use report::{JoinReport, LoadNotice, LoadReport, NormalizationReport};
pub use station::{Station, StationKey};
pub use views::{FocusView, MonthlyMean, QueryOutcome, StationMean, YearCount};
