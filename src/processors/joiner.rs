use crate::models::{
    AirQualityDataset, JoinReport, JoinedMeasurement, LoadReport, NormalizedMeasurement, Station,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Attaches station names to measurements by canonical station id.
///
/// Inner join: measurements whose station is not in the catalog are left out
/// of the joined table and reported.
pub struct DataJoiner;

impl DataJoiner {
    pub fn new() -> Self {
        Self
    }

    pub fn join(
        &self,
        stations: &[Station],
        measurements: &[NormalizedMeasurement],
    ) -> (Vec<JoinedMeasurement>, JoinReport) {
        let names: HashMap<&str, &str> = stations
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str()))
            .collect();

        let mut joined = Vec::with_capacity(measurements.len());
        let mut unmatched_ids = BTreeSet::new();
        let mut unmatched_rows = 0;

        for measurement in measurements {
            match names.get(measurement.station_id.as_str()) {
                Some(name) => joined.push(JoinedMeasurement {
                    station_name: name.to_string(),
                    measurement: measurement.clone(),
                }),
                None => {
                    unmatched_rows += 1;
                    unmatched_ids.insert(measurement.station_id.clone());
                }
            }
        }

        if unmatched_rows > 0 {
            warn!(
                rows = unmatched_rows,
                stations = ?unmatched_ids,
                "Dropped measurements with no matching station"
            );
        }

        let report = JoinReport {
            joined_rows: joined.len(),
            unmatched_rows,
            unmatched_station_ids: unmatched_ids.into_iter().collect(),
        };

        (joined, report)
    }

    /// Join and wrap everything into the read-only dataset
    pub fn into_dataset(
        &self,
        stations: Vec<Station>,
        measurements: Vec<NormalizedMeasurement>,
        mut report: LoadReport,
    ) -> AirQualityDataset {
        let (joined, join_report) = self.join(&stations, &measurements);

        info!(
            measurements = measurements.len(),
            joined = join_report.joined_rows,
            stations = stations.len(),
            "Dataset ready"
        );

        report.join = join_report;
        AirQualityDataset::new(stations, measurements, joined, report)
    }
}

impl Default for DataJoiner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawMeasurement;
    use crate::processors::Normalizer;

    fn station(id: &str, name: &str) -> Station {
        Station::new(id.to_string(), name.to_string(), vec![], 9.19, 45.46)
    }

    #[test]
    fn test_join_mixed_id_types() {
        let stations = vec![station("1", "Via Senato"), station("2", "Viale Liguria")];
        let raw = vec![
            RawMeasurement::new(1, "NO2", "2020-03-01", "40"),
            RawMeasurement::new("2", "NO2", "2020-03-01", 35.0),
            RawMeasurement::new(" 01 ", "NO2", "2020-03-02", "44"),
        ];
        let (measurements, _) = Normalizer::new().normalize(&raw).unwrap();

        let (joined, report) = DataJoiner::new().join(&stations, &measurements);

        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].station_name, "Via Senato");
        assert_eq!(joined[1].station_name, "Viale Liguria");
        assert_eq!(joined[2].station_name, "Via Senato");
        assert_eq!(report.unmatched_rows, 0);
    }

    #[test]
    fn test_unmatched_rows_are_dropped() {
        let stations = vec![station("1", "Via Senato")];
        let raw = vec![
            RawMeasurement::new(1, "NO2", "2020-03-01", "40"),
            RawMeasurement::new(99, "NO2", "2020-03-01", "40"),
            RawMeasurement::new(99, "O3", "2020-03-02", "70"),
            RawMeasurement::new("42", "O3", "2020-03-02", "70"),
        ];
        let (measurements, _) = Normalizer::new().normalize(&raw).unwrap();

        let dataset =
            DataJoiner::new().into_dataset(stations, measurements, LoadReport::default());

        assert_eq!(dataset.measurements().len(), 4);
        assert_eq!(dataset.joined().len(), 1);
        assert_eq!(dataset.report().join.unmatched_rows, 3);
        assert_eq!(dataset.report().join.unmatched_station_ids, vec!["42", "99"]);
    }
}
