use crate::models::{
    AirQualityDataset, FocusView, JoinedMeasurement, MonthlyMean, QueryOutcome, StationMean,
    YearCount,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, Copy)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Mean per month of `(month, value)` pairs, months ascending
fn monthly_series(values: impl Iterator<Item = (u32, f64)>) -> Vec<MonthlyMean> {
    let mut months: BTreeMap<u32, MeanAccumulator> = BTreeMap::new();
    for (month, value) in values {
        months.entry(month).or_default().add(value);
    }

    months
        .into_iter()
        .map(|(month, acc)| MonthlyMean {
            month,
            mean: acc.mean(),
            samples: acc.count,
        })
        .collect()
}

/// Month with the highest mean; the earliest month wins a tie
pub fn peak_month(series: &[MonthlyMean]) -> Option<MonthlyMean> {
    series.iter().copied().fold(None, |best, candidate| match best {
        Some(best) if best.mean >= candidate.mean => Some(best),
        _ => Some(candidate),
    })
}

/// The four dashboard views and the option lists that drive them.
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Number of measurements per year, for years present in the data
    pub fn yearly_counts(&self, dataset: &AirQualityDataset) -> QueryOutcome<Vec<YearCount>> {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for m in dataset.measurements() {
            *counts.entry(m.year).or_default() += 1;
        }

        let rows = counts
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect();

        QueryOutcome::from_rows(rows, "No measurements loaded")
    }

    /// Monthly mean of `pollutant` during `year`, missing values excluded
    pub fn monthly_means(
        &self,
        dataset: &AirQualityDataset,
        year: i32,
        pollutant: &str,
    ) -> QueryOutcome<Vec<MonthlyMean>> {
        let values = dataset
            .measurements()
            .iter()
            .filter(|m| m.year == year && m.pollutant == pollutant)
            .filter_map(|m| m.value.map(|v| (m.month, v)));

        QueryOutcome::from_rows(
            monthly_series(values),
            format!("No valid {} measurements in {}", pollutant, year),
        )
    }

    /// Stations ordered by their mean `pollutant` value over the whole period,
    /// highest first, ties by name
    pub fn station_ranking(
        &self,
        dataset: &AirQualityDataset,
        pollutant: &str,
    ) -> QueryOutcome<Vec<StationMean>> {
        let mut stations: BTreeMap<&str, MeanAccumulator> = BTreeMap::new();
        for joined in dataset.joined() {
            let m = &joined.measurement;
            if m.pollutant != pollutant {
                continue;
            }
            if let Some(value) = m.value {
                stations
                    .entry(joined.station_name.as_str())
                    .or_default()
                    .add(value);
            }
        }

        let mut rows: Vec<StationMean> = stations
            .into_iter()
            .map(|(station, acc)| StationMean {
                station: station.to_string(),
                mean: acc.mean(),
                samples: acc.count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.mean
                .total_cmp(&a.mean)
                .then_with(|| a.station.cmp(&b.station))
        });

        QueryOutcome::from_rows(
            rows,
            format!("Not enough data to compute station means for {}", pollutant),
        )
    }

    /// Monthly profile of one station in the latest year of the joined data
    pub fn focus(
        &self,
        dataset: &AirQualityDataset,
        station: &str,
        pollutant: &str,
    ) -> QueryOutcome<FocusView> {
        let Some(year) = self.latest_year(dataset) else {
            return QueryOutcome::no_data("No measurements matched a known station");
        };

        let values = latest_rows(dataset, year)
            .filter(|j| j.station_name == station && j.measurement.pollutant == pollutant)
            .filter_map(|j| j.measurement.value.map(|v| (j.measurement.month, v)));
        let series = monthly_series(values);

        match peak_month(&series) {
            Some(peak) => QueryOutcome::Data(FocusView {
                year,
                station: station.to_string(),
                pollutant: pollutant.to_string(),
                series,
                peak,
            }),
            None => QueryOutcome::no_data(format!(
                "No valid {} values for {} in {}",
                pollutant, station, year
            )),
        }
    }

    /// Latest year in the joined data
    pub fn latest_year(&self, dataset: &AirQualityDataset) -> Option<i32> {
        dataset.joined().iter().map(|j| j.measurement.year).max()
    }

    /// Pollutants with a valid value in `year`, or every pollutant loaded
    pub fn pollutants(&self, dataset: &AirQualityDataset, year: Option<i32>) -> Vec<String> {
        let codes: BTreeSet<&str> = dataset
            .measurements()
            .iter()
            .filter(|m| year.map_or(true, |y| m.year == y && m.has_value()))
            .map(|m| m.pollutant.as_str())
            .collect();

        codes.into_iter().map(str::to_string).collect()
    }

    /// Pollutants of measurements that matched a station
    pub fn ranking_pollutants(&self, dataset: &AirQualityDataset) -> Vec<String> {
        let codes: BTreeSet<&str> = dataset
            .joined()
            .iter()
            .map(|j| j.measurement.pollutant.as_str())
            .collect();

        codes.into_iter().map(str::to_string).collect()
    }

    /// Station names with data in the latest year
    pub fn focus_stations(&self, dataset: &AirQualityDataset) -> Vec<String> {
        let Some(year) = self.latest_year(dataset) else {
            return Vec::new();
        };

        let names: BTreeSet<&str> = latest_rows(dataset, year)
            .map(|j| j.station_name.as_str())
            .collect();

        names.into_iter().map(str::to_string).collect()
    }

    /// Pollutants measured at `station` in the latest year
    pub fn focus_pollutants(&self, dataset: &AirQualityDataset, station: &str) -> Vec<String> {
        let Some(year) = self.latest_year(dataset) else {
            return Vec::new();
        };

        let codes: BTreeSet<&str> = latest_rows(dataset, year)
            .filter(|j| j.station_name == station)
            .map(|j| j.measurement.pollutant.as_str())
            .collect();

        codes.into_iter().map(str::to_string).collect()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn latest_rows(
    dataset: &AirQualityDataset,
    year: i32,
) -> impl Iterator<Item = &JoinedMeasurement> + '_ {
    dataset
        .joined()
        .iter()
        .filter(move |j| j.measurement.year == year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoadReport, RawMeasurement, Station};
    use crate::processors::{DataJoiner, Normalizer};

    fn station(id: &str, name: &str) -> Station {
        Station::new(id.to_string(), name.to_string(), vec![], 9.19, 45.46)
    }

    fn dataset(stations: Vec<Station>, raw: Vec<RawMeasurement>) -> AirQualityDataset {
        let (measurements, normalization) = Normalizer::new().normalize(&raw).unwrap();
        let report = LoadReport {
            normalization,
            ..Default::default()
        };
        DataJoiner::new().into_dataset(stations, measurements, report)
    }

    fn sample() -> AirQualityDataset {
        dataset(
            vec![
                station("1", "Via Senato"),
                station("2", "Viale Liguria"),
                station("3", "Verziere"),
            ],
            vec![
                RawMeasurement::new(1, "NO2", "2020-01-10", "40"),
                RawMeasurement::new(1, "NO2", "2020-01-11", "50"),
                RawMeasurement::new(1, "NO2", "2020-02-10", "N/A"),
                RawMeasurement::new(2, "NO2", "2020-03-10", "30"),
                RawMeasurement::new(2, "O3", "2020-07-10", 80.0),
                RawMeasurement::new(3, "NO2", "2021-01-05", "45"),
                RawMeasurement::new(3, "NO2", "2021-02-05", "60"),
                RawMeasurement::new(3, "NO2", "2021-03-05", "60"),
                RawMeasurement::new(3, "PM10", "2021-03-05", "n.d."),
                RawMeasurement::new(7, "NO2", "2022-06-01", "99"),
            ],
        )
    }

    #[test]
    fn test_yearly_counts() {
        let data = sample();
        let counts = Aggregator::new().yearly_counts(&data).into_data().unwrap();

        assert_eq!(
            counts,
            vec![
                YearCount { year: 2020, count: 5 },
                YearCount { year: 2021, count: 4 },
                YearCount { year: 2022, count: 1 },
            ]
        );
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, data.report().normalization.normalized_rows);
    }

    #[test]
    fn test_monthly_means_exclude_missing() {
        let data = sample();
        let series = Aggregator::new()
            .monthly_means(&data, 2020, "NO2")
            .into_data()
            .unwrap();

        // February only has a missing value
        let months: Vec<(u32, f64)> = series.iter().map(|m| (m.month, m.mean)).collect();
        assert_eq!(months, vec![(1, 45.0), (3, 30.0)]);
        assert_eq!(series[0].samples, 2);
    }

    #[test]
    fn test_monthly_means_no_data() {
        let data = sample();
        let aggregator = Aggregator::new();

        assert!(aggregator.monthly_means(&data, 2019, "NO2").is_no_data());
        assert!(aggregator.monthly_means(&data, 2021, "PM10").is_no_data());
    }

    #[test]
    fn test_station_ranking() {
        let data = sample();
        let ranking = Aggregator::new()
            .station_ranking(&data, "NO2")
            .into_data()
            .unwrap();

        let rows: Vec<(&str, f64)> = ranking
            .iter()
            .map(|r| (r.station.as_str(), r.mean))
            .collect();
        assert_eq!(
            rows,
            vec![("Verziere", 55.0), ("Via Senato", 45.0), ("Viale Liguria", 30.0)]
        );
    }

    #[test]
    fn test_station_ranking_ties_by_name() {
        let data = dataset(
            vec![station("1", "Zara"), station("2", "Abbiategrasso")],
            vec![
                RawMeasurement::new(1, "O3", "2020-05-01", "10"),
                RawMeasurement::new(2, "O3", "2020-05-01", "10"),
            ],
        );

        let ranking = Aggregator::new().station_ranking(&data, "O3").into_data().unwrap();

        assert_eq!(ranking[0].station, "Abbiategrasso");
        assert_eq!(ranking[1].station, "Zara");
    }

    #[test]
    fn test_station_ranking_skips_stations_without_values() {
        let data = sample();
        assert!(Aggregator::new().station_ranking(&data, "PM10").is_no_data());
        assert!(Aggregator::new().station_ranking(&data, "CO").is_no_data());
    }

    #[test]
    fn test_peak_month() {
        let series = vec![
            MonthlyMean { month: 1, mean: 5.0, samples: 1 },
            MonthlyMean { month: 2, mean: 9.0, samples: 1 },
            MonthlyMean { month: 3, mean: 3.0, samples: 1 },
        ];
        let peak = peak_month(&series).unwrap();
        assert_eq!((peak.month, peak.mean), (2, 9.0));

        assert_eq!(peak_month(&[]), None);
    }

    #[test]
    fn test_peak_month_tie_takes_first() {
        let series = vec![
            MonthlyMean { month: 4, mean: 9.0, samples: 1 },
            MonthlyMean { month: 8, mean: 9.0, samples: 3 },
        ];
        assert_eq!(peak_month(&series).unwrap().month, 4);
    }

    #[test]
    fn test_focus_uses_latest_joined_year() {
        let data = sample();
        let aggregator = Aggregator::new();

        // Station 7 (2022) is not in the catalog, so 2021 is the latest joined year
        assert_eq!(aggregator.latest_year(&data), Some(2021));
        assert_eq!(aggregator.focus_stations(&data), vec!["Verziere"]);
        assert_eq!(aggregator.focus_pollutants(&data, "Verziere"), vec!["NO2", "PM10"]);

        let focus = aggregator.focus(&data, "Verziere", "NO2").into_data().unwrap();
        assert_eq!(focus.year, 2021);
        assert_eq!(focus.series.len(), 3);
        assert_eq!(focus.peak.month, 2);
        assert_eq!(focus.peak.mean, 60.0);

        assert!(aggregator.focus(&data, "Verziere", "PM10").is_no_data());
        assert!(aggregator.focus(&data, "Via Senato", "NO2").is_no_data());
    }

    #[test]
    fn test_focus_without_joined_rows() {
        let data = dataset(vec![], vec![RawMeasurement::new(1, "NO2", "2020-01-01", "1")]);
        let aggregator = Aggregator::new();

        assert_eq!(aggregator.latest_year(&data), None);
        assert!(aggregator.focus_stations(&data).is_empty());
        assert!(aggregator.focus(&data, "Via Senato", "NO2").is_no_data());
    }

    #[test]
    fn test_pollutant_lists() {
        let data = sample();
        let aggregator = Aggregator::new();

        assert_eq!(aggregator.pollutants(&data, None), vec!["NO2", "O3", "PM10"]);
        // PM10 in 2021 has no valid value
        assert_eq!(aggregator.pollutants(&data, Some(2021)), vec!["NO2"]);
        assert_eq!(aggregator.ranking_pollutants(&data), vec!["NO2", "O3", "PM10"]);
    }

    #[test]
    fn test_empty_dataset() {
        let data = dataset(vec![], vec![]);
        assert!(Aggregator::new().yearly_counts(&data).is_no_data());
    }
}
