use crate::error::Result;
use crate::models::{LoadNotice, RawMeasurement};
use crate::utils::constants::{FIRST_YEAR, LAST_YEAR};
use crate::utils::filename::year_file_path;
use crate::utils::progress::ProgressReporter;
use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, warn};

/// Raw records of every yearly file found, plus what could not be read.
#[derive(Debug, Clone, Default)]
pub struct MeasurementLoad {
    pub records: Vec<RawMeasurement>,
    pub loaded_years: Vec<i32>,
    pub notices: Vec<LoadNotice>,
}

pub struct MeasurementReader {
    years: RangeInclusive<i32>,
}

impl MeasurementReader {
    pub fn new() -> Self {
        Self {
            years: FIRST_YEAR..=LAST_YEAR,
        }
    }

    /// Read `<year>_stazioni.json` for every year of the range from `base_dir`.
    ///
    /// A missing or unreadable year becomes a notice and the remaining years
    /// are still loaded.
    pub fn read_all(
        &self,
        base_dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> MeasurementLoad {
        let mut load = MeasurementLoad::default();

        for year in self.years.clone() {
            if let Some(p) = progress {
                p.set_message(&format!("Reading {}...", year));
            }

            let path = year_file_path(base_dir, year);

            if !path.is_file() {
                warn!(year, path = %path.display(), "Missing data file");
                load.notices.push(LoadNotice::MissingDataFile { year, path });
            } else {
                match self.read_year_file(&path) {
                    Ok(records) => {
                        debug!(year, records = records.len(), "Read data file");
                        load.records.extend(records);
                        load.loaded_years.push(year);
                    }
                    Err(e) => {
                        warn!(year, path = %path.display(), error = %e, "Unreadable data file");
                        load.notices.push(LoadNotice::UnreadableDataFile {
                            year,
                            path,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        load
    }

    /// Read one yearly file: a JSON array of measurement records
    pub fn read_year_file(&self, path: &Path) -> Result<Vec<RawMeasurement>> {
        let file = File::open(path)?;
        let records = serde_json::from_reader(BufReader::new(file))?;
        Ok(records)
    }
}

impl Default for MeasurementReader {
    fn default() -> Self {
        Self::new()
    }
}
