use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A recoverable problem met while loading. Notices never stop the load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadNotice {
    MissingDataFile {
        year: i32,
        path: PathBuf,
    },
    UnreadableDataFile {
        year: i32,
        path: PathBuf,
        reason: String,
    },
    UnreadableCatalog {
        path: PathBuf,
        reason: String,
    },
    SkippedStation {
        feature: usize,
        reason: String,
    },
}

impl fmt::Display for LoadNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadNotice::MissingDataFile { year, path } => {
                write!(f, "Missing data file for {}: {}", year, path.display())
            }
            LoadNotice::UnreadableDataFile { year, path, reason } => write!(
                f,
                "Unreadable data file for {} ({}): {}",
                year,
                path.display(),
                reason
            ),
            LoadNotice::UnreadableCatalog { path, reason } => write!(
                f,
                "Station catalog {} could not be loaded: {}",
                path.display(),
                reason
            ),
            LoadNotice::SkippedStation { feature, reason } => {
                write!(f, "Skipped station feature #{}: {}", feature, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub input_rows: usize,
    pub normalized_rows: usize,
    pub missing_values: usize,
    pub invalid_dates: usize,
    pub malformed_rows: usize,
}

impl NormalizationReport {
    pub fn skipped_rows(&self) -> usize {
        self.invalid_dates + self.malformed_rows
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    pub joined_rows: usize,
    pub unmatched_rows: usize,
    /// Canonical ids with no catalog entry, sorted
    pub unmatched_station_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded_years: Vec<i32>,
    pub notices: Vec<LoadNotice>,
    pub normalization: NormalizationReport,
    pub join: JoinReport,
}

impl LoadReport {
    pub fn missing_years(&self) -> Vec<i32> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                LoadNotice::MissingDataFile { year, .. }
                | LoadNotice::UnreadableDataFile { year, .. } => Some(*year),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_years() {
        let report = LoadReport {
            loaded_years: vec![2020],
            notices: vec![
                LoadNotice::MissingDataFile {
                    year: 2021,
                    path: PathBuf::from("2021_stazioni.json"),
                },
                LoadNotice::SkippedStation {
                    feature: 3,
                    reason: "missing nome".to_string(),
                },
                LoadNotice::UnreadableDataFile {
                    year: 2022,
                    path: PathBuf::from("2022_stazioni.json"),
                    reason: "expected an array".to_string(),
                },
            ],
            ..Default::default()
        };

        assert_eq!(report.missing_years(), vec![2021, 2022]);
    }

    #[test]
    fn test_notice_display() {
        let notice = LoadNotice::MissingDataFile {
            year: 2021,
            path: PathBuf::from("data/2021_stazioni.json"),
        };
        assert_eq!(
            notice.to_string(),
            "Missing data file for 2021: data/2021_stazioni.json"
        );
    }
}
