use crate::utils::constants::YEAR_FILE_SUFFIX;
use std::path::{Path, PathBuf};

/// Name of the measurement file for a year: `{year}_stazioni.json`
pub fn year_file_name(year: i32) -> String {
    format!("{}{}", year, YEAR_FILE_SUFFIX)
}

/// Full path of the measurement file for a year inside `base_dir`
pub fn year_file_path(base_dir: &Path, year: i32) -> PathBuf {
    base_dir.join(year_file_name(year))
}
