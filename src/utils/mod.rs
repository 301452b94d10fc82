pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::parse_lon_lat;
pub use filename::{year_file_name, year_file_path};
pub use progress::ProgressReporter;
