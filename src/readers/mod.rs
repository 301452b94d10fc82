pub mod measurement_reader;
pub mod station_reader;

pub use measurement_reader::{MeasurementLoad, MeasurementReader};
pub use station_reader::{StationCatalog, StationReader};
