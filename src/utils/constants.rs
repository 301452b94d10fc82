/// Year range covered by the measurement archive
pub const FIRST_YEAR: i32 = 2016;
pub const LAST_YEAR: i32 = 2025;

/// File names
pub const STATIONS_FILE: &str = "qaria_stazione.geojson";
pub const YEAR_FILE_SUFFIX: &str = "_stazioni.json";
pub const CONFIG_FILE: &str = "milan-air-quality.toml";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MILAN_AQ";

/// Unit of the concentration values
pub const VALUE_UNIT: &str = "µg/m³";

/// Width of the bar column in text reports
pub const BAR_WIDTH: usize = 30;
