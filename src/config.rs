use crate::error::Result;
use crate::processors::DateErrorPolicy;
use crate::utils::constants::{CONFIG_FILE, ENV_PREFIX, STATIONS_FILE};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Where to find the data and how strictly to read it.
///
/// Sources, lowest priority first: built-in defaults, the TOML file,
/// `MILAN_AQ_*` environment variables. Command line flags are applied on top
/// by the CLI.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,

    #[validate(length(min = 1))]
    pub stations_file: String,

    pub strict_dates: bool,
}

impl DashboardConfig {
    /// Load the configuration. An explicit `path` must exist; otherwise
    /// `milan-air-quality.toml` in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Values from `env` stay strings; serde converts `strict_dates` itself.
    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(CONFIG_FILE)).required(false),
        };

        let config: DashboardConfig = Config::builder()
            .set_default("data_dir", ".")?
            .set_default("stations_file", STATIONS_FILE)?
            .set_default("strict_dates", false)?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Catalog path; a relative `stations_file` lives inside `data_dir`
    pub fn stations_path(&self) -> PathBuf {
        self.data_dir.join(&self.stations_file)
    }

    pub fn date_policy(&self) -> DateErrorPolicy {
        if self.strict_dates {
            DateErrorPolicy::Fatal
        } else {
            DateErrorPolicy::SkipRow
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            stations_file: STATIONS_FILE.to_string(),
            strict_dates: false,
        }
    }
}
