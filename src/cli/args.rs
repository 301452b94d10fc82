use crate::utils::constants::{FIRST_YEAR, LAST_YEAR};
use crate::writers::ReportFormat;
use clap::builder::RangedI64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Years covered by the archive
fn year_parser() -> RangedI64ValueParser<i32> {
    clap::value_parser!(i32).range(i64::from(FIRST_YEAR)..=i64::from(LAST_YEAR))
}

#[derive(Parser)]
#[command(name = "milan-air-quality")]
#[command(about = "Yearly counts, monthly means and station rankings of Milan air quality data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Directory with the station catalog and the <year>_stazioni.json files"
    )]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Station catalog file, relative to the data directory")]
    pub stations_file: Option<String>,

    #[arg(short, long, global = true, help = "Configuration file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    #[arg(
        long,
        global = true,
        help = "Fail on the first unparsable date instead of skipping the record"
    )]
    pub strict_dates: bool,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress bar")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Overview of the loaded data and any loading notices
    Summary,

    /// List the monitoring stations of the catalog
    Stations {
        #[arg(short, long, help = "Only stations listing this pollutant")]
        pollutant: Option<String>,
    },

    /// Number of measurements per year
    Yearly,

    /// Monthly mean of a pollutant in one year
    Monthly {
        #[arg(
            short,
            long,
            value_parser = year_parser()
        )]
        year: i32,

        #[arg(short, long, help = "Pollutant code [default: first available in the year]")]
        pollutant: Option<String>,
    },

    /// Stations ranked by their mean value of a pollutant over all years
    Ranking {
        #[arg(short, long, help = "Pollutant code [default: first available]")]
        pollutant: Option<String>,
    },

    /// Monthly profile of one station in the most recent year, with its peak
    Focus {
        #[arg(short, long, help = "Station name [default: first with data]")]
        station: Option<String>,

        #[arg(short, long, help = "Pollutant code [default: first measured at the station]")]
        pollutant: Option<String>,
    },

    /// List available pollutant codes
    Pollutants {
        #[arg(
            short,
            long,
            help = "Only pollutants with valid values in this year",
            value_parser = year_parser()
        )]
        year: Option<i32>,
    },

    /// All four views with default selections
    Dashboard {
        #[arg(
            short,
            long,
            help = "Year of the monthly view [default: latest loaded]",
            value_parser = year_parser()
        )]
        year: Option<i32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_monthly() {
        let cli = Cli::try_parse_from([
            "milan-air-quality",
            "monthly",
            "--year",
            "2020",
            "-p",
            "NO2",
            "--format",
            "csv",
        ])
        .unwrap();

        assert_eq!(cli.format, ReportFormat::Csv);
        match cli.command {
            Commands::Monthly { year, pollutant } => {
                assert_eq!(year, 2020);
                assert_eq!(pollutant.as_deref(), Some("NO2"));
            }
            _ => panic!("expected the monthly command"),
        }
    }

    #[test]
    fn test_year_out_of_range() {
        let result = Cli::try_parse_from(["milan-air-quality", "monthly", "--year", "2015"]);
        assert!(result.is_err());
    }
}
