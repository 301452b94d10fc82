use crate::analyzers::{Aggregator, DatasetAnalyzer};
use crate::cli::args::{Cli, Commands};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{AirQualityDataset, QueryOutcome, Station};
use crate::processors::Pipeline;
use crate::utils::constants::{FIRST_YEAR, LAST_YEAR};
use crate::utils::progress::ProgressReporter;
use crate::writers::{ReportFormat, ReportWriter};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }

    Ok(())
}

/// Configuration file first, then command line overrides
fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(cli.config.as_deref())?;

    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(ref stations_file) = cli.stations_file {
        config.stations_file = stations_file.clone();
    }
    if cli.strict_dates {
        config.strict_dates = true;
    }

    Ok(config)
}

/// An explicit choice wins, otherwise the first available option
fn pick(explicit: Option<String>, options: Vec<String>) -> Option<String> {
    explicit.or_else(|| options.into_iter().next())
}

pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    info!(data_dir = %config.data_dir.display(), "Loading air quality data");

    let dataset = {
        let total_years = (LAST_YEAR - FIRST_YEAR + 1) as u64;
        let progress = ProgressReporter::new(total_years, "Loading...", cli.quiet);
        Pipeline::from_config(&config).load(Some(&progress))?
    };

    let writer = ReportWriter::new(cli.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Summary => {
            let summary = DatasetAnalyzer::new().analyze(&dataset);
            writer.write_summary(&mut out, &summary)?;
        }

        Commands::Stations { pollutant } => {
            let stations: Vec<Station> = dataset
                .stations()
                .iter()
                .filter(|s| pollutant.as_deref().map_or(true, |p| s.monitors(p)))
                .cloned()
                .collect();
            writer.write_stations(&mut out, &stations)?;
        }

        Commands::Yearly => {
            let outcome = Aggregator::new().yearly_counts(&dataset);
            writer.write_yearly_counts(&mut out, &outcome)?;
        }

        Commands::Monthly { year, pollutant } => {
            write_monthly(&writer, &mut out, &dataset, year, pollutant)?;
        }

        Commands::Ranking { pollutant } => {
            write_ranking(&writer, &mut out, &dataset, pollutant)?;
        }

        Commands::Focus { station, pollutant } => {
            write_focus(&writer, &mut out, &dataset, station, pollutant)?;
        }

        Commands::Pollutants { year } => {
            let title = match year {
                Some(year) => format!("Pollutants with valid values in {}", year),
                None => "Pollutants".to_string(),
            };
            let pollutants = Aggregator::new().pollutants(&dataset, year);
            writer.write_list(&mut out, &title, &pollutants)?;
        }

        Commands::Dashboard { year } => {
            let aggregator = Aggregator::new();
            let year = year
                .or_else(|| dataset.measurements().iter().map(|m| m.year).max())
                .unwrap_or(LAST_YEAR);

            writer.write_yearly_counts(&mut out, &aggregator.yearly_counts(&dataset))?;
            section_break(&writer, &mut out)?;
            write_monthly(&writer, &mut out, &dataset, year, None)?;
            section_break(&writer, &mut out)?;
            write_ranking(&writer, &mut out, &dataset, None)?;
            section_break(&writer, &mut out)?;
            write_focus(&writer, &mut out, &dataset, None, None)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn section_break<W: Write>(writer: &ReportWriter, out: &mut W) -> Result<()> {
    if writer.format() == ReportFormat::Text {
        writeln!(out)?;
    }
    Ok(())
}

fn write_monthly<W: Write>(
    writer: &ReportWriter,
    out: &mut W,
    dataset: &AirQualityDataset,
    year: i32,
    pollutant: Option<String>,
) -> Result<()> {
    let aggregator = Aggregator::new();
    let outcome_pollutant = pick(pollutant, aggregator.pollutants(dataset, Some(year)));

    match outcome_pollutant {
        Some(pollutant) => {
            let outcome = aggregator.monthly_means(dataset, year, &pollutant);
            writer.write_monthly_means(out, year, &pollutant, &outcome)
        }
        None => writer.write_monthly_means(
            out,
            year,
            "any pollutant",
            &QueryOutcome::no_data(format!("No valid measurements in {}", year)),
        ),
    }
}

fn write_ranking<W: Write>(
    writer: &ReportWriter,
    out: &mut W,
    dataset: &AirQualityDataset,
    pollutant: Option<String>,
) -> Result<()> {
    let aggregator = Aggregator::new();

    match pick(pollutant, aggregator.ranking_pollutants(dataset)) {
        Some(pollutant) => {
            let outcome = aggregator.station_ranking(dataset, &pollutant);
            writer.write_station_ranking(out, &pollutant, &outcome)
        }
        None => writer.write_station_ranking(
            out,
            "any pollutant",
            &QueryOutcome::no_data("No measurements matched a known station"),
        ),
    }
}

fn write_focus<W: Write>(
    writer: &ReportWriter,
    out: &mut W,
    dataset: &AirQualityDataset,
    station: Option<String>,
    pollutant: Option<String>,
) -> Result<()> {
    let aggregator = Aggregator::new();

    let Some(station) = pick(station, aggregator.focus_stations(dataset)) else {
        return writer.write_focus(
            out,
            &QueryOutcome::no_data("No measurements matched a known station"),
        );
    };

    match pick(pollutant, aggregator.focus_pollutants(dataset, &station)) {
        Some(pollutant) => {
            let outcome = aggregator.focus(dataset, &station, &pollutant);
            writer.write_focus(out, &outcome)
        }
        None => writer.write_focus(
            out,
            &QueryOutcome::no_data(format!("No measurements for {} in the latest year", station)),
        ),
    }
}
