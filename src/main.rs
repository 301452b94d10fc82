use anyhow::Context;
use clap::Parser;
use milan_air_quality::cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref()).context("Failed to set up logging")?;
    run(cli).context("Air quality report failed")?;
    Ok(())
}
