use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use inv_core::Period;
use tracing_subscriber::EnvFilter;

use inv_cli::commands::{entries, generate};
use inv_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let today = Local::now().date_naive();
    let period = cli.month.unwrap_or_else(|| Period::previous_to(today));
    tracing::debug!(%period, "invoicing period");

    match command {
        Commands::Generate { output } => {
            generate::run(&config, period, today, output.as_deref())?;
        }
        Commands::Entries { json } => {
            entries::run(&config, period, *json)?;
        }
    }

    Ok(())
}
