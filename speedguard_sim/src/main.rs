// speedguard_sim/src/main.rs

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use speedguard_sim::cli::Cli;
use speedguard_sim::prelude::*;
use speedguard_sim::DEFAULT_LOG_FILTER;

/// Exit code when location access is unavailable.
const EXIT_SENSOR_UNAVAILABLE: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("could not use scenario {}", cli.scenario.display()))?;
    cli.apply_overrides(&mut scenario);

    if cli.print_config {
        println!("{}", toml::to_string_pretty(&scenario)?);
        return Ok(ExitCode::SUCCESS);
    }

    let options = RunOptions {
        quiet: cli.quiet,
        render: true,
        color: std::io::stdout().is_terminal(),
    };

    match run_scenario(&scenario, options).await {
        Ok(summary) => {
            println!(
                "{} samples shown, {} dropped, {} alerts",
                summary.samples_processed, summary.samples_rejected, summary.alerts_fired
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(SessionError::Sensor(e)) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(EXIT_SENSOR_UNAVAILABLE))
        }
        Err(e) => Err(e.into()),
    }
}
