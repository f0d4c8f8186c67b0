//! # ISS Observer Application Entry Point
//!
//! This binary crate coordinates configuration, data fetching, phase
//! evaluation and report output. It runs once and exits.
//!
//! Exit status is zero when a report was printed and non-zero when
//! configuration, fetching, or evaluation failed.

#[cfg(test)]
mod tests;

use anyhow::Context;
use clap::Parser;
use iss_observer_lib::config::Config;
use iss_observer_lib::fetch::ServiceClient;
use iss_observer_lib::phase::ClassificationMode;
use iss_observer_lib::{iss_data, logger, renderer, sun_data, IssFix, SolarDays};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "iss-observer")]
#[command(about = "Report whether the ISS is over day or night and whether it is worth looking up")]
struct Args {
    /// Config file; without it ./iss-observer.toml is used when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Phase classification mode: single-day, midpoint or three-day
    #[arg(long)]
    mode: Option<ClassificationMode>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load(),
        };
        if let Some(mode) = self.mode {
            config.observation.mode = mode;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Fetch the ISS fix, then the sunrise/sunset days around it.
async fn fetch(config: &Config, mode: ClassificationMode) -> anyhow::Result<(IssFix, SolarDays)> {
    let services = &config.services;
    let client = ServiceClient::new(services)?;

    let fix = iss_data::fetch(&client, &services.iss_url)
        .await
        .context("cannot fetch ISS position")?;

    let days = sun_data::fetch_days(
        &client,
        &services.sun_url,
        &fix.position,
        fix.observed_at,
        mode,
    )
    .await
    .context("cannot fetch sunrise/sunset times")?;

    Ok((fix, days))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.load_config().context("invalid configuration")?;
    let evaluator = config.evaluator()?;
    tracing::debug!("Config: {:?}", config);

    // Create Tokio runtime for the concurrent fetches
    let rt = tokio::runtime::Runtime::new()?;

    tracing::info!("Fetching data...");
    let (fix, days) = rt.block_on(fetch(&config, evaluator.mode()))?;

    let result = evaluator
        .evaluate(fix.observed_at, &days)
        .with_context(|| {
            format!("cannot classify {} in {} mode", fix.observed_at, evaluator.mode())
        })?;

    if args.json {
        println!("{}", renderer::render_json(&fix, &result, evaluator.mode())?);
    } else {
        renderer::draw_ascii(&fix, &result, &config.display);
    }

    Ok(())
}

/// Log a failed run once and map it to the process exit status.
fn exit_status(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application entry point.
fn main() -> ExitCode {
    let args = Args::parse();
    logger::init_logger(args.verbose);

    exit_status(run(&args))
}
