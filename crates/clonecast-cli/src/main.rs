//! Command-line interface for Clonecast batch voice cloning.
//!
//! # Usage
//!
//! ```bash
//! # Start an inference server hosting XTTS v2, then:
//! clonecast --speaker-wav data/reference/ref_voice.wav --json data/inputs/sentences.json
//!
//! # Custom output directory and default language
//! clonecast --speaker-wav ref.wav --json rows.json --out-dir audio --language fr
//!
//! # Remote GPU server
//! CLONECAST_SERVER=http://gpu-box:8020 clonecast --speaker-wav ref.wav --json rows.json
//! ```
//!
//! Exit status is 0 once every record has been attempted, even if some
//! failed, and 1 when the run cannot start.

mod args;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clonecast_core::{BatchConfig, BatchDriver, BatchReport, HttpModelLoader, Settings};

use args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => {
            tracing::debug!(
                succeeded = report.succeeded,
                total = report.total,
                "Exiting normally"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "Run aborted");
            println!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<BatchReport> {
    let settings = Settings::discover(cli.config.as_deref()).context("Failed to load settings")?;
    let config = BatchConfig::resolve(cli.to_overrides(), settings);

    tracing::info!(
        speaker_wav = %config.speaker_wav.display(),
        json = %config.input_json.display(),
        out_dir = %config.out_dir.display(),
        language = %config.default_language,
        server = %config.server.url,
        "Batch configuration"
    );

    let loader = HttpModelLoader::new(&config.server)?;
    let stdout = io::stdout();
    let mut driver = BatchDriver::new(config, loader, stdout.lock());
    Ok(driver.run()?)
}
