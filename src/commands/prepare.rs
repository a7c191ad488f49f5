//! Dataset preparation command handler

use crate::cli::{Phase, PrepareCommand};
use crate::config::Config;
use crate::error::Result;
use crate::prepare::records::load_records;
use crate::prepare::{run_job, JobSettings, JobSummary};
use crate::providers::create_provider;
use crate::storage::SqliteStorage;
use colored::Colorize;
use std::path::PathBuf;

/// Run a `prepare` subcommand
///
/// # Errors
///
/// Returns error if the input is malformed, the provider cannot be built,
/// or the output file or store cannot be written.
pub async fn run_prepare(config: Config, command: PrepareCommand) -> Result<()> {
    match command {
        PrepareCommand::Validate { phase, input } => {
            let path = input.unwrap_or_else(|| default_input(&config, phase));
            validate_input(&path)?;
            Ok(())
        }
        PrepareCommand::Phase1(args) => generate(&config, Phase::Phase1, &args).await,
        PrepareCommand::Phase2(args) => generate(&config, Phase::Phase2, &args).await,
    }
}

async fn generate(config: &Config, phase: Phase, args: &crate::cli::GenerateArgs) -> Result<()> {
    let settings = JobSettings::resolve(config, phase, args);
    if settings.test_mode {
        tracing::info!("Test mode: only {} is processed", settings.test_record_id);
    }

    let store = SqliteStorage::from_config(&config.storage)?;
    let provider = create_provider(&config.provider)?;

    let summary = run_job(provider.as_ref(), &store, &settings).await?;
    print_summary(&summary);
    Ok(())
}

fn default_input(config: &Config, phase: Phase) -> PathBuf {
    match phase {
        Phase::Phase1 => config.prepare.phase1_input.clone(),
        Phase::Phase2 => config.prepare.phase2_input.clone(),
    }
}

/// Load an input file and report how many records it holds
pub fn validate_input(path: &std::path::Path) -> Result<usize> {
    match load_records(path) {
        Ok(records) => {
            println!(
                "{}",
                format!(
                    "Successfully loaded {} with {} records.",
                    path.display(),
                    records.len()
                )
                .green()
            );
            Ok(records.len())
        }
        Err(e) => {
            eprintln!("{}", format!("Failed to load {}:", path.display()).red());
            eprintln!("  {}", e);
            Err(e)
        }
    }
}

fn print_summary(summary: &JobSummary) {
    println!(
        "{} Saved to {} and inserted into collection '{}'",
        "Done.".green().bold(),
        summary.output.display(),
        summary.collection
    );
    println!(
        "  {} records processed, {} lines written, {} records skipped",
        summary.processed, summary.written, summary.skipped
    );
}
