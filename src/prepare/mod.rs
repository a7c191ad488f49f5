//! Dataset preparation batch jobs
//!
//! Both phases read case records, ask the model for fine-tune material one
//! record at a time, and write every accepted example to a JSONL file and to
//! the matching store collection. A record whose generation or parsing fails
//! is logged and skipped; input and storage failures stop the job.

pub mod dataset;
pub mod records;
pub mod sink;

use crate::cli::{GenerateArgs, Phase};
use crate::config::{Config, OutputMode};
use crate::error::{LegalchatError, Result};
use crate::prompts::{build_generation_messages, example_system_message};
use crate::providers::Provider;
use crate::storage::SqliteStorage;
use dataset::{parse_conversation, parse_qa_blocks, FineTuneExample};
use indicatif::{ProgressBar, ProgressStyle};
use records::CaseRecord;
use sink::ExampleSink;
use std::path::PathBuf;

/// Fully resolved settings for one job run
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    pub phase: Phase,
    pub test_mode: bool,
    pub input: PathBuf,
    pub output: PathBuf,
    pub collection: String,
    pub output_mode: OutputMode,
    pub test_record_id: String,
    pub qa_pairs: usize,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl JobSettings {
    /// Combine configuration with command-line flags
    ///
    /// `--test` switches both the output file and the collection to their
    /// test variants; `--input` and `--truncate` override the configuration.
    pub fn resolve(config: &Config, phase: Phase, args: &GenerateArgs) -> Self {
        let prepare = &config.prepare;
        let collections = &config.storage.collections;

        let (default_input, output, collection) = match (phase, args.test) {
            (Phase::Phase1, false) => (
                &prepare.phase1_input,
                &prepare.phase1_output,
                &collections.phase1,
            ),
            (Phase::Phase1, true) => (
                &prepare.phase1_input,
                &prepare.phase1_test_output,
                &collections.phase1_test,
            ),
            (Phase::Phase2, false) => (
                &prepare.phase2_input,
                &prepare.phase2_output,
                &collections.phase2,
            ),
            (Phase::Phase2, true) => (
                &prepare.phase2_input,
                &prepare.phase2_test_output,
                &collections.phase2_test,
            ),
        };

        Self {
            phase,
            test_mode: args.test,
            input: args.input.clone().unwrap_or_else(|| default_input.clone()),
            output: output.clone(),
            collection: collection.clone(),
            output_mode: if args.truncate {
                OutputMode::Truncate
            } else {
                prepare.output_mode
            },
            test_record_id: prepare.test_record_id.clone(),
            qa_pairs: prepare.qa_pairs_per_record,
            show_progress: true,
        }
    }
}

/// Outcome counts of a finished job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Records sent to the model
    pub processed: usize,
    /// Lines written (and documents inserted)
    pub written: usize,
    /// Records that produced nothing
    pub skipped: usize,
    /// File the lines went to
    pub output: PathBuf,
    /// Collection the documents went to
    pub collection: String,
}

/// Records a run will process: all of them, or only the test record
pub fn select_records(records: Vec<CaseRecord>, settings: &JobSettings) -> Vec<CaseRecord> {
    if settings.test_mode {
        records
            .into_iter()
            .filter(|r| r.id == settings.test_record_id)
            .collect()
    } else {
        records
    }
}

/// Run one preparation job to completion
///
/// # Errors
///
/// Returns `InputFormat` if the input cannot be loaded, `Io` if the output
/// cannot be written, and `StorageUnavailable` if a mirrored insert fails.
pub async fn run_job(
    provider: &dyn Provider,
    store: &SqliteStorage,
    settings: &JobSettings,
) -> Result<JobSummary> {
    let records = select_records(records::load_records(&settings.input)?, settings);

    if settings.test_mode && records.is_empty() {
        tracing::warn!(
            "Test record {} not found in {}",
            settings.test_record_id,
            settings.input.display()
        );
    }

    tracing::info!(
        "Generating {:?} data for {} records into {} ({:?}) with {}",
        settings.phase,
        records.len(),
        settings.output.display(),
        settings.output_mode,
        provider.model_name()
    );

    let mut sink = ExampleSink::open(
        &settings.output,
        settings.output_mode,
        store,
        &settings.collection,
    )?;

    let progress = progress_bar(records.len() as u64, settings);
    let mut summary = JobSummary::default();

    for record in &records {
        progress.set_message(record.id.clone());
        summary.processed += 1;

        let examples = match generate_examples(provider, record, settings).await {
            Ok(examples) => examples,
            Err(e) => match LegalchatError::kind_of(&e) {
                Some(LegalchatError::GenerationFailed(_)) => {
                    tracing::warn!("Skipping {}: {:#}", record.id, e);
                    Vec::new()
                }
                _ => {
                    progress.abandon();
                    return Err(e);
                }
            },
        };

        if examples.is_empty() {
            summary.skipped += 1;
        }

        for example in &examples {
            if let Err(e) = sink.write(example) {
                progress.abandon();
                return Err(e);
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    summary.written = sink.written();
    summary.output = sink.path().to_path_buf();
    summary.collection = sink.collection().to_string();

    tracing::info!(
        "Finished {:?}: {} processed, {} lines written, {} skipped",
        settings.phase,
        summary.processed,
        summary.written,
        summary.skipped
    );

    Ok(summary)
}

/// Ask the model about one record and turn the reply into examples
async fn generate_examples(
    provider: &dyn Provider,
    record: &CaseRecord,
    settings: &JobSettings,
) -> Result<Vec<FineTuneExample>> {
    let messages = build_generation_messages(settings.phase, record, settings.qa_pairs);
    let reply = provider.complete(&messages).await?.content;

    tracing::debug!("Raw model output for {}:\n{}", record.id, reply);

    let system = example_system_message(settings.phase);
    let examples = match settings.phase {
        Phase::Phase1 => parse_qa_blocks(&reply)?
            .into_iter()
            .map(|block| FineTuneExample::with_system(system, block))
            .collect(),
        Phase::Phase2 => vec![FineTuneExample::with_system(
            system,
            parse_conversation(&reply)?,
        )],
    };

    Ok(examples)
}

fn progress_bar(len: u64, settings: &JobSettings) -> ProgressBar {
    if !settings.show_progress {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("=> "));
    bar.set_prefix(match settings.phase {
        Phase::Phase1 => "Generating fine-tune QA pairs",
        Phase::Phase2 => "Generating reasoning conversations",
    });
    bar
}
