//! Command-line interface definition for legalchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat, the dataset-preparation batch jobs,
//! and chat-history inspection.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// legalchat - legal assistant chat and fine-tune dataset preparation
///
/// Running without a subcommand starts an interactive chat session.
#[derive(Parser, Debug, Clone)]
#[command(name = "legalchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the SQLite store path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for legalchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Generate fine-tuning data from case summaries
    Prepare {
        /// Prepare subcommand
        #[command(subcommand)]
        command: PrepareCommand,
    },

    /// Inspect stored chat sessions
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Dataset preparation subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PrepareCommand {
    /// Single-turn Q&A pairs per case
    Phase1(GenerateArgs),

    /// One multi-turn conversation per case with per-reply weights
    Phase2(GenerateArgs),

    /// Check that an input file parses, without calling the model
    Validate {
        /// Phase whose default input is checked
        #[arg(long, value_enum, default_value = "phase1")]
        phase: Phase,

        /// Input file (overrides the phase default)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Options shared by the generating phases
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Process only the fixed test record and write to the test outputs
    #[arg(long)]
    pub test: bool,

    /// Input file (JSON array or newline-delimited JSON)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Truncate the output file instead of appending to it
    #[arg(long)]
    pub truncate: bool,
}

/// Dataset-preparation phase
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Single-turn Q&A pairs per case
    Phase1,
    /// Multi-turn conversations with per-message weights
    Phase2,
}

impl PrepareCommand {
    /// The phase this subcommand works on
    pub fn phase(&self) -> Phase {
        match self {
            PrepareCommand::Phase1(_) => Phase::Phase1,
            PrepareCommand::Phase2(_) => Phase::Phase2,
            PrepareCommand::Validate { phase, .. } => *phase,
        }
    }
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List stored sessions
    List,

    /// Print the messages of a session in replay order
    Show {
        /// Session identifier
        id: String,

        /// Emit JSON instead of a transcript
        #[arg(long)]
        json: bool,
    },

    /// Delete every message of a session
    Clear {
        /// Session identifier
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: None,
        }
    }
}
