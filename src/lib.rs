//! legalchat - Legal assistant chat and fine-tune dataset preparation
//!
//! This library provides a history-backed chat assistant for questions about
//! Indian Supreme Court judgments and two batch jobs that turn case summaries
//! into fine-tuning data.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Session-scoped chat history and fine-tune collections (SQLite)
//! - `providers`: Chat model abstraction and the Azure OpenAI implementation
//! - `responder`: One chat turn with history replay and persistence
//! - `prepare`: Phase-1 and phase-2 dataset generation
//! - `prompts`: Generation prompts for the dataset phases
//! - `commands`: CLI command handlers (chat loop, prepare, history)
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use legalchat::providers::create_provider;
//! use legalchat::storage::SqliteStorage;
//! use legalchat::{Config, Responder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = Arc::new(SqliteStorage::from_config(&config.storage)?);
//!     let provider = create_provider(&config.provider)?;
//!     let responder = Responder::new(provider, store, config.chat.system_prompt.clone());
//!
//!     let reply = responder.respond("session-1", "What is res judicata?").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prepare;
pub mod prompts;
pub mod providers;
pub mod responder;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{LegalchatError, Result};
pub use providers::Message;
pub use responder::Responder;
pub use storage::{MessageStore, SqliteStorage};

#[cfg(test)]
pub mod test_utils;
