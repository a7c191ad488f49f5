/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`     - Interactive legal assistant session
- `prepare`  - Fine-tune dataset generation and input checks
- `history`  - Stored chat session inspection
*/

use crate::config::Config;
use crate::error::{LegalchatError, Result};
use crate::providers::create_provider;
use crate::responder::Responder;
use crate::storage::{MessageStore, SqliteStorage};
use std::sync::Arc;

// Special commands parser for in-session commands
pub mod special_commands;

// History inspection commands
pub mod history;

// Dataset preparation commands
pub mod prepare;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates a fresh session, then reads lines until the user exits. Each
    //! question goes through the [`Responder`], which replays the session's
    //! stored history and persists the new exchange.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::io::Write;

    /// What the loop should do after handling one line
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LoopAction {
        Continue,
        Exit,
    }

    /// One chat session bound to a responder
    pub struct ChatSession {
        responder: Responder,
        session_id: String,
    }

    impl ChatSession {
        /// Start a session with a freshly generated id
        pub fn new(responder: Responder) -> Self {
            Self::with_id(responder, uuid::Uuid::new_v4().to_string())
        }

        /// Start a session with a known id
        pub fn with_id(responder: Responder, session_id: impl Into<String>) -> Self {
            Self {
                responder,
                session_id: session_id.into(),
            }
        }

        pub fn id(&self) -> &str {
            &self.session_id
        }

        /// Handle one line of user input, writing any output to `out`
        ///
        /// Turn failures caused by the model or the store are reported to
        /// `out` and the session continues.
        ///
        /// # Errors
        ///
        /// Returns errors that are not recoverable within a turn, and I/O
        /// errors from writing to `out`.
        pub async fn handle_input<W: Write>(&self, input: &str, out: &mut W) -> Result<LoopAction> {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                return Ok(LoopAction::Continue);
            }

            let command = match parse_special_command(trimmed) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "{}\n", e.to_string().yellow())?;
                    return Ok(LoopAction::Continue);
                }
            };

            let outcome = match command {
                SpecialCommand::Exit => return Ok(LoopAction::Exit),
                SpecialCommand::Help => {
                    print_help(out)?;
                    Ok(())
                }
                SpecialCommand::Session => {
                    writeln!(out, "Session ID: {}\n", self.session_id.cyan())?;
                    Ok(())
                }
                SpecialCommand::History => self.write_history(out),
                SpecialCommand::Clear => self.clear_history(out),
                SpecialCommand::None => self.ask(trimmed, out).await,
            };

            match outcome {
                Ok(()) => Ok(LoopAction::Continue),
                Err(e) => match LegalchatError::kind_of(&e) {
                    Some(kind) if kind.is_turn_recoverable() => {
                        tracing::warn!("Turn failed in session {}: {:#}", self.session_id, e);
                        writeln!(out, "{}\n", format!("Error: {}", e).red())?;
                        Ok(LoopAction::Continue)
                    }
                    _ => Err(e),
                },
            }
        }

        async fn ask<W: Write>(&self, question: &str, out: &mut W) -> Result<()> {
            let reply = self.responder.respond(&self.session_id, question).await?;
            writeln!(out, "{} {}\n", "Bot:".green().bold(), reply)?;
            Ok(())
        }

        fn write_history<W: Write>(&self, out: &mut W) -> Result<()> {
            let messages = self.responder.store().replay(&self.session_id)?;
            if messages.is_empty() {
                writeln!(out, "{}\n", "No messages in this session yet.".yellow())?;
                return Ok(());
            }
            for stored in &messages {
                writeln!(out, "{}", history::format_transcript_line(stored))?;
            }
            writeln!(out)?;
            Ok(())
        }

        fn clear_history<W: Write>(&self, out: &mut W) -> Result<()> {
            self.responder.store().clear(&self.session_id)?;
            writeln!(out, "{}\n", "Session history cleared.".green())?;
            Ok(())
        }
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the store or provider cannot be created, or if a
    /// non-recoverable error occurs during the session.
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let store: Arc<dyn MessageStore> = Arc::new(SqliteStorage::from_config(&config.storage)?);
        let provider = create_provider(&config.provider)?;
        tracing::info!("Answering with {}", provider.model_name());
        let responder = Responder::new(provider, store, config.chat.system_prompt);
        let session = ChatSession::new(responder);

        tracing::info!("Chat session {} started", session.id());

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(session.id());

        let mut stdout = std::io::stdout();
        loop {
            match rl.readline("You: ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.trim())?;
                    }
                    if session.handle_input(&line, &mut stdout).await? == LoopAction::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(session_id: &str) {
        println!("\n[🧾 Legal Chat Session ID: {}]", session_id.cyan());
        println!("Type 'exit' to quit, '/help' for commands.\n");
    }

}
