//! Special commands parser for interactive chat mode
//!
//! Commands are prefixed with `/` and are case-insensitive. The bare words
//! `exit` and `quit` also end the session. Text that starts with an unknown
//! `/word` followed by more text is a question, e.g. `/s 420 IPC?`.

use std::io::Write;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
///
/// These act on the session rather than being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Delete the stored history of the current session
    Clear,

    /// Print the stored conversation of the current session
    History,

    /// Print the current session id
    Session,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question for the model
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` input and
/// `CommandError::UnsupportedArgument` when a command is given an argument.
///
/// # Examples
///
/// ```
/// use legalchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("  EXIT ").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("/history").unwrap(), SpecialCommand::History);
/// assert_eq!(
///     parse_special_command("what is res judicata?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }

    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    let parsed = match command {
        "/clear" => SpecialCommand::Clear,
        "/history" => SpecialCommand::History,
        "/session" => SpecialCommand::Session,
        "/help" | "/?" => SpecialCommand::Help,
        "/exit" | "/quit" => SpecialCommand::Exit,
        _ if !arg.is_empty() => return Ok(SpecialCommand::None),
        _ => return Err(CommandError::UnknownCommand(trimmed.to_string())),
    };

    if !arg.is_empty() {
        return Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        });
    }

    Ok(parsed)
}

/// Write help for the special commands to `out`
pub fn print_help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        r#"
Special Commands for Interactive Chat
=====================================

SESSION:
  /session        - Show the current session id
  /history        - Show this session's conversation so far
  /clear          - Delete this session's stored history

OTHER:
  /help           - Show this help message
  exit, quit      - Leave the chat (also /exit, Ctrl-D, Ctrl-C)

Anything else is sent to the assistant as a question, including text
that starts with an unknown /word followed by more words.
"#
    )
}
