use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use crate::providers::Role;
use crate::storage::{MessageStore, SqliteStorage, StoredMessage};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let storage = SqliteStorage::from_config(&config.storage)?;

    match command {
        HistoryCommand::List => {
            let sessions = storage.list_sessions()?;

            if sessions.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "Session ID".bold(),
                "Messages".bold(),
                "Started".bold(),
                "Last Active".bold()
            ]);

            for session in sessions {
                let started = session.started_at().format("%Y-%m-%d %H:%M").to_string();
                let updated = session.last_active().format("%Y-%m-%d %H:%M").to_string();

                table.add_row(prettytable::row![
                    session.session_id.cyan(),
                    session.message_count,
                    started,
                    updated
                ]);
            }

            println!("\nChat Sessions ({}):", storage.db_path().display());
            table.printstd();
            println!();
            println!(
                "Use {} to print a conversation.",
                "legalchat history show <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id, json } => {
            let messages = storage.replay(&id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
                return Ok(());
            }

            if messages.is_empty() {
                println!("{}", format!("No messages stored for session {}", id).yellow());
                return Ok(());
            }

            println!("\nSession {}:\n", id.cyan());
            for stored in &messages {
                println!("{}", format_transcript_line(stored));
            }
            println!();
        }
        HistoryCommand::Clear { id } => {
            // Idempotent: clearing an unknown session is not an error.
            storage.clear(&id)?;
            println!("{}", format!("Cleared session {}", id).green());
        }
    }

    Ok(())
}

/// One transcript line: `[time] Speaker: content`
pub fn format_transcript_line(stored: &StoredMessage) -> String {
    let speaker = match stored.message.role() {
        Role::Human => "You:".bold(),
        Role::Assistant => "Bot:".green().bold(),
        Role::System => "System:".dimmed(),
    };
    format!(
        "[{}] {} {}",
        stored.recorded_at().format("%H:%M:%S"),
        speaker,
        stored.message.content()
    )
}
