//! legalchat - Legal assistant chat and fine-tune dataset preparation
//!
#![doc = "Main entry point for the legalchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use legalchat::cli::{Cli, Commands};
use legalchat::commands;
use legalchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials usually come from a local .env file
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Prepare { command } => {
            tracing::info!("Starting prepare command for {:?}", command.phase());
            commands::prepare::run_prepare(config, command).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so chat output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "legalchat=debug"
    } else {
        "legalchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
