//! Deskmate CLI — the main entry point.
//!
//! Commands:
//! - `chat`      — Interactive session (proactive briefing + chat loop)
//! - `brief`     — Run the session-start audit once and print the briefing
//! - `add-event` — Push an event to the calendar
//! - `config`    — Show or scaffold the config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "deskmate",
    about = "Deskmate — proactive personal assistant engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Run the proactive audit once and print the briefing
    Brief,

    /// Add a calendar event
    AddEvent {
        /// Event title
        title: String,

        /// Start time, ISO-8601 (e.g. 2026-03-12T15:00:00Z)
        start: String,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Brief => commands::brief::run().await?,
        Commands::AddEvent { title, start } => commands::calendar::run(&title, &start).await?,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config_cmd::path()?,
            ConfigAction::Init => commands::config_cmd::init()?,
        },
    }

    Ok(())
}
