//! Dragon cli definition and entrypoint.
mod ask;
mod chat;
mod serve;
pub mod ux;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dragon_core::config::get_config;
use dragon_core::mode::Mode;

use crate::log::{setup_logging, setup_server_logging};

/// Dragon AI - a study assistant for students.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay server.
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Chat with Dragon AI.
    Chat {
        /// Task mode for messages (summarize, paraphrase, essay, study,
        /// outline, quiz, flashcards, improve, research).
        #[arg(short, long, conflicts_with = "raw")]
        mode: Option<Mode>,
        /// Send messages without a task mode.
        #[arg(long)]
        raw: bool,
        /// Send the prior transcript with every message.
        #[arg(long)]
        memory: bool,
        /// Call the completion provider in-process instead of the relay.
        #[arg(long)]
        embedded: bool,
        /// Relay endpoint to talk to.
        #[arg(long)]
        relay_url: Option<String>,
    },
    /// Ask a single question and print the reply.
    Ask {
        /// Text to send.
        input: Vec<String>,
        /// Task mode for the text.
        #[arg(short, long)]
        mode: Option<Mode>,
    },
}

/// Runs the main CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Serve { .. }) {
        setup_server_logging(cli.verbose).context("Failed to set up logging")?;
    } else if cli.verbose {
        setup_logging().context("Failed to set up logging")?;
    }

    let config = get_config(cli.config.clone()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { bind } => serve::execute(bind, &config).await,
        Commands::Chat {
            mode,
            raw,
            memory,
            embedded,
            relay_url,
        } => {
            let options = chat::ChatOptions {
                mode: if raw {
                    None
                } else {
                    mode.or(config.client.mode)
                },
                memory: memory || config.client.memory,
                embedded,
                relay_url: relay_url.unwrap_or_else(|| config.client.relay_url.clone()),
            };
            chat::execute(options, &config).await
        }
        Commands::Ask { input, mode } => ask::execute(input, mode, &config).await,
    }
}
