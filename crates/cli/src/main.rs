//! Pitwall CLI
//!
//! A command-line tool for training lap-time models, requesting
//! predictions and pit-strategy advice from a pitwall server.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, status, train};

/// Pitwall lap-time prediction CLI
#[derive(Parser)]
#[command(name = "pitwall")]
#[command(author, version, about = "CLI for the Pitwall prediction service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PITWALL_API_URL env var)
    #[arg(long, env = "PITWALL_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model from one session of archived telemetry
    Train {
        /// Championship year
        year: u16,

        /// Race name (e.g. "Monza", "British Grand Prix")
        race: String,

        /// Session name
        #[arg(long, default_value = "Race")]
        session: String,
    },

    /// Predict a lap time for one lap observation
    Predict {
        /// Path to a JSON file holding the lap observation
        #[arg(long, short)]
        input: String,
    },

    /// Request pit-strategy advice for a race situation
    Strategy {
        /// Path to a JSON file holding the race situation
        #[arg(long, short)]
        input: String,
    },

    /// Show server and model status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Train {
            year,
            race,
            session,
        } => {
            train::run_training(&client, year, &race, &session, cli.format).await?;
        }
        Commands::Predict { input } => {
            predict::predict_lap_time(&client, &input, cli.format).await?;
        }
        Commands::Strategy { input } => {
            predict::request_strategy(&client, &input, cli.format).await?;
        }
        Commands::Status => {
            status::show_status(&client, cli.format).await?;
        }
    }

    Ok(())
}
