//! # tictac
//!
//! CLI tool for exercising the tic-tac-toe match protocol.
//!
//! ## Commands
//!
//! - `demo`: Play a scripted game between two sessions on an in-process relay
//! - `decode`: Decode a board payload
//!
//! ## Example
//!
//! ```bash
//! # Play the default (drawn) game
//! tictac demo
//!
//! # Play a custom script in a custom room
//! tictac demo --room friday_night --moves 0,3,1,4,2
//!
//! # Inspect a payload
//! tictac decode '[null,null,null,null,"X",null,null,null,null]'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{decode, demo};
use config::CliConfig;

/// CLI tool for exercising the tic-tac-toe match protocol.
#[derive(Parser, Debug)]
#[command(name = "tictac")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: tictac.toml, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a scripted game between two sessions on an in-process relay
    Demo {
        /// Room to race for (overrides the config file)
        #[arg(long)]
        room: Option<String>,

        /// Comma-separated cells (0-8), played alternately starting with X
        #[arg(long, value_delimiter = ',')]
        moves: Option<Vec<usize>>,
    },

    /// Decode a board payload and print it
    Decode {
        /// JSON array of nine cells
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.log_filter);

    match cli.command {
        Commands::Demo { room, moves } => {
            let moves = moves.unwrap_or_else(|| demo::DEFAULT_MOVES.to_vec());
            let summary = demo::run(&config, room.as_deref(), &moves).await?;
            println!();
            match summary.outcome {
                Some(outcome) => println!("Result: {}", outcome),
                None => println!("Result: unfinished"),
            }
        }
        Commands::Decode { payload } => {
            decode::run(&payload)?;
        }
    }

    Ok(())
}

/// Install the log subscriber. `RUST_LOG` wins over the config file.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
