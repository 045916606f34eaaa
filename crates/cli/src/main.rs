//! Synapse CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Run one scenario through the orchestration loop
//! - `tools`    — List the tool catalog
//! - `config`   — Show, locate or validate configuration
//! - `onboard`  — Initialize config

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "synapse",
    about = "Synapse — agentic last-mile coordination",
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
    /// Run a disruption scenario until a final plan or the step limit
    Run {
        /// Scenario text
        #[arg(conflicts_with = "file")]
        scenario: Option<String>,

        /// Read the scenario from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Maximum number of generation steps
        #[arg(long)]
        max_steps: Option<usize>,

        /// Model override for this run
        #[arg(short, long)]
        model: Option<String>,

        /// Replay scripted model outputs from a file instead of calling a backend
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Print the run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available tools and their signatures
    Tools,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Initialize configuration
    Onboard,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (keys redacted)
    Show,
    /// Print the config file path
    Path,
    /// Validate the config file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            file,
            max_steps,
            model,
            replay,
            json,
        } => {
            commands::run::run(commands::run::RunArgs {
                scenario,
                file,
                max_steps,
                model,
                replay,
                json,
            })
            .await?
        }
        Commands::Tools => commands::tools::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
