//! # Courier Runner
//!
//! Command-line entry point. `run` plays random-policy episodes against the
//! kinematic arena; `print-config` emits a preset as JSON to start a new
//! variant from.

use anyhow::Result;
use clap::{Parser, Subcommand};
use courier::app::{self, Preset, RunConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Courier: episodic find-and-deliver task engine
#[derive(Parser)]
#[command(name = "courier", version, about)]
struct Cli {
    /// Preset used when no configuration file is given.
    #[arg(long, global = true, value_enum, default_value_t = Preset::Warehouse)]
    preset: Preset,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play episodes with a uniform random policy and summarise them.
    Run {
        /// JSON run configuration; overrides `--preset`.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Seed of the first episode.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Print the selected preset as JSON.
    PrintConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config, episodes, seed } => {
            let config = match config {
                Some(path) => RunConfig::load(&path)?,
                None => RunConfig::from_preset(cli.preset),
            };
            let summary = app::run(config, episodes, seed)?;
            for (cause, count) in &summary.causes {
                println!("{cause:>22}: {count}");
            }
            println!("{:>22}: {:.3}", "mean reward", summary.mean_reward);
        }
        Commands::PrintConfig => {
            println!("{}", RunConfig::from_preset(cli.preset).to_json()?);
        }
    }
    Ok(())
}
