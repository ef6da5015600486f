//! Herd CLI
//!
//! A command-line tool for training the herd models from historical CSV
//! tables, running one-off predictions against the local model directory,
//! and inspecting which models are loaded.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{models, predict, train};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Herd CLI
#[derive(Parser)]
#[command(name = "herd")]
#[command(author, version, about = "Dairy herd yield and mastitis risk engine", long_about = None)]
pub struct Cli {
    /// Model directory (can also be set via HERD_MODEL_DIR env var)
    #[arg(long, env = "HERD_MODEL_DIR", default_value = "models", global = true)]
    pub model_dir: PathBuf,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train both models from historical CSV tables
    Train {
        /// Milk yield table (Feed_kg, Temp_C, Humidity, Milking_Time_min, Milk_Liters)
        #[arg(long)]
        yield_data: PathBuf,

        /// Mastitis table (udder sensors, Temperature, class1, ...)
        #[arg(long)]
        disease_data: PathBuf,
    },

    /// Run a single prediction
    #[command(subcommand)]
    Predict(PredictCommands),

    /// Show the state of each model
    Models,
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Predict daily milk yield in liters
    Yield {
        #[arg(long)]
        feed_kg: f64,

        #[arg(long, allow_negative_numbers = true)]
        temperature_c: f64,

        /// Relative humidity, 0-100
        #[arg(long)]
        humidity_pct: f64,

        #[arg(long)]
        milking_time_min: f64,
    },

    /// Assess mastitis risk for one cow
    Disease(predict::DiseaseArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train {
            yield_data,
            disease_data,
        } => {
            train::run(&yield_data, &disease_data, &cli.model_dir, cli.format)?;
        }
        Commands::Predict(predict_cmd) => match predict_cmd {
            PredictCommands::Yield {
                feed_kg,
                temperature_c,
                humidity_pct,
                milking_time_min,
            } => {
                let obs = herd_lib::YieldObservation {
                    feed_kg,
                    temperature_c,
                    humidity_pct,
                    milking_time_min,
                };
                predict::predict_yield(&cli.model_dir, &obs, cli.format)?;
            }
            PredictCommands::Disease(args) => {
                predict::predict_disease(&cli.model_dir, &args.into_observation(), cli.format)?;
            }
        },
        Commands::Models => {
            models::show_models(&cli.model_dir, cli.format)?;
        }
    }

    Ok(())
}
