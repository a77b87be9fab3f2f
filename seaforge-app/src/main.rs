//! Seaweed growth potential of ocean regions.
//!
//! `seaforge run --config run.yaml` loads environmental data, computes the
//! growth factors and growth rate of every region and writes tables, a summary,
//! clusters and plots into a timestamped run directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use seaforge_core::growth::FormulaConstants;
use seaforge_schemas::growth::FormulaVersion;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod clustering;
mod config;
mod plotting;
mod workflow;

#[derive(Parser)]
#[command(name = "seaforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full study described by a YAML file.
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Tabulate and plot the factor response curves.
    Factors {
        #[arg(short, long, default_value = "./data/factors")]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "v2")]
        formula_version: Version,

        /// Only write the CSV table.
        #[arg(long)]
        no_plot: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Version {
    V1,
    V2,
    V3,
}

impl From<Version> for FormulaVersion {
    fn from(version: Version) -> Self {
        match version {
            Version::V1 => FormulaVersion::V1,
            Version::V2 => FormulaVersion::V2,
            Version::V3 => FormulaVersion::V3,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    println!("--- Seaforge ---");

    match cli.command {
        Commands::Run { config } => {
            let run_config = config::RunConfig::load(&config)?;
            let output_dir = workflow::run(&run_config, Some(&config))?;
            println!("\nSeaweed growth run complete. Results are in '{}'", output_dir.display());
        }
        Commands::Factors {
            output_dir,
            formula_version,
            no_plot,
        } => {
            let version = FormulaVersion::from(formula_version);
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
            workflow::write_factor_table(&output_dir, version)?;
            if !no_plot {
                plotting::plot_factor_curves(&output_dir, &FormulaConstants::for_version(version))?;
            }
            println!("Factor curves written to '{}'", output_dir.display());
        }
    }

    Ok(())
}
