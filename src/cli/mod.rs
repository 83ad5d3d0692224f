pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use modelfactors_rs::projection::{ProjectionModel, Sigma};
use modelfactors_rs::ScalingChoice;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modelfactors")]
#[command(about = "Generates performance model factors from a set of runs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase output verbosity to debug level
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

/// Options shared by every command; unset values fall back to the config file.
#[derive(Args)]
pub struct AnalysisArgs {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory for modelfactors.csv and modelfactors.gp
    #[arg(long)]
    pub output_dir: Option<String>,
    /// Limit number of processes for the projection (default: 10000)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Model for the projection (default: amdahl)
    #[arg(long, value_enum)]
    pub model: Option<ProjectionModel>,
    /// Bound the model fraction to [0, 1] (default: yes)
    #[arg(long, value_enum)]
    pub bounds: Option<YesNo>,
    /// Error weights for the projection (default: first). first: prioritize
    /// smallest run; equal: no priority; decrease: decreasing priority for
    /// larger runs
    #[arg(long, value_enum)]
    pub sigma: Option<Sigma>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute model factors and the projection from a campaign manifest
    Analyze {
        /// JSON manifest listing the runs and their raw counters
        manifest: PathBuf,
        /// Weak or strong scaling (default: auto)
        #[arg(short, long, value_enum)]
        scaling: Option<ScalingChoice>,
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Run only the projection for an existing modelfactors.csv
    Project {
        /// Path to modelfactors.csv
        csv: PathBuf,
        #[command(flatten)]
        args: AnalysisArgs,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            manifest,
            scaling,
            args,
        } => commands::analyze(manifest, scaling, args, cli.debug),
        Commands::Project { csv, args } => commands::project(csv, args, cli.debug),
    }
}
