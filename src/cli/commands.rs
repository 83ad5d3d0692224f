//! CLI command implementations

use super::{AnalysisArgs, YesNo};
use anyhow::{Context, Result};
use modelfactors_rs::acquisition::{gather, Manifest};
use modelfactors_rs::config::Config;
use modelfactors_rs::export::{read_csv, write_csv, write_script};
use modelfactors_rs::report::{
    render_factor_table, render_overview, render_projection_summary, render_raw_table,
};
use modelfactors_rs::{classify, compute_model_factors, compute_projection, FactorTable};
use modelfactors_rs::ScalingChoice;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

fn banner(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Build the effective configuration: file values first, then CLI flags.
fn load_config(args: &AnalysisArgs, debug: bool) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(limit) = args.limit {
        config.projection.limit = limit;
    }
    if let Some(model) = args.model {
        config.projection.model = model;
    }
    if let Some(bounds) = args.bounds {
        config.projection.bounds = matches!(bounds, YesNo::Yes);
    }
    if let Some(sigma) = args.sigma {
        config.projection.sigma = sigma;
    }
    config.debug |= debug;
    config.validate()?;

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn prepare_output_dir(config: &Config) -> Result<()> {
    let dir = Path::new(&config.paths.output_dir);
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))
}

/// Fit, summarize and write the gnuplot script. Earlier outputs are already
/// on disk when this runs, so a failure here only loses the projection.
fn run_projection(table: &FactorTable, config: &Config) -> Result<()> {
    let projection = match compute_projection(table, &config.projection) {
        Ok(projection) => projection,
        Err(e) => {
            error!("Projection failed: {}", e);
            return Err(e).context("projection step failed");
        }
    };

    let largest = table.runs().last().map_or(1, |r| r.processes);
    let checkpoints = [largest.saturating_mul(2), config.projection.limit];
    println!("{}", render_projection_summary(&projection, &checkpoints));

    let template = config.paths.gnuplot_template.as_ref().map(PathBuf::from);
    write_script(
        config.paths.gnuplot_file(),
        template.as_deref(),
        &projection,
        table,
    )
}

pub fn analyze(
    manifest_path: PathBuf,
    scaling: Option<ScalingChoice>,
    args: AnalysisArgs,
    debug: bool,
) -> Result<()> {
    let mut config = load_config(&args, debug)?;
    if let Some(scaling) = scaling {
        config.scaling = scaling;
    }

    banner("Model Factor Analysis");

    let manifest = Manifest::load(&manifest_path)?;
    let campaign = gather(manifest.runs(), &manifest.source())
        .context("no valid runs to analyze")?;
    println!("{}", render_overview(&campaign));
    println!("{}", render_raw_table(&campaign));

    let mode = classify(&campaign, config.scaling);
    info!("Computing model factors for {} scaling.", mode);
    let table = compute_model_factors(&campaign, mode);
    println!("{}", render_factor_table(&table));

    prepare_output_dir(&config)?;
    write_csv(config.paths.csv_file(), &table, campaign.raw())?;

    run_projection(&table, &config)
}

pub fn project(csv_path: PathBuf, args: AnalysisArgs, debug: bool) -> Result<()> {
    let config = load_config(&args, debug)?;

    banner("Model Factor Projection");

    let table = read_csv(&csv_path)
        .with_context(|| format!("{} is not a valid model factor file", csv_path.display()))?;
    if config.debug {
        println!("{}", render_factor_table(&table));
    }

    prepare_output_dir(&config)?;
    run_projection(&table, &config)
}
