//! Projection of model factors to larger process counts
//!
//! Load balance, communication efficiency and computation scalability are
//! fitted independently against the selected model. Parallel and global
//! efficiency are then composed from those curves,
//! `para(x) = load(x) * comm(x) / 100` and `glob(x) = para(x) * comp(x) / 100`,
//! mirroring how the measured factors are defined. Their own independent fits
//! are kept in [`Projection`] for inspection but do not enter the curves.

pub mod model;
pub mod sigma;
pub mod solver;

pub use model::ProjectionModel;
pub use sigma::Sigma;
pub use solver::{curve_fit, Bounds, FitResult, SolveError};

use crate::campaign::FactorTable;
use crate::config::ProjectionConfig;
use crate::metrics::FactorKey;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq)]
pub enum ProjectionError {
    #[error("cannot fit {factor}: {points} valid data point(s), at least {required} required")]
    InsufficientData {
        factor: &'static str,
        points: usize,
        required: usize,
    },

    #[error("curve fit for {factor} did not produce finite parameters")]
    Solver { factor: &'static str },

    #[error("projection limit {limit} must be larger than the smallest process count {reference}")]
    InvalidLimit { limit: u32, reference: u32 },
}

/// Factors that are fitted, in the order their data blocks are emitted.
pub const PROJECTED_FACTORS: [FactorKey; 5] = [
    FactorKey::ParallelEff,
    FactorKey::LoadBalance,
    FactorKey::CommEff,
    FactorKey::CompScale,
    FactorKey::GlobalEff,
];

/// Name of the plotting function of a projected factor.
pub fn function_name(key: FactorKey) -> Option<&'static str> {
    match key {
        FactorKey::ParallelEff => Some("para"),
        FactorKey::LoadBalance => Some("load"),
        FactorKey::CommEff => Some("comm"),
        FactorKey::CompScale => Some("comp"),
        FactorKey::GlobalEff => Some("glob"),
        _ => None,
    }
}

/// Measured points of one factor: process counts, values and their sigma.
/// Runs whose value is missing are dropped together with their sigma.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl Series {
    pub fn from_table(table: &FactorTable, key: FactorKey, sigma: Sigma) -> Self {
        let weights = sigma.weights(table.len());
        let mut series = Series::default();
        for ((run, factors), weight) in table.iter().zip(weights) {
            if let Some(value) = factors.get(key).value() {
                series.xs.push(f64::from(run.processes));
                series.ys.push(value);
                series.sigma.push(weight);
            }
        }
        series
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Fitted curves of a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub model: ProjectionModel,
    pub reference_processes: u32,
    pub limit: u32,
    pub parallel_eff: FitResult,
    pub load_balance: FitResult,
    pub comm_eff: FitResult,
    pub comp_scale: FitResult,
    pub global_eff: FitResult,
}

impl Projection {
    pub fn fit(&self, key: FactorKey) -> Option<&FitResult> {
        match key {
            FactorKey::ParallelEff => Some(&self.parallel_eff),
            FactorKey::LoadBalance => Some(&self.load_balance),
            FactorKey::CommEff => Some(&self.comm_eff),
            FactorKey::CompScale => Some(&self.comp_scale),
            FactorKey::GlobalEff => Some(&self.global_eff),
            _ => None,
        }
    }

    fn curve(&self, fit: &FitResult, x: f64) -> Option<f64> {
        let y = self.model.eval(x, fit.x0, fit.f);
        y.is_finite().then_some(y)
    }

    /// Projected value of `key` at `x` processes.
    ///
    /// Curves are only defined above the smallest measured process count;
    /// `None` is returned at or below it, for non-projected factors, and where
    /// the model itself is undefined.
    pub fn eval(&self, key: FactorKey, x: f64) -> Option<f64> {
        if x <= f64::from(self.reference_processes) {
            return None;
        }
        match key {
            FactorKey::LoadBalance => self.curve(&self.load_balance, x),
            FactorKey::CommEff => self.curve(&self.comm_eff, x),
            FactorKey::CompScale => self.curve(&self.comp_scale, x),
            FactorKey::ParallelEff => {
                let load = self.eval(FactorKey::LoadBalance, x)?;
                let comm = self.eval(FactorKey::CommEff, x)?;
                Some(load * comm / 100.0)
            }
            FactorKey::GlobalEff => {
                let para = self.eval(FactorKey::ParallelEff, x)?;
                let comp = self.eval(FactorKey::CompScale, x)?;
                Some(para * comp / 100.0)
            }
            _ => None,
        }
    }

    /// Gnuplot function definitions of the five projected factors, in
    /// [`PROJECTED_FACTORS`] order.
    pub fn formulas(&self) -> Vec<(FactorKey, String)> {
        vec![
            (
                FactorKey::ParallelEff,
                "para( x ) = load( x ) * comm( x ) / 100".to_string(),
            ),
            (
                FactorKey::LoadBalance,
                self.fitted_formula("load", &self.load_balance),
            ),
            (
                FactorKey::CommEff,
                self.fitted_formula("comm", &self.comm_eff),
            ),
            (
                FactorKey::CompScale,
                self.fitted_formula("comp", &self.comp_scale),
            ),
            (
                FactorKey::GlobalEff,
                "glob( x ) = para( x ) * comp( x ) / 100".to_string(),
            ),
        ]
    }

    fn fitted_formula(&self, name: &str, fit: &FitResult) -> String {
        format!(
            "{}( x ) = ( x > {} ) ? {} : 1/0",
            name,
            self.reference_processes,
            self.model.gnuplot_expr(fit.x0, fit.f)
        )
    }
}

fn fit_factor(
    table: &FactorTable,
    key: FactorKey,
    config: &ProjectionConfig,
) -> Result<FitResult, ProjectionError> {
    let series = Series::from_table(table, key, config.sigma);
    let factor = key.name();
    if series.len() < ProjectionModel::PARAMETERS {
        return Err(ProjectionError::InsufficientData {
            factor,
            points: series.len(),
            required: ProjectionModel::PARAMETERS,
        });
    }

    let bounds = config.bounds.then_some(Bounds::UNIT_FRACTION);
    let initial = config.model.initial_guess(series.ys[0]);
    curve_fit(
        config.model,
        &series.xs,
        &series.ys,
        &series.sigma,
        bounds,
        initial,
    )
    .map_err(|e| match e {
        SolveError::TooFewPoints(points) => ProjectionError::InsufficientData {
            factor,
            points,
            required: ProjectionModel::PARAMETERS,
        },
        SolveError::NonFinite => ProjectionError::Solver { factor },
    })
}

/// Fit all projected factors. Fails as a whole if any single fit fails.
pub fn compute_projection(
    table: &FactorTable,
    config: &ProjectionConfig,
) -> Result<Projection, ProjectionError> {
    let reference = table.reference_processes();
    if config.limit <= reference {
        return Err(ProjectionError::InvalidLimit {
            limit: config.limit,
            reference,
        });
    }

    debug!(
        "Computing projection: model {}, bounds {}, sigma {:?}, limit {}",
        config.model, config.bounds, config.sigma, config.limit
    );

    let projection = Projection {
        model: config.model,
        reference_processes: reference,
        limit: config.limit,
        parallel_eff: fit_factor(table, FactorKey::ParallelEff, config)?,
        load_balance: fit_factor(table, FactorKey::LoadBalance, config)?,
        comm_eff: fit_factor(table, FactorKey::CommEff, config)?,
        comp_scale: fit_factor(table, FactorKey::CompScale, config)?,
        global_eff: fit_factor(table, FactorKey::GlobalEff, config)?,
    };

    info!(
        "Projected parallel efficiency at {} processes: {}",
        config.limit,
        projection
            .eval(FactorKey::ParallelEff, f64::from(config.limit))
            .map_or_else(|| "undefined".to_string(), |v| format!("{:.2}%", v))
    );
    Ok(projection)
}
