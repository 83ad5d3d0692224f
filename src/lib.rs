//! Model factors for parallel performance analysis
//!
//! This crate turns raw per-run performance counters of a scaling study into
//! the hierarchical efficiency model (parallel efficiency, load balance,
//! communication efficiency, computation scalability, ...) and projects the
//! main factors to larger process counts by curve fitting.
//!
//! ## Main Components
//!
//! - `metrics`: raw counters, model factors and the missing-aware `Metric`
//! - `campaign`: runs ordered by process count
//! - `scaling`: weak/strong scaling detection
//! - `engine`: model factor computation
//! - `projection`: curve fitting and composed projections
//! - `acquisition`: parallel counter acquisition
//! - `export`: csv and gnuplot output
//! - `report`: terminal tables
//! - `config`: configuration management

pub mod acquisition;
pub mod campaign;
pub mod config;
pub mod engine;
pub mod export;
pub mod metrics;
pub mod projection;
pub mod report;
pub mod scaling;

pub use campaign::{Campaign, CampaignError, FactorTable, Run};
pub use config::Config;
pub use engine::compute_model_factors;
pub use metrics::{FactorKey, Metric, ModelFactors, RawKey, RawMetricSet};
pub use projection::{compute_projection, Projection, ProjectionError};
pub use scaling::{classify, ScalingChoice, ScalingMode};

/// Library errors
pub use anyhow::{Error, Result};
