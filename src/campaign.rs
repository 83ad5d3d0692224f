//! Measurement campaign: the runs of one scaling study, ordered by process count.

use crate::metrics::{ModelFactors, RawMetricSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("campaign contains no runs")]
    Empty,

    #[error("run '{0}' has a process count of zero")]
    ZeroProcesses(String),

    #[error("expected {expected} entries, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// One measured execution at a fixed process count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub processes: u32,
}

impl Run {
    pub fn new(id: impl Into<String>, processes: u32) -> Self {
        Self {
            id: id.into(),
            processes,
        }
    }
}

/// Sort runs by ascending process count and reject empty or invalid lists.
///
/// The sort is stable, so runs sharing a process count keep their input order.
fn order_runs<T>(mut entries: Vec<(Run, T)>) -> Result<Vec<(Run, T)>, CampaignError> {
    if entries.is_empty() {
        return Err(CampaignError::Empty);
    }
    if let Some((run, _)) = entries.iter().find(|(run, _)| run.processes == 0) {
        return Err(CampaignError::ZeroProcesses(run.id.clone()));
    }
    entries.sort_by_key(|(run, _)| run.processes);
    Ok(entries)
}

/// Runs with their raw counters. Index 0 is always the reference run.
#[derive(Debug, Clone)]
pub struct Campaign {
    runs: Vec<Run>,
    raw: Vec<RawMetricSet>,
}

impl Campaign {
    pub fn new(entries: Vec<(Run, RawMetricSet)>) -> Result<Self, CampaignError> {
        let (runs, raw) = order_runs(entries)?.into_iter().unzip();
        Ok(Self { runs, raw })
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn raw(&self) -> &[RawMetricSet] {
        &self.raw
    }

    pub fn reference(&self) -> (&Run, &RawMetricSet) {
        (&self.runs[0], &self.raw[0])
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Run, &RawMetricSet)> {
        self.runs.iter().zip(self.raw.iter())
    }

    /// Attach one factor set per run, in campaign order.
    pub(crate) fn with_factors(&self, factors: Vec<ModelFactors>) -> FactorTable {
        debug_assert_eq!(factors.len(), self.runs.len());
        FactorTable {
            runs: self.runs.clone(),
            factors,
        }
    }
}

/// Model factors of every run, either computed from a campaign or imported.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    runs: Vec<Run>,
    factors: Vec<ModelFactors>,
}

impl FactorTable {
    pub fn new(entries: Vec<(Run, ModelFactors)>) -> Result<Self, CampaignError> {
        let (runs, factors) = order_runs(entries)?.into_iter().unzip();
        Ok(Self { runs, factors })
    }

    /// Pair already-ordered runs with their factors.
    pub fn from_parts(runs: Vec<Run>, factors: Vec<ModelFactors>) -> Result<Self, CampaignError> {
        if runs.len() != factors.len() {
            return Err(CampaignError::LengthMismatch {
                expected: runs.len(),
                got: factors.len(),
            });
        }
        Self::new(runs.into_iter().zip(factors).collect())
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn factors(&self) -> &[ModelFactors] {
        &self.factors
    }

    pub fn reference_processes(&self) -> u32 {
        self.runs[0].processes
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Run, &ModelFactors)> {
        self.runs.iter().zip(self.factors.iter())
    }
}
