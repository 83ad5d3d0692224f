//! Model factor computation
//!
//! Each run's factors are a pure function of its own raw counters, the
//! reference run's raw counters, both process counts and the campaign's
//! scaling mode. Factors are computed in dependency order; any missing input
//! or zero denominator leaves only the affected factors missing.

use crate::campaign::{Campaign, FactorTable};
use crate::metrics::{Metric, ModelFactors, RawMetricSet};
use crate::scaling::ScalingMode;
use tracing::debug;

/// Reference-run quantities shared by every run of a campaign.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    pub processes: u32,
    pub raw: &'a RawMetricSet,
}

impl<'a> Reference<'a> {
    fn ipc(&self) -> Metric {
        ipc(self.raw)
    }

    fn freq(&self) -> Metric {
        freq(self.raw)
    }
}

fn ipc(raw: &RawMetricSet) -> Metric {
    raw.useful_instructions.div(raw.useful_cycles)
}

/// Average frequency in GHz; useful time is in microseconds.
fn freq(raw: &RawMetricSet) -> Metric {
    raw.useful_cycles.div(raw.useful_total).scale(1.0 / 1000.0)
}

/// Apply the weak-scaling correction to a reference/run ratio.
fn scaled_ratio(ratio: Metric, proc_ratio: f64, mode: ScalingMode) -> Metric {
    match mode {
        ScalingMode::Strong => ratio,
        ScalingMode::Weak => ratio.scale(proc_ratio),
    }
}

/// Compute the thirteen model factors of a single run.
pub fn compute_factors(
    raw: &RawMetricSet,
    processes: u32,
    reference: Reference<'_>,
    mode: ScalingMode,
) -> ModelFactors {
    let proc_ratio = f64::from(processes) / f64::from(reference.processes);

    let load_balance = raw.useful_avg.div(raw.useful_max).scale(100.0);
    let comm_eff = raw.useful_max.div(raw.runtime).scale(100.0);
    let serial_eff = raw.useful_ideal_max.div(raw.runtime_ideal).scale(100.0);
    let transfer_eff = comm_eff.div(serial_eff).scale(100.0);
    let parallel_eff = load_balance.mul(comm_eff).scale(1.0 / 100.0);

    let comp_scale = scaled_ratio(
        reference.raw.useful_total.div(raw.useful_total),
        proc_ratio,
        mode,
    )
    .scale(100.0);
    let global_eff = parallel_eff.mul(comp_scale).scale(1.0 / 100.0);

    let ipc = ipc(raw);
    let ipc_scale = ipc.div(reference.ipc()).scale(100.0);
    let freq = freq(raw);
    let freq_scale = freq.div(reference.freq()).scale(100.0);
    let inst_scale = scaled_ratio(
        reference
            .raw
            .useful_instructions
            .div(raw.useful_instructions),
        proc_ratio,
        mode,
    )
    .scale(100.0);
    let speedup = scaled_ratio(reference.raw.runtime.div(raw.runtime), proc_ratio, mode);

    ModelFactors {
        parallel_eff,
        load_balance,
        comm_eff,
        serial_eff,
        transfer_eff,
        comp_scale,
        global_eff,
        ipc_scale,
        inst_scale,
        freq_scale,
        speedup,
        ipc,
        freq,
    }
}

/// Compute the model factors of every run in the campaign.
pub fn compute_model_factors(campaign: &Campaign, mode: ScalingMode) -> FactorTable {
    let (reference_run, reference_raw) = campaign.reference();
    let reference = Reference {
        processes: reference_run.processes,
        raw: reference_raw,
    };

    let factors: Vec<ModelFactors> = campaign
        .iter()
        .map(|(run, raw)| {
            let factors = compute_factors(raw, run.processes, reference, mode);
            debug!(
                "{} ({} processes): parallel efficiency {}, global efficiency {}",
                run.id, run.processes, factors.parallel_eff, factors.global_eff
            );
            factors
        })
        .collect();

    campaign.with_factors(factors)
}
