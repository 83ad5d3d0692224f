//! Derived model factors of a single run

use super::Metric;
use serde::{Deserialize, Serialize};

/// Keys of the model factors, in declared (printing and export) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKey {
    ParallelEff,
    LoadBalance,
    CommEff,
    SerialEff,
    TransferEff,
    CompScale,
    GlobalEff,
    IpcScale,
    InstScale,
    FreqScale,
    Speedup,
    Ipc,
    Freq,
}

impl FactorKey {
    pub const ALL: [FactorKey; 13] = [
        FactorKey::ParallelEff,
        FactorKey::LoadBalance,
        FactorKey::CommEff,
        FactorKey::SerialEff,
        FactorKey::TransferEff,
        FactorKey::CompScale,
        FactorKey::GlobalEff,
        FactorKey::IpcScale,
        FactorKey::InstScale,
        FactorKey::FreqScale,
        FactorKey::Speedup,
        FactorKey::Ipc,
        FactorKey::Freq,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FactorKey::ParallelEff => "parallel_eff",
            FactorKey::LoadBalance => "load_balance",
            FactorKey::CommEff => "comm_eff",
            FactorKey::SerialEff => "serial_eff",
            FactorKey::TransferEff => "transfer_eff",
            FactorKey::CompScale => "comp_scale",
            FactorKey::GlobalEff => "global_eff",
            FactorKey::IpcScale => "ipc_scale",
            FactorKey::InstScale => "inst_scale",
            FactorKey::FreqScale => "freq_scale",
            FactorKey::Speedup => "speedup",
            FactorKey::Ipc => "ipc",
            FactorKey::Freq => "freq",
        }
    }

    /// Printable label. Leading indentation encodes the factor hierarchy.
    pub fn label(self) -> &'static str {
        match self {
            FactorKey::ParallelEff => "Parallel efficiency",
            FactorKey::LoadBalance => "  Load balance",
            FactorKey::CommEff => "  Communication efficiency",
            FactorKey::SerialEff => "    Serialization efficiency",
            FactorKey::TransferEff => "    Transfer efficiency",
            FactorKey::CompScale => "Computation scalability",
            FactorKey::GlobalEff => "Global efficiency",
            FactorKey::IpcScale => "IPC scalability",
            FactorKey::InstScale => "Instruction scalability",
            FactorKey::FreqScale => "Frequency scalability",
            FactorKey::Speedup => "Speedup",
            FactorKey::Ipc => "Average IPC",
            FactorKey::Freq => "Average frequency (GHz)",
        }
    }

    /// Percent-valued factors; the rest are plain ratios.
    pub fn is_percentage(self) -> bool {
        !matches!(self, FactorKey::Speedup | FactorKey::Ipc | FactorKey::Freq)
    }
}

/// The thirteen derived factors of one run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFactors {
    pub parallel_eff: Metric,
    pub load_balance: Metric,
    pub comm_eff: Metric,
    pub serial_eff: Metric,
    pub transfer_eff: Metric,
    pub comp_scale: Metric,
    pub global_eff: Metric,
    pub ipc_scale: Metric,
    pub inst_scale: Metric,
    pub freq_scale: Metric,
    pub speedup: Metric,
    pub ipc: Metric,
    pub freq: Metric,
}

impl ModelFactors {
    pub fn get(&self, key: FactorKey) -> Metric {
        match key {
            FactorKey::ParallelEff => self.parallel_eff,
            FactorKey::LoadBalance => self.load_balance,
            FactorKey::CommEff => self.comm_eff,
            FactorKey::SerialEff => self.serial_eff,
            FactorKey::TransferEff => self.transfer_eff,
            FactorKey::CompScale => self.comp_scale,
            FactorKey::GlobalEff => self.global_eff,
            FactorKey::IpcScale => self.ipc_scale,
            FactorKey::InstScale => self.inst_scale,
            FactorKey::FreqScale => self.freq_scale,
            FactorKey::Speedup => self.speedup,
            FactorKey::Ipc => self.ipc,
            FactorKey::Freq => self.freq,
        }
    }

    pub fn set(&mut self, key: FactorKey, value: Metric) {
        let slot = match key {
            FactorKey::ParallelEff => &mut self.parallel_eff,
            FactorKey::LoadBalance => &mut self.load_balance,
            FactorKey::CommEff => &mut self.comm_eff,
            FactorKey::SerialEff => &mut self.serial_eff,
            FactorKey::TransferEff => &mut self.transfer_eff,
            FactorKey::CompScale => &mut self.comp_scale,
            FactorKey::GlobalEff => &mut self.global_eff,
            FactorKey::IpcScale => &mut self.ipc_scale,
            FactorKey::InstScale => &mut self.inst_scale,
            FactorKey::FreqScale => &mut self.freq_scale,
            FactorKey::Speedup => &mut self.speedup,
            FactorKey::Ipc => &mut self.ipc,
            FactorKey::Freq => &mut self.freq,
        };
        *slot = value;
    }
}
