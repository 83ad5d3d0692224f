//! Raw counters gathered for a single run

use super::Metric;
use serde::{Deserialize, Serialize};

/// Keys of the raw counter set, in the order they are printed and exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKey {
    Runtime,
    RuntimeIdeal,
    UsefulAvg,
    UsefulMax,
    UsefulTotal,
    UsefulIdealMax,
    UsefulInstructions,
    UsefulCycles,
}

impl RawKey {
    pub const ALL: [RawKey; 8] = [
        RawKey::Runtime,
        RawKey::RuntimeIdeal,
        RawKey::UsefulAvg,
        RawKey::UsefulMax,
        RawKey::UsefulTotal,
        RawKey::UsefulIdealMax,
        RawKey::UsefulInstructions,
        RawKey::UsefulCycles,
    ];

    /// Field name used in manifests
    pub fn name(self) -> &'static str {
        match self {
            RawKey::Runtime => "runtime",
            RawKey::RuntimeIdeal => "runtime_ideal",
            RawKey::UsefulAvg => "useful_avg",
            RawKey::UsefulMax => "useful_max",
            RawKey::UsefulTotal => "useful_total",
            RawKey::UsefulIdealMax => "useful_ideal_max",
            RawKey::UsefulInstructions => "useful_instructions",
            RawKey::UsefulCycles => "useful_cycles",
        }
    }

    /// Printable label
    pub fn label(self) -> &'static str {
        match self {
            RawKey::Runtime => "Runtime (us)",
            RawKey::RuntimeIdeal => "Runtime (ideal)",
            RawKey::UsefulAvg => "Useful duration (average)",
            RawKey::UsefulMax => "Useful duration (maximum)",
            RawKey::UsefulTotal => "Useful duration (total)",
            RawKey::UsefulIdealMax => "Useful duration (ideal, max)",
            RawKey::UsefulInstructions => "Useful instructions (total)",
            RawKey::UsefulCycles => "Useful cycles (total)",
        }
    }
}

/// The eight raw counters of one run. Durations are in microseconds.
///
/// Counters absent from a manifest deserialize as missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMetricSet {
    pub runtime: Metric,
    pub runtime_ideal: Metric,
    pub useful_avg: Metric,
    pub useful_max: Metric,
    pub useful_total: Metric,
    pub useful_ideal_max: Metric,
    pub useful_instructions: Metric,
    pub useful_cycles: Metric,
}

impl RawMetricSet {
    /// Set used when a run could not be acquired at all.
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn get(&self, key: RawKey) -> Metric {
        match key {
            RawKey::Runtime => self.runtime,
            RawKey::RuntimeIdeal => self.runtime_ideal,
            RawKey::UsefulAvg => self.useful_avg,
            RawKey::UsefulMax => self.useful_max,
            RawKey::UsefulTotal => self.useful_total,
            RawKey::UsefulIdealMax => self.useful_ideal_max,
            RawKey::UsefulInstructions => self.useful_instructions,
            RawKey::UsefulCycles => self.useful_cycles,
        }
    }

    pub fn set(&mut self, key: RawKey, value: Metric) {
        let slot = match key {
            RawKey::Runtime => &mut self.runtime,
            RawKey::RuntimeIdeal => &mut self.runtime_ideal,
            RawKey::UsefulAvg => &mut self.useful_avg,
            RawKey::UsefulMax => &mut self.useful_max,
            RawKey::UsefulTotal => &mut self.useful_total,
            RawKey::UsefulIdealMax => &mut self.useful_ideal_max,
            RawKey::UsefulInstructions => &mut self.useful_instructions,
            RawKey::UsefulCycles => &mut self.useful_cycles,
        };
        *slot = value;
    }

    /// Number of counters that could not be obtained.
    pub fn missing_count(&self) -> usize {
        RawKey::ALL
            .iter()
            .filter(|key| self.get(**key).is_missing())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_manifest_entry() {
        let raw: RawMetricSet =
            serde_json::from_str(r#"{"runtime": 100.0, "useful_cycles": null}"#).unwrap();
        assert_eq!(raw.runtime, Metric::Value(100.0));
        assert!(raw.useful_cycles.is_missing());
        assert!(raw.useful_avg.is_missing());
        assert_eq!(raw.missing_count(), 7);
    }

    #[test]
    fn test_get_set_cover_every_key() {
        let mut raw = RawMetricSet::missing();
        for (i, key) in RawKey::ALL.iter().enumerate() {
            raw.set(*key, Metric::new(i as f64));
        }
        for (i, key) in RawKey::ALL.iter().enumerate() {
            assert_eq!(raw.get(*key), Metric::Value(i as f64), "{}", key.name());
        }
        assert_eq!(raw.missing_count(), 0);
    }
}
