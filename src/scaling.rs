//! Weak/strong scaling detection
//!
//! The normalized instruction ratio of a run is `(instructions / instructions_ref)
//! / (processes / processes_ref)`. Under perfect weak scaling every run has a
//! ratio of 1; under strong scaling it drops towards `processes_ref / processes`.
//! The average over all non-reference runs is compared against [`WEAK_SCALING_EPS`].

use crate::campaign::Campaign;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Averages above this threshold are classified as weak scaling.
pub const WEAK_SCALING_EPS: f64 = 0.9;

/// Scaling type of a whole campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    /// Work per process constant, total work grows with the process count
    Weak,
    /// Total work constant
    Strong,
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingMode::Weak => f.write_str("weak"),
            ScalingMode::Strong => f.write_str("strong"),
        }
    }
}

/// User selection: detect automatically or force a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScalingChoice {
    #[default]
    Auto,
    Weak,
    Strong,
}

impl ScalingChoice {
    fn forced(self) -> Option<ScalingMode> {
        match self {
            ScalingChoice::Auto => None,
            ScalingChoice::Weak => Some(ScalingMode::Weak),
            ScalingChoice::Strong => Some(ScalingMode::Strong),
        }
    }
}

/// Normalized instruction ratios of the non-reference runs.
///
/// Returns `None` when the reference instruction count is unusable. Runs with a
/// missing instruction count are left out.
pub fn normalized_instruction_ratios(campaign: &Campaign) -> Option<Vec<f64>> {
    let (reference, reference_raw) = campaign.reference();
    let reference_instructions = reference_raw.useful_instructions;
    match reference_instructions.value() {
        Some(v) if v != 0.0 => {}
        _ => return None,
    }

    let mut ratios = Vec::with_capacity(campaign.len().saturating_sub(1));
    for (run, raw) in campaign.iter().skip(1) {
        let inst_ratio = raw.useful_instructions.div(reference_instructions);
        let proc_ratio = f64::from(run.processes) / f64::from(reference.processes);
        match inst_ratio.value() {
            Some(ratio) => ratios.push(ratio / proc_ratio),
            None => warn!(
                "Instruction count of {} is missing, ignoring it for scaling detection.",
                run.id
            ),
        }
    }
    Some(ratios)
}

/// Classify the campaign without considering any user override.
///
/// `None` means the campaign carries no usable reference instruction count.
/// Without any other usable run there is nothing to compare against and the
/// campaign is strong.
pub fn detect_scaling(campaign: &Campaign) -> Option<ScalingMode> {
    if campaign.len() == 1 {
        return Some(ScalingMode::Strong);
    }
    let ratios = normalized_instruction_ratios(campaign)?;
    if ratios.is_empty() {
        debug!("Only the reference run has an instruction count.");
        return Some(ScalingMode::Strong);
    }

    let normalized = ratios.iter().sum::<f64>() / ratios.len() as f64;
    debug!("Normalized instruction ratio: {:.4}", normalized);
    if normalized > WEAK_SCALING_EPS {
        Some(ScalingMode::Weak)
    } else {
        Some(ScalingMode::Strong)
    }
}

/// Reasons the scaling mode in use is not backed by detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ambiguity {
    /// Nothing detected and nothing forced
    Undetected,
    /// Forced mode contradicts the detected one
    Disagreement {
        forced: ScalingMode,
        detected: ScalingMode,
    },
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ambiguity::Undetected => {
                f.write_str("Could not detect the scaling type, assuming strong scaling.")
            }
            Ambiguity::Disagreement { forced, detected } => write!(
                f,
                "Scaling set to {} scaling but detected {} scaling.",
                forced, detected
            ),
        }
    }
}

/// Ambiguity to report for this combination, if any. A forced mode on an
/// undetermined campaign is not ambiguous.
pub fn ambiguity(detected: Option<ScalingMode>, choice: ScalingChoice) -> Option<Ambiguity> {
    match (choice.forced(), detected) {
        (None, None) => Some(Ambiguity::Undetected),
        (Some(forced), Some(detected)) if forced != detected => {
            Some(Ambiguity::Disagreement { forced, detected })
        }
        _ => None,
    }
}

/// Combine the detected mode with the user's choice.
pub fn resolve_scaling(detected: Option<ScalingMode>, choice: ScalingChoice) -> ScalingMode {
    if let Some(ambiguity) = ambiguity(detected, choice) {
        warn!("{}", ambiguity);
    }
    match (choice.forced(), detected) {
        (Some(forced), _) => forced,
        (None, Some(mode)) => {
            debug!("Detected {} scaling.", mode);
            mode
        }
        (None, None) => ScalingMode::Strong,
    }
}

/// Scaling mode used for the model factors of `campaign`.
pub fn classify(campaign: &Campaign, choice: ScalingChoice) -> ScalingMode {
    resolve_scaling(detect_scaling(campaign), choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::Run;
    use crate::metrics::{Metric, RawMetricSet};

    fn campaign_with_instructions(points: &[(u32, Option<f64>)]) -> Campaign {
        let entries = points
            .iter()
            .map(|(p, inst)| {
                let mut raw = RawMetricSet::missing();
                raw.useful_instructions = Metric::from(*inst);
                (Run::new(format!("trace_{p}.prv"), *p), raw)
            })
            .collect();
        Campaign::new(entries).unwrap()
    }

    #[test]
    fn test_proportional_instructions_are_weak() {
        let campaign = campaign_with_instructions(&[
            (1, Some(1000.0)),
            (4, Some(4000.0)),
            (16, Some(16000.0)),
        ]);
        assert_eq!(detect_scaling(&campaign), Some(ScalingMode::Weak));
    }

    #[test]
    fn test_constant_instructions_are_strong() {
        let campaign = campaign_with_instructions(&[
            (1, Some(1000.0)),
            (4, Some(1000.0)),
            (16, Some(1000.0)),
        ]);
        assert_eq!(detect_scaling(&campaign), Some(ScalingMode::Strong));
    }

    #[test]
    fn test_single_run_is_strong() {
        let campaign = campaign_with_instructions(&[(8, Some(1.0))]);
        assert_eq!(detect_scaling(&campaign), Some(ScalingMode::Strong));

        let campaign = campaign_with_instructions(&[(8, None)]);
        assert_eq!(detect_scaling(&campaign), Some(ScalingMode::Strong));
    }

    #[test]
    fn test_missing_reference_is_undetermined() {
        let campaign = campaign_with_instructions(&[(1, None), (2, Some(2000.0))]);
        assert_eq!(detect_scaling(&campaign), None);
        assert_eq!(
            resolve_scaling(None, ScalingChoice::Auto),
            ScalingMode::Strong
        );
        assert_eq!(resolve_scaling(None, ScalingChoice::Weak), ScalingMode::Weak);
    }

    #[test]
    fn test_missing_run_is_skipped() {
        let campaign = campaign_with_instructions(&[
            (1, Some(1000.0)),
            (2, None),
            (4, Some(4000.0)),
        ]);
        let ratios = normalized_instruction_ratios(&campaign).unwrap();
        assert_eq!(ratios.len(), 1);
        assert!((ratios[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_only_reference_instructions_is_strong() {
        let campaign = campaign_with_instructions(&[(1, Some(1000.0)), (4, None), (16, None)]);
        assert_eq!(normalized_instruction_ratios(&campaign), Some(Vec::new()));
        assert_eq!(detect_scaling(&campaign), Some(ScalingMode::Strong));
        assert_eq!(classify(&campaign, ScalingChoice::Auto), ScalingMode::Strong);
    }

    #[test]
    fn test_ambiguity_on_disagreement() {
        assert_eq!(
            ambiguity(Some(ScalingMode::Strong), ScalingChoice::Weak),
            Some(Ambiguity::Disagreement {
                forced: ScalingMode::Weak,
                detected: ScalingMode::Strong,
            })
        );
        assert_eq!(
            ambiguity(Some(ScalingMode::Weak), ScalingChoice::Strong)
                .unwrap()
                .to_string(),
            "Scaling set to strong scaling but detected weak scaling."
        );
        assert_eq!(ambiguity(Some(ScalingMode::Weak), ScalingChoice::Weak), None);
        assert_eq!(ambiguity(Some(ScalingMode::Weak), ScalingChoice::Auto), None);
    }

    #[test]
    fn test_ambiguity_when_undetermined() {
        assert_eq!(
            ambiguity(None, ScalingChoice::Auto),
            Some(Ambiguity::Undetected)
        );
        // Forcing a mode settles an undetermined campaign without a warning
        assert_eq!(ambiguity(None, ScalingChoice::Weak), None);
        assert_eq!(ambiguity(None, ScalingChoice::Strong), None);
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve_scaling(Some(ScalingMode::Strong), ScalingChoice::Weak),
            ScalingMode::Weak
        );
        assert_eq!(
            resolve_scaling(Some(ScalingMode::Weak), ScalingChoice::Strong),
            ScalingMode::Strong
        );
        assert_eq!(
            resolve_scaling(Some(ScalingMode::Weak), ScalingChoice::Auto),
            ScalingMode::Weak
        );
    }
}
