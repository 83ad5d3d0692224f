//! Raw counter acquisition
//!
//! Runs are independent during acquisition, so every run is acquired on the
//! rayon pool and the results are joined before the campaign is assembled. A
//! run that cannot be acquired keeps an all-missing counter set instead of
//! aborting the other runs.

use crate::campaign::{Campaign, CampaignError, Run};
use crate::metrics::RawMetricSet;
use anyhow::{anyhow, bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Anything that can deliver the raw counters of a run.
pub trait CounterSource: Sync {
    fn acquire(&self, run: &Run) -> Result<RawMetricSet>;
}

/// Acquire every run in parallel and assemble the campaign.
pub fn gather<S: CounterSource + ?Sized>(
    runs: Vec<Run>,
    source: &S,
) -> Result<Campaign, CampaignError> {
    let entries: Vec<(Run, RawMetricSet)> = runs
        .into_par_iter()
        .map(|run| {
            let start = Instant::now();
            let raw = match source.acquire(&run) {
                Ok(raw) => {
                    let missing = raw.missing_count();
                    if missing > 0 {
                        warn!("{}: {} raw counter(s) missing.", run.id, missing);
                    }
                    raw
                }
                Err(e) => {
                    warn!("Failed to acquire counters of {}: {:#}", run.id, e);
                    RawMetricSet::missing()
                }
            };
            debug!(
                "Acquired {} ({} processes) in {:.1} seconds.",
                run.id,
                run.processes,
                start.elapsed().as_secs_f64()
            );
            (run, raw)
        })
        .collect();

    Campaign::new(entries)
}

/// Counters of a run: inline in the manifest or in a separate JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterEntry {
    Inline(RawMetricSet),
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub processes: u32,
    #[serde(default)]
    pub counters: Option<CounterEntry>,
}

/// JSON campaign manifest listing every run of a scaling study.
///
/// ```json
/// { "runs": [ { "id": "app_4.prv", "processes": 4,
///               "counters": { "runtime": 30.0, "useful_cycles": null } },
///             { "id": "app_8.prv", "processes": 8, "counters": "app_8.json" } ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub runs: Vec<RunRecord>,
    /// Directory that relative counter files are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Manifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let mut manifest: Self = serde_json::from_str(&json)
            .with_context(|| format!("invalid manifest {}", path.display()))?;

        let mut seen = HashSet::new();
        for record in &manifest.runs {
            if !seen.insert(record.id.as_str()) {
                bail!(
                    "run {} is listed more than once in manifest {}",
                    record.id,
                    path.display()
                );
            }
        }

        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!(
            "Loaded manifest {} with {} run(s).",
            path.display(),
            manifest.runs.len()
        );
        Ok(manifest)
    }

    pub fn runs(&self) -> Vec<Run> {
        self.runs
            .iter()
            .map(|record| Run::new(record.id.clone(), record.processes))
            .collect()
    }

    /// Index the records by run id for acquisition.
    pub fn source(&self) -> ManifestSource<'_> {
        ManifestSource {
            records: self.runs.iter().map(|r| (r.id.as_str(), r)).collect(),
            base_dir: &self.base_dir,
        }
    }
}

pub struct ManifestSource<'a> {
    records: HashMap<&'a str, &'a RunRecord>,
    base_dir: &'a Path,
}

impl CounterSource for ManifestSource<'_> {
    fn acquire(&self, run: &Run) -> Result<RawMetricSet> {
        let record = self
            .records
            .get(run.id.as_str())
            .ok_or_else(|| anyhow!("run is not listed in the manifest"))?;

        match &record.counters {
            None => Err(anyhow!("no counters recorded")),
            Some(CounterEntry::Inline(raw)) => Ok(*raw),
            Some(CounterEntry::File(file)) => {
                let path = self.base_dir.join(file);
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let raw = serde_json::from_str(&json)
                    .with_context(|| format!("invalid counter file {}", path.display()))?;
                Ok(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;

    struct FailingOdd;

    impl CounterSource for FailingOdd {
        fn acquire(&self, run: &Run) -> Result<RawMetricSet> {
            if run.processes % 2 == 1 {
                return Err(anyhow!("simulator crashed"));
            }
            Ok(RawMetricSet {
                runtime: Metric::new(f64::from(run.processes)),
                ..RawMetricSet::missing()
            })
        }
    }

    #[test]
    fn test_failed_run_degrades_to_missing() {
        let runs = vec![Run::new("a", 3), Run::new("b", 2), Run::new("c", 8)];
        let campaign = gather(runs, &FailingOdd).unwrap();

        let processes: Vec<u32> = campaign.runs().iter().map(|r| r.processes).collect();
        assert_eq!(processes, vec![2, 3, 8]);
        assert_eq!(campaign.raw()[0].runtime, Metric::Value(2.0));
        assert_eq!(campaign.raw()[1], RawMetricSet::missing());
        assert_eq!(campaign.raw()[2].runtime, Metric::Value(8.0));
    }

    #[test]
    fn test_gather_empty_is_error() {
        assert!(matches!(
            gather(Vec::new(), &FailingOdd),
            Err(CampaignError::Empty)
        ));
    }

    #[test]
    fn test_manifest_inline_and_file_counters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("run_4.json"),
            r#"{"runtime": 30.0, "useful_max": 85.0}"#,
        )
        .unwrap();
        let manifest_path = dir.path().join("campaign.json");
        fs::write(
            &manifest_path,
            r#"{"runs": [
                {"id": "run_4", "processes": 4, "counters": "run_4.json"},
                {"id": "run_1", "processes": 1, "counters": {"runtime": 100.0}},
                {"id": "run_2", "processes": 2}
            ]}"#,
        )
        .unwrap();

        let manifest = Manifest::load(&manifest_path).unwrap();
        let campaign = gather(manifest.runs(), &manifest.source()).unwrap();

        assert_eq!(campaign.reference().0.id, "run_1");
        assert_eq!(campaign.raw()[0].runtime, Metric::Value(100.0));
        assert_eq!(campaign.raw()[1], RawMetricSet::missing());
        assert_eq!(campaign.raw()[2].useful_max, Metric::Value(85.0));
        assert!(campaign.raw()[2].useful_cycles.is_missing());
    }

    #[test]
    fn test_manifest_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("campaign.json");
        fs::write(
            &manifest_path,
            r#"{"runs": [
                {"id": "run_1", "processes": 1, "counters": {"runtime": 100.0}},
                {"id": "run_1", "processes": 2, "counters": {"runtime": 60.0}}
            ]}"#,
        )
        .unwrap();

        let err = Manifest::load(&manifest_path).unwrap_err();
        assert!(
            err.to_string().contains("run_1 is listed more than once"),
            "{err}"
        );
    }
}
