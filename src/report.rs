//! Human-readable tables for the terminal

use crate::campaign::{Campaign, FactorTable};
use crate::metrics::{FactorKey, RawKey};
use crate::projection::{Projection, PROJECTED_FACTORS};
use std::fmt::Write;

const RAW_WIDTH: usize = 15;
const FACTOR_WIDTH: usize = 10;

fn header(label_width: usize, processes: impl Iterator<Item = u32>, width: usize) -> String {
    let mut line = " ".repeat(label_width);
    for p in processes {
        let _ = write!(line, " | {:>width$}", p, width = width);
    }
    let rule = "=".repeat(line.chars().count());
    format!("{}\n{}\n", line, rule)
}

pub fn render_overview(campaign: &Campaign) -> String {
    let mut out = String::from("Running modelfactors for the following runs:\n");
    for run in campaign.runs() {
        let _ = writeln!(out, "{}, {} processes", run.id, run.processes);
    }
    out
}

pub fn render_raw_table(campaign: &Campaign) -> String {
    let label_width = RawKey::ALL
        .iter()
        .map(|k| k.label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Overview of the collected raw data:\n");
    out.push_str(&header(
        label_width,
        campaign.runs().iter().map(|r| r.processes),
        RAW_WIDTH,
    ));
    for key in RawKey::ALL {
        let _ = write!(out, "{:<label_width$}", key.label(), label_width = label_width);
        for raw in campaign.raw() {
            let _ = write!(out, " | {:>w$}", raw.get(key).to_string(), w = RAW_WIDTH);
        }
        out.push('\n');
    }
    out
}

pub fn render_factor_table(table: &FactorTable) -> String {
    let label_width = FactorKey::ALL
        .iter()
        .map(|k| k.label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Overview of the computed model factors:\n");
    out.push_str(&header(
        label_width,
        table.runs().iter().map(|r| r.processes),
        FACTOR_WIDTH,
    ));
    for key in FactorKey::ALL {
        let _ = write!(out, "{:<label_width$}", key.label(), label_width = label_width);
        for factors in table.factors() {
            let value = factors.get(key);
            let cell = match value.value() {
                Some(v) if key.is_percentage() => format!("{:.2}%", v),
                Some(v) => format!("{:.2}", v),
                None => value.to_string(),
            };
            let _ = write!(out, " | {:>w$}", cell, w = FACTOR_WIDTH);
        }
        out.push('\n');

        // Blank row between the efficiency, scalability and ratio groups
        if matches!(key, FactorKey::GlobalEff | FactorKey::FreqScale) {
            out.push_str(&" ".repeat(label_width));
            for _ in table.runs() {
                let _ = write!(out, " | {:>w$}", "", w = FACTOR_WIDTH);
            }
            out.push('\n');
        }
    }
    out
}

/// Fitted parameters and projected values at a few process counts.
pub fn render_projection_summary(projection: &Projection, at: &[u32]) -> String {
    let mut out = format!(
        "Projection ({} model, reference {} processes):\n",
        projection.model, projection.reference_processes
    );
    for key in PROJECTED_FACTORS {
        let label = key.label().trim_start();
        if let Some(fit) = projection.fit(key) {
            let _ = write!(out, "  {:<26} x0 = {:>10.4}, f = {:>8.5}", label, fit.x0, fit.f);
        }
        for &p in at {
            match projection.eval(key, f64::from(p)) {
                Some(v) => {
                    let _ = write!(out, " | {}: {:.2}%", p, v);
                }
                None => {
                    let _ = write!(out, " | {}: undefined", p);
                }
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::Run;
    use crate::metrics::{Metric, ModelFactors, RawMetricSet};

    #[test]
    fn test_factor_table_formatting() {
        let factors = ModelFactors {
            load_balance: Metric::new(94.117),
            speedup: Metric::new(3.3333),
            ..Default::default()
        };
        let table = FactorTable::new(vec![(Run::new("a", 4), factors)]).unwrap();
        let text = render_factor_table(&table);

        assert!(text.contains("94.12%"));
        let speedup = text.lines().find(|l| l.starts_with("Speedup")).unwrap();
        assert!(speedup.ends_with(" 3.33"), "{}", speedup);
        assert!(!speedup.contains('%'));
        assert!(text.contains("NaN"));
        // header, rule, 13 rows, 2 separators
        assert_eq!(text.lines().count(), 1 + 2 + 13 + 2);
    }

    #[test]
    fn test_raw_table_rows() {
        let campaign = Campaign::new(vec![
            (Run::new("a", 1), RawMetricSet::missing()),
            (Run::new("b", 2), RawMetricSet::missing()),
        ])
        .unwrap();
        let text = render_raw_table(&campaign);
        assert_eq!(text.lines().count(), 1 + 2 + 8);
        assert!(text.lines().nth(3).unwrap().starts_with("Runtime (us)"));
    }
}
