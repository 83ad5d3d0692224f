//! `modelfactors.csv`: model factors per run, followed by the raw counters as
//! commented rows. Fields are separated by `;`.

use crate::campaign::{CampaignError, FactorTable, Run};
use crate::metrics::{FactorKey, Metric, ModelFactors, RawKey, RawMetricSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const DELIMITER: char = ';';
const HEADER: &str = "Number of processes";

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("failed to access csv file: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv file is empty")]
    MissingHeader,

    #[error("line {line}: '{field}' is not a process count")]
    InvalidProcessCount { line: usize, field: String },

    #[error("line {line}: '{field}' is not a number")]
    InvalidValue { line: usize, field: String },

    #[error("line {line}: expected {expected} values, got {got}")]
    FieldCount {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("row for '{0}' is missing")]
    MissingRow(&'static str),

    #[error(transparent)]
    Campaign(#[from] CampaignError),
}

/// Render the table and the raw counters of the same runs.
pub fn render_csv(table: &FactorTable, raw: &[RawMetricSet]) -> String {
    let mut out = String::new();

    out.push_str(HEADER);
    for run in table.runs() {
        out.push(DELIMITER);
        out.push_str(&run.processes.to_string());
    }
    out.push('\n');

    for key in FactorKey::ALL {
        out.push_str(key.label().trim_start());
        for factors in table.factors() {
            out.push(DELIMITER);
            out.push_str(&factors.get(key).format(6));
        }
        out.push('\n');
    }

    out.push_str("#\n");

    for key in RawKey::ALL {
        out.push('#');
        out.push_str(key.label());
        for counters in raw {
            out.push(DELIMITER);
            out.push_str(&counters.get(key).format(2));
        }
        out.push('\n');
    }

    out
}

pub fn write_csv<P: AsRef<Path>>(
    path: P,
    table: &FactorTable,
    raw: &[RawMetricSet],
) -> Result<(), CsvError> {
    fs::write(path.as_ref(), render_csv(table, raw))?;
    info!("Model factors written to {}", path.as_ref().display());
    Ok(())
}

/// Rebuild a factor table from exported csv content.
///
/// Header fields become run ids whose process count is their own value. The
/// rows after the header are read in declared factor order; commented rows
/// are ignored.
pub fn parse_csv(content: &str) -> Result<FactorTable, CsvError> {
    let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (header_line, header) = lines.next().ok_or(CsvError::MissingHeader)?;
    let runs = header
        .split(DELIMITER)
        .skip(1)
        .map(|field| {
            let field = field.trim();
            field
                .parse::<u32>()
                .ok()
                .filter(|p| *p > 0)
                .map(|p| Run::new(field, p))
                .ok_or_else(|| CsvError::InvalidProcessCount {
                    line: header_line,
                    field: field.to_string(),
                })
        })
        .collect::<Result<Vec<Run>, CsvError>>()?;

    let mut factors = vec![ModelFactors::default(); runs.len()];
    let mut rows = lines.filter(|(_, l)| !l.trim().is_empty() && !l.starts_with('#'));

    for key in FactorKey::ALL {
        let (line, row) = rows.next().ok_or(CsvError::MissingRow(key.name()))?;
        let values: Vec<&str> = row.split(DELIMITER).skip(1).collect();
        if values.len() != runs.len() {
            return Err(CsvError::FieldCount {
                line,
                expected: runs.len(),
                got: values.len(),
            });
        }
        for (slot, field) in factors.iter_mut().zip(values) {
            let value = Metric::parse(field).ok_or_else(|| CsvError::InvalidValue {
                line,
                field: field.to_string(),
            })?;
            slot.set(key, value);
        }
    }

    Ok(FactorTable::from_parts(runs, factors)?)
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<FactorTable, CsvError> {
    let content = fs::read_to_string(path.as_ref())?;
    let table = parse_csv(&content)?;
    info!(
        "Read model factors of {} run(s) from {}",
        table.len(),
        path.as_ref().display()
    );
    Ok(table)
}
