//! Gnuplot script with the projected curves and the measured points

use crate::campaign::FactorTable;
use crate::metrics::FactorKey;
use crate::projection::{Projection, PROJECTED_FACTORS};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Bundled template
pub const DEFAULT_TEMPLATE: &str = include_str!("../../cfgs/modelfactors.gp");

const XRANGE_PLACEHOLDER: &str = "#REPLACE_BY_XRANGE";

fn function_placeholder(key: FactorKey) -> Option<&'static str> {
    match key {
        FactorKey::ParallelEff => Some("#REPLACE_BY_PARA_FUNCTION"),
        FactorKey::LoadBalance => Some("#REPLACE_BY_LOAD_FUNCTION"),
        FactorKey::CommEff => Some("#REPLACE_BY_COMM_FUNCTION"),
        FactorKey::CompScale => Some("#REPLACE_BY_COMP_FUNCTION"),
        FactorKey::GlobalEff => Some("#REPLACE_BY_GLOB_FUNCTION"),
        _ => None,
    }
}

/// Fill `template` with the projection and append one inline data block per
/// projected factor.
pub fn render_script(template: &str, projection: &Projection, table: &FactorTable) -> String {
    let mut script = template.replace(
        XRANGE_PLACEHOLDER,
        &format!(
            "set xrange [{}:{}]",
            projection.reference_processes, projection.limit
        ),
    );
    for (key, formula) in projection.formulas() {
        if let Some(placeholder) = function_placeholder(key) {
            script = script.replace(placeholder, &formula);
        }
    }
    if !script.is_empty() && !script.ends_with('\n') {
        script.push('\n');
    }

    for key in PROJECTED_FACTORS {
        for (run, factors) in table.iter() {
            script.push_str(&format!("{} {}\n", run.processes, factors.get(key)));
        }
        script.push_str("e\n");
    }

    script.push('\n');
    script.push_str("pause -1\n");
    script
}

/// Write the script, reading the template from `template_path` if given.
pub fn write_script<P: AsRef<Path>>(
    path: P,
    template_path: Option<&Path>,
    projection: &Projection,
    table: &FactorTable,
) -> Result<()> {
    let template = match template_path {
        Some(t) => fs::read_to_string(t)
            .with_context(|| format!("failed to read gnuplot template {}", t.display()))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };
    let script = render_script(&template, projection, table);
    fs::write(path.as_ref(), script)
        .with_context(|| format!("failed to write {}", path.as_ref().display()))?;
    info!("Projection written to {}", path.as_ref().display());
    Ok(())
}
