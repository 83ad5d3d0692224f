use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub output_dir: String,
    pub csv_name: String,
    pub gnuplot_name: String,
    /// Custom gnuplot template; the bundled one is used when unset
    pub gnuplot_template: Option<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            csv_name: "modelfactors.csv".to_string(),
            gnuplot_name: "modelfactors.gp".to_string(),
            gnuplot_template: None,
        }
    }
}

impl PathConfig {
    pub fn csv_file(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.csv_name)
    }

    pub fn gnuplot_file(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.gnuplot_name)
    }
}
