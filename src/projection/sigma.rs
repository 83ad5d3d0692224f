//! Measurement uncertainty per run. Lower values mark more trusted points;
//! only the relative magnitudes matter.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sigma {
    /// Prioritize the smallest run
    #[default]
    First,
    /// No priority
    Equal,
    /// Decreasing priority for larger runs
    Decrease,
}

impl Sigma {
    /// Uncertainty of each of `n` runs, ordered by process count.
    pub fn weights(self, n: usize) -> Vec<f64> {
        match self {
            Sigma::First => {
                let mut sigma = vec![1.0; n];
                if let Some(first) = sigma.first_mut() {
                    *first = 0.1;
                }
                sigma
            }
            Sigma::Equal => vec![1.0; n],
            Sigma::Decrease => linspace(1.0, 2.0, n),
        }
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
