//! Analytical scaling models with two free parameters `(x0, f)`

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionModel {
    /// `x0 / (f + (1 - f) * x)`
    #[default]
    Amdahl,
    /// `x0 * x / ((1 - f) + f * (2x - 1))`
    Pipe,
    /// `x0 + f * x`
    Linear,
}

impl ProjectionModel {
    pub const PARAMETERS: usize = 2;

    pub fn eval(self, x: f64, x0: f64, f: f64) -> f64 {
        match self {
            ProjectionModel::Amdahl => x0 / (f + (1.0 - f) * x),
            ProjectionModel::Pipe => x0 * x / ((1.0 - f) + f * (2.0 * x - 1.0)),
            ProjectionModel::Linear => x0 + f * x,
        }
    }

    /// Partial derivatives `(d/dx0, d/df)` at `x`.
    pub fn gradient(self, x: f64, x0: f64, f: f64) -> (f64, f64) {
        match self {
            ProjectionModel::Amdahl => {
                let denom = f + (1.0 - f) * x;
                (1.0 / denom, -x0 * (1.0 - x) / (denom * denom))
            }
            ProjectionModel::Pipe => {
                let denom = (1.0 - f) + f * (2.0 * x - 1.0);
                (x / denom, -x0 * x * (2.0 * x - 2.0) / (denom * denom))
            }
            ProjectionModel::Linear => (1.0, x),
        }
    }

    /// Starting point for the solver, given the value at the reference run.
    pub fn initial_guess(self, reference_value: f64) -> (f64, f64) {
        match self {
            ProjectionModel::Amdahl | ProjectionModel::Pipe => (reference_value, 0.5),
            ProjectionModel::Linear => (reference_value, 0.0),
        }
    }

    /// Right-hand side of a gnuplot function definition.
    ///
    /// Parameters are written in `Debug` form so that integral values keep a
    /// decimal point and gnuplot never falls back to integer arithmetic.
    pub fn gnuplot_expr(self, x0: f64, f: f64) -> String {
        match self {
            ProjectionModel::Amdahl => {
                format!("{:?} / ( {:?} + ( 1 - {:?} ) * x )", x0, f, f)
            }
            ProjectionModel::Pipe => {
                format!("{:?} * x / ( ( 1 - {:?} ) + {:?} * ( 2 * x - 1 ) )", x0, f, f)
            }
            ProjectionModel::Linear => format!("{:?} + x * {:?}", x0, f),
        }
    }
}

impl fmt::Display for ProjectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionModel::Amdahl => f.write_str("amdahl"),
            ProjectionModel::Pipe => f.write_str("pipe"),
            ProjectionModel::Linear => f.write_str("linear"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_at_single_process() {
        // Amdahl and pipe both reduce to x0 at x = 1 for any f
        for f in [0.0, 0.3, 1.0] {
            assert!((ProjectionModel::Amdahl.eval(1.0, 90.0, f) - 90.0).abs() < 1e-12);
            assert!((ProjectionModel::Pipe.eval(1.0, 90.0, f) - 90.0).abs() < 1e-12);
        }
        assert_eq!(ProjectionModel::Linear.eval(1.0, 90.0, 2.0), 92.0);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let h = 1e-6;
        for model in [
            ProjectionModel::Amdahl,
            ProjectionModel::Pipe,
            ProjectionModel::Linear,
        ] {
            let (x, x0, f) = (8.0, 95.0, 0.2);
            let (dx0, df) = model.gradient(x, x0, f);
            let num_dx0 = (model.eval(x, x0 + h, f) - model.eval(x, x0 - h, f)) / (2.0 * h);
            let num_df = (model.eval(x, x0, f + h) - model.eval(x, x0, f - h)) / (2.0 * h);
            assert!((dx0 - num_dx0).abs() < 1e-5, "{model}: {dx0} vs {num_dx0}");
            assert!((df - num_df).abs() < 1e-3, "{model}: {df} vs {num_df}");
        }
    }

    #[test]
    fn test_gnuplot_expr() {
        assert_eq!(
            ProjectionModel::Amdahl.gnuplot_expr(100.0, 0.5),
            "100.0 / ( 0.5 + ( 1 - 0.5 ) * x )"
        );
        assert_eq!(ProjectionModel::Linear.gnuplot_expr(1.5, -0.25), "1.5 + x * -0.25");
    }

    #[test]
    fn test_gnuplot_expr_keeps_clamped_fraction_float() {
        assert_eq!(
            ProjectionModel::Amdahl.gnuplot_expr(80.0, 1.0),
            "80.0 / ( 1.0 + ( 1 - 1.0 ) * x )"
        );
        assert_eq!(
            ProjectionModel::Pipe.gnuplot_expr(80.0, 0.0),
            "80.0 * x / ( ( 1 - 0.0 ) + 0.0 * ( 2 * x - 1 ) )"
        );
    }
}
