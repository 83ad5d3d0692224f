//! Weighted nonlinear least squares for the two-parameter models
//!
//! Levenberg-Marquardt on the 2x2 normal equations. With bounds enabled every
//! trial step is projected onto `f ∈ [0, 1]` before it is evaluated, so the
//! accepted parameters never leave the feasible box.

use super::model::ProjectionModel;
use nalgebra::{Matrix2, Vector2};
use tracing::debug;

const MAX_ITERATIONS: usize = 500;
const MAX_LAMBDA: f64 = 1e16;
const COST_TOLERANCE: f64 = 1e-12;
const STEP_TOLERANCE: f64 = 1e-12;

/// Box constraints on `(x0, f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub f_min: f64,
    pub f_max: f64,
}

impl Bounds {
    /// `f ∈ [0, 1]`, `x0` unconstrained
    pub const UNIT_FRACTION: Bounds = Bounds {
        f_min: 0.0,
        f_max: 1.0,
    };

    fn project(&self, p: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(p[0], p[1].clamp(self.f_min, self.f_max))
    }
}

/// Fitted parameters of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub x0: f64,
    pub f: f64,
    /// Parameter covariance; `None` when the data leave no residual degrees
    /// of freedom or the normal matrix is singular.
    pub covariance: Option<Matrix2<f64>>,
    /// Weighted sum of squared residuals at the solution
    pub chi_squared: f64,
    pub points: usize,
    pub iterations: usize,
}

struct Problem<'a> {
    model: ProjectionModel,
    xs: &'a [f64],
    ys: &'a [f64],
    sigma: &'a [f64],
}

impl Problem<'_> {
    fn cost(&self, p: &Vector2<f64>) -> f64 {
        self.xs
            .iter()
            .zip(self.ys)
            .zip(self.sigma)
            .map(|((&x, &y), &s)| {
                let r = (y - self.model.eval(x, p[0], p[1])) / s;
                r * r
            })
            .sum()
    }

    /// Normal matrix `JᵀJ` and gradient `Jᵀr` of the weighted residuals.
    fn normal_equations(&self, p: &Vector2<f64>) -> (Matrix2<f64>, Vector2<f64>) {
        let mut jtj = Matrix2::zeros();
        let mut jtr = Vector2::zeros();
        for ((&x, &y), &s) in self.xs.iter().zip(self.ys).zip(self.sigma) {
            let (d_x0, d_f) = self.model.gradient(x, p[0], p[1]);
            let row = Vector2::new(d_x0 / s, d_f / s);
            let r = (y - self.model.eval(x, p[0], p[1])) / s;
            jtj += row * row.transpose();
            jtr += row * r;
        }
        (jtj, jtr)
    }
}

/// Reasons the solver could not produce parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Fewer points than free parameters
    TooFewPoints(usize),
    /// The cost at the starting point or at the solution is not finite
    NonFinite,
}

/// Fit `model` to the points `(xs[i], ys[i])` weighted by `1 / sigma[i]`.
pub fn curve_fit(
    model: ProjectionModel,
    xs: &[f64],
    ys: &[f64],
    sigma: &[f64],
    bounds: Option<Bounds>,
    initial: (f64, f64),
) -> Result<FitResult, SolveError> {
    debug_assert!(xs.len() == ys.len() && ys.len() == sigma.len());
    let n = xs.len();
    if n < ProjectionModel::PARAMETERS {
        return Err(SolveError::TooFewPoints(n));
    }

    let problem = Problem {
        model,
        xs,
        ys,
        sigma,
    };
    let project = |p: Vector2<f64>| bounds.map_or(p, |b| b.project(p));

    let mut p = project(Vector2::new(initial.0, initial.1));
    let mut cost = problem.cost(&p);
    if !cost.is_finite() {
        return Err(SolveError::NonFinite);
    }

    let mut lambda = 1e-3;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let (jtj, jtr) = problem.normal_equations(&p);

        let mut improved = false;
        while lambda < MAX_LAMBDA {
            let mut damped = jtj;
            for i in 0..2 {
                damped[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
            }
            let Some(step) = damped.lu().solve(&jtr) else {
                lambda *= 10.0;
                continue;
            };

            let candidate = project(p + step);
            let candidate_cost = problem.cost(&candidate);
            if candidate_cost.is_finite() && candidate_cost <= cost {
                let step_size = (candidate - p).norm();
                let cost_drop = cost - candidate_cost;
                p = candidate;
                cost = candidate_cost;
                lambda = (lambda / 10.0).max(1e-12);
                improved = cost_drop > COST_TOLERANCE * cost.max(1e-300)
                    && step_size > STEP_TOLERANCE * (p.norm() + STEP_TOLERANCE);
                break;
            }
            lambda *= 10.0;
        }

        if !improved {
            break;
        }
    }

    if !(p[0].is_finite() && p[1].is_finite() && cost.is_finite()) {
        return Err(SolveError::NonFinite);
    }

    let (jtj, _) = problem.normal_equations(&p);
    let covariance = if n > ProjectionModel::PARAMETERS {
        let dof = (n - ProjectionModel::PARAMETERS) as f64;
        jtj.try_inverse().map(|inv| inv * (cost / dof))
    } else {
        None
    };

    debug!(
        "{} fit converged after {} iterations: x0 = {}, f = {}, chi2 = {}",
        model, iterations, p[0], p[1], cost
    );

    Ok(FitResult {
        x0: p[0],
        f: p[1],
        covariance,
        chi_squared: cost,
        points: n,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(model: ProjectionModel, x0: f64, f: f64, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| model.eval(x, x0, f)).collect()
    }

    #[test]
    fn test_recovers_exact_amdahl_parameters() {
        let xs = [1.0, 2.0, 4.0, 8.0, 16.0];
        let ys = sample(ProjectionModel::Amdahl, 100.0, 0.95, &xs);
        let sigma = vec![1.0; xs.len()];

        let fit = curve_fit(
            ProjectionModel::Amdahl,
            &xs,
            &ys,
            &sigma,
            Some(Bounds::UNIT_FRACTION),
            (ys[0], 0.5),
        )
        .unwrap();

        assert!((fit.x0 - 100.0).abs() < 1e-4, "x0 = {}", fit.x0);
        assert!((fit.f - 0.95).abs() < 1e-4, "f = {}", fit.f);
        assert!(fit.chi_squared < 1e-6);
        assert!(fit.covariance.is_some());
    }

    #[test]
    fn test_linear_fit_unbounded() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = sample(ProjectionModel::Linear, 3.0, -2.5, &xs);
        let sigma = vec![1.0; xs.len()];

        let fit = curve_fit(ProjectionModel::Linear, &xs, &ys, &sigma, None, (ys[0], 0.0)).unwrap();
        assert!((fit.x0 - 3.0).abs() < 1e-6);
        assert!((fit.f + 2.5).abs() < 1e-6);
    }

    /// Gradient of the cost, scaled per parameter so that values near zero mean
    /// a stationary point regardless of the residual magnitude.
    fn normalized_gradient(
        model: ProjectionModel,
        xs: &[f64],
        ys: &[f64],
        fit: &FitResult,
    ) -> [f64; 2] {
        let sigma = vec![1.0; xs.len()];
        let problem = Problem {
            model,
            xs,
            ys,
            sigma: &sigma,
        };
        let p = Vector2::new(fit.x0, fit.f);
        let (jtj, jtr) = problem.normal_equations(&p);
        let cost = problem.cost(&p);
        [
            jtr[0].abs() / (jtj[(0, 0)] * cost).sqrt(),
            jtr[1].abs() / (jtj[(1, 1)] * cost).sqrt(),
        ]
    }

    #[test]
    fn test_unbounded_amdahl_beyond_unit_fraction() {
        // f > 1 puts the pole at x = f / (f - 1) = 51, past the last run
        let xs = [1.0, 2.0, 4.0, 8.0, 16.0];
        let ys = sample(ProjectionModel::Amdahl, 100.0, 1.02, &xs);
        let sigma = vec![1.0; xs.len()];

        let fit =
            curve_fit(ProjectionModel::Amdahl, &xs, &ys, &sigma, None, (ys[0], 0.5)).unwrap();
        assert!((fit.x0 - 100.0).abs() < 1e-6, "x0 = {}", fit.x0);
        assert!((fit.f - 1.02).abs() < 1e-6, "f = {}", fit.f);
        assert!(fit.chi_squared < 1e-10);
    }

    #[test]
    fn test_unbounded_pipe_negative_fraction() {
        // Denominator 1 + f * (2x - 2) falls to 0.3 at x = 8
        let xs = [1.0, 2.0, 4.0, 8.0];
        let ys = sample(ProjectionModel::Pipe, 50.0, -0.05, &xs);
        let sigma = vec![1.0; xs.len()];

        let fit =
            curve_fit(ProjectionModel::Pipe, &xs, &ys, &sigma, None, (ys[0], 0.5)).unwrap();
        assert!((fit.x0 - 50.0).abs() < 1e-6, "x0 = {}", fit.x0);
        assert!((fit.f + 0.05).abs() < 1e-6, "f = {}", fit.f);
        assert!(fit.chi_squared < 1e-10);
    }

    #[test]
    fn test_noisy_fit_ends_at_stationary_point() {
        let xs = [1.0, 2.0, 4.0, 8.0, 16.0];
        let ys = [100.0, 88.0, 79.0, 57.0, 41.0];
        let sigma = vec![1.0; xs.len()];

        for model in [ProjectionModel::Amdahl, ProjectionModel::Pipe] {
            let fit = curve_fit(model, &xs, &ys, &sigma, None, (ys[0], 0.5)).unwrap();
            assert!(fit.chi_squared > 1.0, "{model}: noise must leave a residual");
            let gradient = normalized_gradient(model, &xs, &ys, &fit);
            assert!(
                gradient.iter().all(|g| *g < 1e-6),
                "{model}: gradient {:?} at x0 = {}, f = {}",
                gradient,
                fit.x0,
                fit.f
            );
        }
    }

    #[test]
    fn test_bounds_clamp_fraction() {
        // Growing series would need a negative serial fraction
        let xs = [1.0, 2.0, 4.0];
        let ys = [50.0, 90.0, 150.0];
        let sigma = [1.0, 1.0, 1.0];

        let fit = curve_fit(
            ProjectionModel::Amdahl,
            &xs,
            &ys,
            &sigma,
            Some(Bounds::UNIT_FRACTION),
            (50.0, 0.5),
        )
        .unwrap();
        assert!((0.0..=1.0).contains(&fit.f), "f = {}", fit.f);
    }

    #[test]
    fn test_two_points_have_no_covariance() {
        let xs = [1.0, 4.0];
        let ys = [100.0, 80.0];
        let fit = curve_fit(
            ProjectionModel::Linear,
            &xs,
            &ys,
            &[0.1, 1.0],
            None,
            (100.0, 0.0),
        )
        .unwrap();
        assert!(fit.covariance.is_none());
        assert!((fit.x0 + 4.0 * fit.f - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_point_rejected() {
        let result = curve_fit(
            ProjectionModel::Amdahl,
            &[1.0],
            &[100.0],
            &[1.0],
            None,
            (100.0, 0.5),
        );
        assert_eq!(result, Err(SolveError::TooFewPoints(1)));
    }
}
