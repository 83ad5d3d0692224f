//! Tagged scalar used for every raw counter and derived factor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A measured or derived number, or the marker that it could not be obtained.
///
/// `Value` always holds a finite float. Anything non-finite collapses to
/// `Missing`, so a missing input can never masquerade as zero or NaN
/// arithmetic further down the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Metric {
    Value(f64),
    #[default]
    Missing,
}

impl Metric {
    /// Wrap a float, mapping NaN and infinities to `Missing`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Metric::Value(value)
        } else {
            Metric::Missing
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Metric::Missing)
    }

    /// `self / rhs`; missing on a missing operand or a zero denominator.
    pub fn div(self, rhs: Metric) -> Metric {
        match (self, rhs) {
            (Metric::Value(_), Metric::Value(d)) if d == 0.0 => Metric::Missing,
            (Metric::Value(n), Metric::Value(d)) => Metric::new(n / d),
            _ => Metric::Missing,
        }
    }

    pub fn mul(self, rhs: Metric) -> Metric {
        match (self, rhs) {
            (Metric::Value(a), Metric::Value(b)) => Metric::new(a * b),
            _ => Metric::Missing,
        }
    }

    /// Multiply by a plain constant.
    pub fn scale(self, factor: f64) -> Metric {
        self.mul(Metric::new(factor))
    }

    /// Write the value with `precision` decimals, or the literal `NaN`.
    pub fn format(self, precision: usize) -> String {
        match self {
            Metric::Value(v) => format!("{:.*}", precision, v),
            Metric::Missing => "NaN".to_string(),
        }
    }

    /// Parse an exported field: a float or `NaN`.
    pub fn parse(field: &str) -> Option<Metric> {
        let field = field.trim();
        if field.eq_ignore_ascii_case("nan") {
            return Some(Metric::Missing);
        }
        field.parse::<f64>().ok().map(Metric::new)
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric::new(value)
    }
}

impl From<Option<f64>> for Metric {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Metric::Missing, Metric::new)
    }
}

impl From<Metric> for Option<f64> {
    fn from(metric: Metric) -> Self {
        metric.value()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{}", v),
            Metric::Missing => f.write_str("NaN"),
        }
    }
}
