use crate::projection::{ProjectionModel, Sigma};
use serde::{Deserialize, Serialize};

/// Projection (curve fitting) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub model: ProjectionModel,
    /// Constrain the model fraction `f` to `[0, 1]`
    pub bounds: bool,
    pub sigma: Sigma,
    /// Largest process count of the projection
    pub limit: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            model: ProjectionModel::Amdahl,
            bounds: true,
            sigma: Sigma::First,
            limit: 10000,
        }
    }
}
