use serde::{Deserialize, Serialize};

/// Decomposition used to solve the least-squares system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// Householder QR of the design matrix.
    #[default]
    Qr,
    /// Cholesky factorization of `AᵀA`.
    NormalEquations,
}

/// Configuration for the dense least-squares solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Decomposition used for the solve.
    pub method: SolveMethod,
    /// Largest accepted condition number of the (normalized) design matrix.
    ///
    /// Systems above this are refused as singular rather than regularized.
    pub max_condition_number: f64,
    /// Shift the from-coordinates to their centroid and scale them to a mean
    /// distance of √2 before building the design matrix.
    pub normalize: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolveMethod::Qr,
            max_condition_number: 1e10,
            normalize: true,
        }
    }
}

/// Top-level configuration passed to [`crate::Transformer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Least-squares solver settings.
    pub solver: SolverConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: TransformConfig =
            serde_json::from_str(r#"{"solver":{"method":"normal_equations"}}"#).expect("parse");
        assert_eq!(cfg.solver.method, SolveMethod::NormalEquations);
        assert_eq!(cfg.solver.max_condition_number, 1e10);
        assert!(cfg.solver.normalize);

        let empty: TransformConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(empty, TransformConfig::default());
    }
}
