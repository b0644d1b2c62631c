//! Dense linear least-squares shared by every transformation fitter.
//!
//! Solves `A·X ≈ B` for one or more right-hand-side columns. Before any
//! decomposition the condition number of `A` is estimated from its singular
//! values; rank-deficient or ill-conditioned systems are refused with
//! [`TransformError::SingularSystem`] instead of being regularized.

use nalgebra::DMatrix;

use crate::config::{SolveMethod, SolverConfig};
use crate::error::{Result, TransformError};

/// Ratio of the largest to the smallest singular value of `a`.
///
/// Returns `f64::INFINITY` for an exactly rank-deficient or empty matrix,
/// when `a` has fewer rows than columns, or when any entry is non-finite.
pub fn condition_number(a: &DMatrix<f64>) -> f64 {
    let (m, n) = a.shape();
    if m < n || n == 0 {
        return f64::INFINITY;
    }
    // The SVD iteration does not converge on NaN/inf input.
    if a.iter().any(|x| !x.is_finite()) {
        return f64::INFINITY;
    }
    let sv = a.clone().svd(false, false).singular_values;
    let s_max = sv.max();
    let s_min = sv.min();
    if !s_max.is_finite() || s_min <= 0.0 {
        return f64::INFINITY;
    }
    s_max / s_min
}

/// Least-squares solution of `a · x ≈ b`, one solution column per column of
/// `b`.
pub fn solve_least_squares(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    config: &SolverConfig,
) -> Result<DMatrix<f64>> {
    debug_assert_eq!(a.nrows(), b.nrows());

    let condition = condition_number(a);
    tracing::debug!(
        rows = a.nrows(),
        cols = a.ncols(),
        condition,
        "least-squares design matrix"
    );
    if condition.is_nan() || condition > config.max_condition_number {
        return Err(TransformError::SingularSystem { condition });
    }

    let singular = || TransformError::SingularSystem { condition };
    match config.method {
        SolveMethod::Qr => {
            let qr = a.clone().qr();
            let qtb = qr.q().transpose() * b;
            qr.r().solve_upper_triangular(&qtb).ok_or_else(singular)
        }
        SolveMethod::NormalEquations => {
            let ata = a.tr_mul(a);
            let atb = a.tr_mul(b);
            ata.cholesky()
                .map(|chol| chol.solve(&atb))
                .ok_or_else(singular)
        }
    }
}
