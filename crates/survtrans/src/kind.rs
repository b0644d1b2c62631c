//! Transformation families and their per-kind constants.

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Supported polynomial degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PolynomialDegree {
    /// Cubic, 10 terms per axis.
    Third,
    /// Quartic, 15 terms per axis.
    Fourth,
    /// Quintic, 21 terms per axis.
    Fifth,
}

impl PolynomialDegree {
    /// Numeric degree (3, 4 or 5).
    pub fn value(self) -> u8 {
        match self {
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Fifth => 5,
        }
    }

    /// Number of monomials of total degree `<= d` in two variables.
    pub fn n_terms(self) -> usize {
        let d = self.value() as usize;
        (d + 1) * (d + 2) / 2
    }
}

impl TryFrom<u8> for PolynomialDegree {
    type Error = TransformError;

    fn try_from(d: u8) -> Result<Self, Self::Error> {
        match d {
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            5 => Ok(Self::Fifth),
            other => Err(TransformError::InvalidDegree(other)),
        }
    }
}

impl From<PolynomialDegree> for u8 {
    fn from(d: PolynomialDegree) -> Self {
        d.value()
    }
}

/// Transformation family selected for a fit.
///
/// Each variant fixes the minimum number of control points, the parameter
/// vector length and the evaluation basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationKind {
    /// Translation + uniform scale + rotation: `[tE, tN, c, s]`.
    Orthogonal,
    /// Independent linear map per axis: `[a0, a1, a2, a3, a4, a5]`.
    Affine,
    /// Full bivariate polynomial per axis.
    Polynomial(PolynomialDegree),
}

impl TransformationKind {
    /// Every kind, ordered by increasing minimum point count.
    pub const ALL: [TransformationKind; 5] = [
        Self::Orthogonal,
        Self::Affine,
        Self::Polynomial(PolynomialDegree::Third),
        Self::Polynomial(PolynomialDegree::Fourth),
        Self::Polynomial(PolynomialDegree::Fifth),
    ];

    /// Polynomial kind from a raw degree.
    pub fn polynomial(degree: u8) -> Result<Self, TransformError> {
        PolynomialDegree::try_from(degree).map(Self::Polynomial)
    }

    /// Minimum number of control points: one equation pair per point must
    /// cover every unknown.
    pub fn min_points(self) -> usize {
        match self {
            Self::Orthogonal => 2,
            Self::Affine => 3,
            Self::Polynomial(d) => d.n_terms(),
        }
    }

    /// Length of the parameter vector.
    pub fn n_params(self) -> usize {
        match self {
            Self::Orthogonal => 4,
            Self::Affine => 6,
            Self::Polynomial(d) => 2 * d.n_terms(),
        }
    }

    /// Kinds whose minimum is met by `n_used` control points.
    pub fn available_for(n_used: usize) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|k| n_used >= k.min_points())
            .collect()
    }

    /// Report title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Orthogonal => "Orthogonal transformation",
            Self::Affine => "Affine transformation",
            Self::Polynomial(PolynomialDegree::Third) => "3rd order polynomial transformation",
            Self::Polynomial(PolynomialDegree::Fourth) => "4th order polynomial transformation",
            Self::Polynomial(PolynomialDegree::Fifth) => "5th order polynomial transformation",
        }
    }
}

impl std::fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
