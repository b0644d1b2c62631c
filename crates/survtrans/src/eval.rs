//! Applying fitted parameters to points.
//!
//! The monomial basis here is the one the polynomial fitter builds its design
//! matrix from, so re-applying a fit to a control point reproduces its
//! least-squares residual.

use serde::{Deserialize, Serialize};

use crate::kind::{PolynomialDegree, TransformationKind};
use crate::point::Point;

/// Similarity frame applied to from-coordinates before evaluation:
/// `u = (e − e0)·k`, `v = (n − n0)·k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// `[e0, n0]`, the centroid of the control points.
    pub origin: [f64; 2],
    /// `k`, chosen so the mean control-point distance from `origin` is √2.
    pub scale: f64,
}

impl Normalization {
    pub const IDENTITY: Self = Self {
        origin: [0.0, 0.0],
        scale: 1.0,
    };

    /// Centroid shift and isotropic scaling for a point set.
    ///
    /// Falls back to unit scale when all points coincide.
    pub fn from_points(points: &[[f64; 2]]) -> Self {
        if points.is_empty() {
            return Self::IDENTITY;
        }
        let n = points.len() as f64;
        let mean_e = points.iter().map(|p| p[0]).sum::<f64>() / n;
        let mean_n = points.iter().map(|p| p[1]).sum::<f64>() / n;

        let mean_dist = points
            .iter()
            .map(|p| ((p[0] - mean_e).powi(2) + (p[1] - mean_n).powi(2)).sqrt())
            .sum::<f64>()
            / n;

        let scale = if mean_dist > 1e-15 {
            std::f64::consts::SQRT_2 / mean_dist
        } else {
            1.0
        };

        Self {
            origin: [mean_e, mean_n],
            scale,
        }
    }

    /// Map raw `(e, n)` into the normalized frame.
    #[inline]
    pub fn apply(&self, e: f64, n: f64) -> [f64; 2] {
        [
            (e - self.origin[0]) * self.scale,
            (n - self.origin[1]) * self.scale,
        ]
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Monomials of total degree `<= degree` evaluated at `(u, v)`, written into
/// `out` (cleared first).
///
/// Order: by total degree ascending, then by descending power of `u`:
/// `1, u, v, u², uv, v², u³, u²v, uv², v³, …`.
pub fn monomial_basis(degree: PolynomialDegree, u: f64, v: f64, out: &mut Vec<f64>) {
    let d = degree.value() as usize;
    let mut pu = [1.0f64; 6];
    let mut pv = [1.0f64; 6];
    for k in 1..=d {
        pu[k] = pu[k - 1] * u;
        pv[k] = pv[k - 1] * v;
    }

    out.clear();
    for total in 0..=d {
        for i in (0..=total).rev() {
            out.push(pu[i] * pv[total - i]);
        }
    }
    debug_assert_eq!(out.len(), degree.n_terms());
}

/// Evaluate a parameter vector of `kind` at `(e, n)`.
///
/// Coordinates are taken in the frame the parameters were fitted in, so
/// callers outside the crate go through [`FittedTransformation::apply`].
/// `params.len()` must equal `kind.n_params()`.
pub(crate) fn evaluate(kind: TransformationKind, params: &[f64], e: f64, n: f64) -> [f64; 2] {
    debug_assert_eq!(params.len(), kind.n_params());
    match kind {
        TransformationKind::Orthogonal => {
            let (te, tn, c, s) = (params[0], params[1], params[2], params[3]);
            [te + c * e - s * n, tn + s * e + c * n]
        }
        TransformationKind::Affine => [
            params[0] + params[1] * e + params[2] * n,
            params[3] + params[4] * e + params[5] * n,
        ],
        TransformationKind::Polynomial(degree) => {
            let mut basis = Vec::with_capacity(degree.n_terms());
            monomial_basis(degree, e, n, &mut basis);
            let (ce, cn) = params.split_at(basis.len());
            [dot(ce, &basis), dot(cn, &basis)]
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale, rotation and translation of an orthogonal fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityParams {
    /// `[tE, tN]`.
    pub translation: [f64; 2],
    /// `√(c² + s²)`.
    pub scale: f64,
    /// `atan2(s, c)` in radians, counter-clockwise from the easting axis.
    pub rotation: f64,
}

/// Result of a fit: kind, parameters and the frame they are expressed in.
///
/// This is the unit of evaluation. A polynomial parameter vector alone does
/// not describe the mapping; persist and apply the whole value (it
/// serializes with its [`Normalization`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformation {
    kind: TransformationKind,
    params: Vec<f64>,
    normalization: Normalization,
    n_points: usize,
}

impl FittedTransformation {
    pub(crate) fn new(
        kind: TransformationKind,
        params: Vec<f64>,
        normalization: Normalization,
        n_points: usize,
    ) -> Self {
        debug_assert_eq!(params.len(), kind.n_params());
        Self {
            kind,
            params,
            normalization,
            n_points,
        }
    }

    pub fn kind(&self) -> TransformationKind {
        self.kind
    }

    /// Parameter vector (see [`TransformationKind`] for the layout).
    ///
    /// Orthogonal and affine parameters are in raw coordinates; polynomial
    /// coefficients apply to [`Self::normalization`] coordinates.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// Number of control points used by the fit.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Transform raw `(e, n)`.
    pub fn apply(&self, e: f64, n: f64) -> [f64; 2] {
        let [u, v] = self.normalization.apply(e, n);
        evaluate(self.kind, &self.params, u, v)
    }

    /// Transform a point's coordinates.
    pub fn apply_to(&self, point: &Point) -> [f64; 2] {
        self.apply(point.e, point.n)
    }

    /// Derived scale/rotation for orthogonal fits.
    pub fn similarity(&self) -> Option<SimilarityParams> {
        if self.kind != TransformationKind::Orthogonal {
            return None;
        }
        let (c, s) = (self.params[2], self.params[3]);
        Some(SimilarityParams {
            translation: [self.params[0], self.params[1]],
            scale: c.hypot(s),
            rotation: s.atan2(c),
        })
    }
}
