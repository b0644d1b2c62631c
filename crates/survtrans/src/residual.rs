//! Residuals on control points, bulk transformation and the text report.

use serde::{Deserialize, Serialize};

use crate::eval::FittedTransformation;
use crate::kind::TransformationKind;
use crate::point::{ControlPointPair, Point, TRANSFORMED_CODE};

/// Difference between an observed and a model-predicted target coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    pub id: String,
    /// Source coordinates `[e, n]`.
    pub from: [f64; 2],
    /// Observed target coordinates.
    pub observed: [f64; 2],
    /// Target coordinates predicted by the fit.
    pub computed: [f64; 2],
    /// `observed.e − computed.e`.
    pub de: f64,
    /// `observed.n − computed.n`.
    pub dn: f64,
}

impl Residual {
    /// 2D length of the residual vector.
    pub fn distance(&self) -> f64 {
        self.de.hypot(self.dn)
    }
}

/// One residual per pair, in input order.
pub fn residuals(fitted: &FittedTransformation, pairs: &[ControlPointPair]) -> Vec<Residual> {
    pairs
        .iter()
        .map(|pair| {
            let computed = fitted.apply_to(pair.from());
            let observed = pair.to().en();
            Residual {
                id: pair.id().to_string(),
                from: pair.from().en(),
                observed,
                computed,
                de: observed[0] - computed[0],
                dn: observed[1] - computed[1],
            }
        })
        .collect()
}

/// Transform every point, keeping its identifier and tagging it with
/// [`TRANSFORMED_CODE`].
pub fn apply_all<'a, I>(fitted: &FittedTransformation, points: I) -> Vec<Point>
where
    I: IntoIterator<Item = &'a Point>,
{
    points
        .into_iter()
        .map(|p| {
            let [e, n] = fitted.apply_to(p);
            Point::new(p.id.clone(), e, n).with_code(TRANSFORMED_CODE)
        })
        .collect()
}

/// Summary of a residual set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidualStats {
    pub n: usize,
    /// RMS of `de`.
    pub rms_e: f64,
    /// RMS of `dn`.
    pub rms_n: f64,
    /// RMS of the 2D residual length.
    pub rms: f64,
    /// Largest 2D residual.
    pub max: f64,
    /// Point identifier of the largest residual.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_id: Option<String>,
}

impl ResidualStats {
    pub fn from_residuals(residuals: &[Residual]) -> Self {
        if residuals.is_empty() {
            return Self::default();
        }
        let n = residuals.len() as f64;
        let sum_e: f64 = residuals.iter().map(|r| r.de * r.de).sum();
        let sum_n: f64 = residuals.iter().map(|r| r.dn * r.dn).sum();

        let mut max = 0.0f64;
        let mut max_id = None;
        for r in residuals {
            let d = r.distance();
            if max_id.is_none() || d > max {
                max = d;
                max_id = Some(r.id.clone());
            }
        }

        Self {
            n: residuals.len(),
            rms_e: (sum_e / n).sqrt(),
            rms_n: (sum_n / n).sqrt(),
            rms: ((sum_e + sum_n) / n).sqrt(),
            max,
            max_id,
        }
    }
}

const REPORT_HEADER: &str =
    "Point num                E from       N from       E to         N to      dE     dN";

/// Fixed-width listing: title, control points with residuals, then
/// `(source, transformed)` rows for the remaining points.
pub fn format_report<'a, I>(
    kind: TransformationKind,
    residuals: &[Residual],
    transformed: I,
) -> String
where
    I: IntoIterator<Item = (&'a Point, &'a Point)>,
{
    let mut lines = vec![kind.title().to_string(), REPORT_HEADER.to_string()];
    lines.extend(residuals.iter().map(|r| {
        format!(
            "{:<20} {:12.3} {:12.3} {:12.3} {:12.3} {:6.3} {:6.3}",
            r.id, r.from[0], r.from[1], r.observed[0], r.observed[1], r.de, r.dn
        )
    }));
    lines.extend(transformed.into_iter().map(|(src, dst)| {
        format!(
            "{:<20} {:12.3} {:12.3} {:12.3} {:12.3}",
            src.id, src.e, src.n, dst.e, dst.n
        )
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
