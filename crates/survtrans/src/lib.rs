//! survtrans: least-squares 2D coordinate transformations for surveying.
//!
//! Given the same physical points measured in two coordinate systems, the
//! crate fits a transformation from a selected subset of common points and
//! applies it to every point of the source system. The stages are:
//!
//! 1. **Match** – identifiers present in both coordinate lists.
//! 2. **Fit** – orthogonal (similarity), affine, or 3rd/4th/5th order
//!    polynomial model by linear least squares (QR or normal equations).
//! 3. **Evaluate** – apply the fitted parameters to any point.
//! 4. **Report** – per-point residuals, summary statistics and a fixed-width
//!    text listing.
//!
//! # Public API
//! - [`Transformer`] runs a whole calculation session against an injected
//!   [`CoordinateSource`] / [`CoordinateSink`].
//! - [`fit`], [`residuals`], [`apply_all`] and [`common_points`] expose the
//!   individual stages for callers that manage their own lists.

mod api;
mod config;
mod error;
mod eval;
mod fit;
mod kind;
mod matcher;
mod point;
mod residual;
mod solver;
mod store;
#[cfg(test)]
mod test_utils;

pub use api::{TransformReport, TransformRequest, Transformer};
pub use config::{SolveMethod, SolverConfig, TransformConfig};
pub use error::{Result, TransformError};
pub use eval::{monomial_basis, FittedTransformation, Normalization, SimilarityParams};
pub use fit::fit;
pub use kind::{PolynomialDegree, TransformationKind};
pub use matcher::{common_points, control_pairs};
pub use point::{ControlPointPair, CoordinateList, Point, TRANSFORMED_CODE};
pub use residual::{apply_all, format_report, residuals, Residual, ResidualStats};
pub use solver::{condition_number, solve_least_squares};
pub use store::{CoordinateSink, CoordinateSource, MemoryStore};
