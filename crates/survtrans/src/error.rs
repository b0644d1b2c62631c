//! Error type shared by matching, fitting and the calculation session.

use thiserror::Error;

use crate::kind::TransformationKind;

/// Errors that terminate a transformation calculation.
///
/// No variant carries partial results: the caller re-fits from scratch after
/// correcting the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Fewer control points than the transformation kind requires.
    #[error("{kind} needs at least {needed} control points, got {got}")]
    InsufficientPoints {
        /// Requested transformation.
        kind: TransformationKind,
        /// Required minimum number of control points.
        needed: usize,
        /// Provided number of control points.
        got: usize,
    },
    /// The design matrix is rank-deficient or too ill-conditioned to solve.
    #[error("singular system: condition number {condition:e} exceeds tolerance")]
    SingularSystem {
        /// Estimated condition number (`inf` for an exactly singular matrix).
        condition: f64,
    },
    /// A control point identifier is missing from one of the coordinate lists.
    #[error("point '{id}' is not present in the {list} list")]
    MismatchedIdentifier {
        /// Offending point identifier.
        id: String,
        /// Which side the identifier is missing from (`from` or `to`).
        list: &'static str,
    },
    /// A control point has a NaN or infinite coordinate.
    #[error("point '{id}' has non-finite coordinates in the {list} list")]
    NonFiniteCoordinate {
        /// Offending point identifier.
        id: String,
        /// Which side carries the bad coordinate (`from` or `to`).
        list: &'static str,
    },
    /// Polynomial degree outside the supported 3..=5 range.
    #[error("unsupported polynomial degree {0} (expected 3, 4 or 5)")]
    InvalidDegree(u8),
    /// The coordinate source has no list with this name.
    #[error("unknown coordinate list '{0}'")]
    UnknownCoordinateList(String),
    /// The coordinate sink refused a point.
    #[error("failed to store point into '{target}': {reason}")]
    Store {
        /// Target list name.
        target: String,
        /// Sink-provided reason.
        reason: String,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TransformError>;
