//! High-level calculation API.
//!
//! [`Transformer`] is the primary entry point. It wraps a
//! [`TransformConfig`] and runs a complete calculation session against an
//! injected [`CoordinateSource`] and [`CoordinateSink`]:
//! match → fit → residuals → transform all → store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::eval::FittedTransformation;
use crate::fit::fit;
use crate::kind::TransformationKind;
use crate::matcher::{common_points, control_pairs};
use crate::point::{ControlPointPair, CoordinateList, Point};
use crate::residual::{apply_all, format_report, residuals, Residual, ResidualStats};
use crate::store::{CoordinateSink, CoordinateSource};

/// One calculation request: which lists, which control points, which model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Name of the source ("from") coordinate list.
    pub from_list: String,
    /// Name of the target ("to") coordinate list; transformed points are
    /// stored here.
    pub to_list: String,
    /// Identifiers selected as control points, in display order.
    pub used: Vec<String>,
    pub kind: TransformationKind,
}

/// Outcome of a successful calculation session.
#[derive(Debug, Clone)]
pub struct TransformReport {
    /// Fitted transformation.
    pub fitted: FittedTransformation,
    /// Residuals on the used control points, in selection order.
    pub residuals: Vec<Residual>,
    /// Summary of `residuals`.
    pub stats: ResidualStats,
    /// Every from point transformed, in from-list order.
    pub transformed: Vec<Point>,
    /// Identifiers written to the target list (from points that are not
    /// common points).
    pub stored: Vec<String>,
    from: CoordinateList,
}

impl TransformReport {
    /// Fixed-width text listing of residuals and newly stored points.
    pub fn to_text(&self) -> String {
        let stored: HashSet<&str> = self.stored.iter().map(String::as_str).collect();
        let rows = self
            .transformed
            .iter()
            .filter(|p| stored.contains(p.id.as_str()))
            .filter_map(|p| self.from.get(&p.id).map(|src| (src, p)));
        format_report(self.fitted.kind(), &self.residuals, rows)
    }
}

/// Primary calculation interface.
///
/// Holds configuration only; every call is independent.
///
/// # Examples
///
/// ```
/// use survtrans::{
///     CoordinateList, MemoryStore, Point, TransformRequest, TransformationKind, Transformer,
/// };
///
/// let from: CoordinateList = [
///     Point::new("A", 0.0, 0.0),
///     Point::new("B", 10.0, 0.0),
///     Point::new("C", 0.0, 10.0),
///     Point::new("D", 4.0, 4.0),
/// ]
/// .into_iter()
/// .collect();
/// let to: CoordinateList = [
///     Point::new("A", 5.0, 5.0),
///     Point::new("B", 15.0, 5.0),
///     Point::new("C", 5.0, 15.0),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut store = MemoryStore::new();
/// store.insert_list("local", from);
/// store.insert_list("national", to);
///
/// let transformer = Transformer::default();
/// let source = store.clone();
/// let common = transformer.common_points(&source, "local", "national").unwrap();
/// let request = TransformRequest {
///     from_list: "local".into(),
///     to_list: "national".into(),
///     used: common,
///     kind: TransformationKind::Orthogonal,
/// };
/// let report = transformer.calculate(&source, &mut store, &request).unwrap();
/// assert_eq!(report.stored, vec!["D".to_string()]);
/// let d = store.list("national").unwrap().get("D").unwrap();
/// assert!((d.e - 9.0).abs() < 1e-9 && (d.n - 9.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut TransformConfig {
        &mut self.config
    }

    /// Identifiers usable as control points between two named lists.
    pub fn common_points(
        &self,
        source: &dyn CoordinateSource,
        from_list: &str,
        to_list: &str,
    ) -> Result<Vec<String>> {
        let from = load(source, from_list)?;
        let to = load(source, to_list)?;
        Ok(common_points(&from, &to))
    }

    /// Fit `kind` to already assembled control pairs.
    pub fn fit(
        &self,
        kind: TransformationKind,
        pairs: &[ControlPointPair],
    ) -> Result<FittedTransformation> {
        fit(kind, pairs, &self.config.solver)
    }

    /// Run a full calculation session.
    ///
    /// Nothing is written to `sink` unless the fit succeeds. Common points
    /// keep their observed target coordinates; every other from point is
    /// stored into `request.to_list` under its own identifier, in a single
    /// [`CoordinateSink::store_all`] call made after all points are
    /// transformed.
    pub fn calculate(
        &self,
        source: &dyn CoordinateSource,
        sink: &mut dyn CoordinateSink,
        request: &TransformRequest,
    ) -> Result<TransformReport> {
        let from = load(source, &request.from_list)?;
        let to = load(source, &request.to_list)?;

        let pairs = control_pairs(&from, &to, &request.used)?;
        let fitted = match self.fit(request.kind, &pairs) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(kind = %request.kind, "transformation refused: {e}");
                return Err(e);
            }
        };

        let residuals = residuals(&fitted, &pairs);
        let stats = ResidualStats::from_residuals(&residuals);
        tracing::info!(
            kind = %request.kind,
            n_points = pairs.len(),
            rms = stats.rms,
            max = stats.max,
            "transformation fitted"
        );

        let transformed = apply_all(&fitted, &from);
        let common: HashSet<String> = common_points(&from, &to).into_iter().collect();

        let mut batch = Vec::new();
        for p in &transformed {
            if common.contains(&p.id) {
                continue;
            }
            if !p.is_finite() {
                tracing::warn!(id = %p.id, "not storing point with non-finite coordinates");
                continue;
            }
            batch.push(p.clone());
        }
        let stored: Vec<String> = batch.iter().map(|p| p.id.clone()).collect();
        if !batch.is_empty() {
            sink.store_all(batch, &request.to_list)?;
        }
        tracing::info!(
            n_transformed = transformed.len(),
            n_stored = stored.len(),
            target = %request.to_list,
            "stored transformed points"
        );

        Ok(TransformReport {
            fitted,
            residuals,
            stats,
            transformed,
            stored,
            from,
        })
    }
}

fn load(source: &dyn CoordinateSource, name: &str) -> Result<CoordinateList> {
    source
        .coordinate_list(name)
        .ok_or_else(|| TransformError::UnknownCoordinateList(name.to_string()))
}
