//! Common-point discovery and control-pair assembly between two coordinate
//! lists.

use crate::error::{Result, TransformError};
use crate::point::{ControlPointPair, CoordinateList, Point};

/// Identifiers present in both lists with finite coordinates on both sides.
///
/// Order follows `from`. An empty intersection is an empty vector; the
/// caller decides how to surface it.
pub fn common_points(from: &CoordinateList, to: &CoordinateList) -> Vec<String> {
    let mut common = Vec::new();
    for p in from {
        let Some(q) = to.get(&p.id) else {
            continue;
        };
        if !p.is_finite() || !q.is_finite() {
            tracing::warn!(id = %p.id, "skipping common point with non-finite coordinates");
            continue;
        }
        common.push(p.id.clone());
    }
    tracing::debug!(
        n_from = from.len(),
        n_to = to.len(),
        n_common = common.len(),
        "matched coordinate lists"
    );
    common
}

/// Control pairs for an explicit, ordered selection of identifiers.
///
/// Every identifier must be present in both lists with finite coordinates;
/// the selection is not trusted to come from [`common_points`].
pub fn control_pairs<S: AsRef<str>>(
    from: &CoordinateList,
    to: &CoordinateList,
    used: &[S],
) -> Result<Vec<ControlPointPair>> {
    used.iter()
        .map(|id| {
            let id = id.as_ref();
            let p = lookup(from, id, "from")?;
            let q = lookup(to, id, "to")?;
            ControlPointPair::new(p.clone(), q.clone()).ok_or_else(|| {
                TransformError::MismatchedIdentifier {
                    id: id.to_string(),
                    list: "to",
                }
            })
        })
        .collect()
}

fn lookup<'a>(list: &'a CoordinateList, id: &str, side: &'static str) -> Result<&'a Point> {
    let point = list
        .get(id)
        .ok_or_else(|| TransformError::MismatchedIdentifier {
            id: id.to_string(),
            list: side,
        })?;
    if !point.is_finite() {
        return Err(TransformError::NonFiniteCoordinate {
            id: id.to_string(),
            list: side,
        });
    }
    Ok(point)
}
