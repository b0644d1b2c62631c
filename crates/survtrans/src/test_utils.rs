//! Synthetic control-point generators shared by unit tests.

use crate::point::{ControlPointPair, CoordinateList, Point};

/// `nx × ny` grid of points starting at `origin` with spacing `step`.
pub(crate) fn grid_points(origin: [f64; 2], step: f64, nx: usize, ny: usize) -> Vec<[f64; 2]> {
    let mut pts = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            pts.push([origin[0] + i as f64 * step, origin[1] + j as f64 * step]);
        }
    }
    pts
}

/// Similarity map `t + scale · R(rotation) · p`.
pub(crate) fn similarity_fn(
    scale: f64,
    rotation: f64,
    translation: [f64; 2],
) -> impl Fn([f64; 2]) -> [f64; 2] + Copy {
    let (c, s) = (scale * rotation.cos(), scale * rotation.sin());
    move |[e, n]| {
        [
            translation[0] + c * e - s * n,
            translation[1] + s * e + c * n,
        ]
    }
}

pub(crate) fn pair(id: &str, from: [f64; 2], to: [f64; 2]) -> ControlPointPair {
    ControlPointPair::new(Point::new(id, from[0], from[1]), Point::new(id, to[0], to[1]))
        .expect("same id")
}

/// Pairs `P0, P1, …` with targets produced by `map`.
pub(crate) fn pairs_mapped<F>(from: &[[f64; 2]], map: F) -> Vec<ControlPointPair>
where
    F: Fn([f64; 2]) -> [f64; 2],
{
    from.iter()
        .enumerate()
        .map(|(i, &p)| pair(&format!("P{i}"), p, map(p)))
        .collect()
}

/// Coordinate list `P0, P1, …` from raw coordinates.
pub(crate) fn coordinate_list(points: &[[f64; 2]]) -> CoordinateList {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| Point::new(format!("P{i}"), p[0], p[1]))
        .collect()
}
