//! Survey points, coordinate lists and control-point pairs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Classification code attached to points produced by a transformation.
pub const TRANSFORMED_CODE: &str = "transformed";

/// A surveyed point: identifier plus easting/northing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Point identifier, unique within a [`CoordinateList`].
    pub id: String,
    /// Easting.
    pub e: f64,
    /// Northing.
    pub n: f64,
    /// Optional classification code (e.g. [`TRANSFORMED_CODE`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Point {
    /// Point without a classification code.
    pub fn new(id: impl Into<String>, e: f64, n: f64) -> Self {
        Self {
            id: id.into(),
            e,
            n,
            code: None,
        }
    }

    /// Same point with a classification code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// `[e, n]` as an array.
    pub fn en(&self) -> [f64; 2] {
        [self.e, self.n]
    }

    /// Both coordinates are finite (not NaN / inf).
    pub fn is_finite(&self) -> bool {
        self.e.is_finite() && self.n.is_finite()
    }
}

/// Ordered collection of points keyed by identifier.
///
/// Insertion order is kept for display; lookups go through an id index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CoordinateListRepr", into = "CoordinateListRepr")]
pub struct CoordinateList {
    points: Vec<Point>,

    /// Fast lookup: point id -> index into `points`.
    id_to_idx: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct CoordinateListRepr {
    points: Vec<Point>,
}

impl From<CoordinateListRepr> for CoordinateList {
    fn from(repr: CoordinateListRepr) -> Self {
        repr.points.into_iter().collect()
    }
}

impl From<CoordinateList> for CoordinateListRepr {
    fn from(list: CoordinateList) -> Self {
        Self {
            points: list.points,
        }
    }
}

impl CoordinateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point. A point with an existing identifier is replaced in
    /// place and the previous value returned.
    pub fn insert(&mut self, point: Point) -> Option<Point> {
        match self.id_to_idx.get(&point.id) {
            Some(&idx) => Some(std::mem::replace(&mut self.points[idx], point)),
            None => {
                self.id_to_idx.insert(point.id.clone(), self.points.len());
                self.points.push(point);
                None
            }
        }
    }

    /// Look up a point by identifier.
    pub fn get(&self, id: &str) -> Option<&Point> {
        self.id_to_idx.get(id).map(|&idx| &self.points[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_idx.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl FromIterator<Point> for CoordinateList {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut list = Self::new();
        for p in iter {
            list.insert(p);
        }
        list
    }
}

impl<'a> IntoIterator for &'a CoordinateList {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// The same physical point observed in the "from" and "to" systems.
///
/// Only built by the matcher, which guarantees both identifiers are equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlPointPair {
    from: Point,
    to: Point,
}

impl ControlPointPair {
    /// Pair two points; `None` if their identifiers differ.
    pub fn new(from: Point, to: Point) -> Option<Self> {
        (from.id == to.id).then_some(Self { from, to })
    }

    pub fn id(&self) -> &str {
        &self.from.id
    }

    pub fn from(&self) -> &Point {
        &self.from
    }

    pub fn to(&self) -> &Point {
        &self.to
    }
}
