//! Coordinate storage capabilities injected into a calculation session.
//!
//! The engine never touches layers or files: it reads named coordinate lists
//! through a [`CoordinateSource`] and writes transformed points through a
//! [`CoordinateSink`].

use std::collections::HashMap;

use crate::error::{Result, TransformError};
use crate::point::{CoordinateList, Point};

/// Read access to named coordinate lists.
pub trait CoordinateSource {
    /// Snapshot of the list called `name`, or `None` if it does not exist.
    fn coordinate_list(&self, name: &str) -> Option<CoordinateList>;
}

/// Write access to named coordinate lists.
///
/// A calculation session hands all its points to one [`store_all`] call.
/// Implementations either write the whole batch or nothing.
///
/// [`store_all`]: CoordinateSink::store_all
pub trait CoordinateSink {
    /// Store every point of `points` into the list called `target`,
    /// replacing points with the same identifier. On error the target list
    /// is left unchanged.
    fn store_all(&mut self, points: Vec<Point>, target: &str) -> Result<()>;

    /// Store a single point.
    fn store(&mut self, point: Point, target: &str) -> Result<()> {
        self.store_all(vec![point], target)
    }
}

/// In-memory implementation of both capabilities.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lists: HashMap<String, CoordinateList>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a whole list.
    pub fn insert_list(&mut self, name: impl Into<String>, list: CoordinateList) {
        self.lists.insert(name.into(), list);
    }

    pub fn list(&self, name: &str) -> Option<&CoordinateList> {
        self.lists.get(name)
    }
}

impl CoordinateSource for MemoryStore {
    fn coordinate_list(&self, name: &str) -> Option<CoordinateList> {
        self.lists.get(name).cloned()
    }
}

impl CoordinateSink for MemoryStore {
    fn store_all(&mut self, points: Vec<Point>, target: &str) -> Result<()> {
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(TransformError::Store {
                target: target.to_string(),
                reason: format!("point '{}' has non-finite coordinates", bad.id),
            });
        }
        let list = self.lists.entry(target.to_string()).or_default();
        for point in points {
            list.insert(point);
        }
        Ok(())
    }
}
