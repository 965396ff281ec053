//! Point datasets and the merged terrain record format.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An ordered set of 2D points sharing one coordinate frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// X coordinates of all points.
    pub x: Vec<f64>,
    /// Y coordinates of all points.
    pub y: Vec<f64>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl Dataset {
    /// Creates a new empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dataset from coordinate vectors.
    pub fn from_xy(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len(), "x and y must have same length");
        Self {
            x,
            y,
            source_path: None,
        }
    }

    /// Creates a dataset from `(x, y)` pairs.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let (x, y) = points.iter().copied().unzip();
        Self::from_xy(x, y)
    }

    /// Creates a dataset with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            source_path: None,
        }
    }

    /// Returns the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the dataset has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Iterates over `(x, y)` pairs in insertion order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Display name used in log messages.
    pub fn label(&self) -> String {
        self.source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// A categorized point as consumed by the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "type")]
    pub category: String,
}

impl PointRecord {
    pub fn new(x: f64, y: f64, category: impl Into<String>) -> Self {
        Self {
            x,
            y,
            category: category.into(),
        }
    }
}

/// Merged, tagged terrain points keyed the way the engine reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainData {
    #[serde(rename = "terrainData")]
    pub records: Vec<PointRecord>,
}

impl TerrainData {
    pub fn new(records: Vec<PointRecord>) -> Self {
        Self { records }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records carrying the given category, in order.
    pub fn with_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a PointRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }
}
