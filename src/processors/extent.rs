//! Bounding extents over one or more point collections.

use log::warn;
use thiserror::Error;

use crate::config::TerrainRect;
use crate::core::points::{Dataset, TerrainData};

#[derive(Debug, Error, PartialEq)]
pub enum ExtentError {
    #[error("Cannot compute an extent over {datasets} dataset(s) with no points")]
    NoPoints { datasets: usize },
}

/// Axis-aligned `(min_x, max_x, min_y, max_y)` bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingExtent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingExtent {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Extent `[0, width] x [0, height]` of a terrain rectangle.
    pub fn from_rect(rect: TerrainRect) -> Self {
        Self::new(0.0, rect.width, 0.0, rect.height)
    }

    /// Extent of a sequence of points, or `None` when it is empty.
    pub fn of_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points = points.into_iter();
        let (x, y) = points.next()?;
        let seed = Self::new(x, x, y, y);
        Some(points.fold(seed, |acc, (x, y)| {
            acc.union(&Self::new(x, x, y, y))
        }))
    }

    /// Smallest extent covering both.
    pub fn union(&self, other: &BoundingExtent) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.max_x.max(other.max_x),
            self.min_y.min(other.min_y),
            self.max_y.max(other.max_y),
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Dataset {
    /// Extent of this dataset, or `None` when it has no points.
    pub fn extent(&self) -> Option<BoundingExtent> {
        BoundingExtent::of_points(self.points())
    }
}

impl TerrainData {
    /// Extent of all records, or `None` when there are none.
    pub fn extent(&self) -> Option<BoundingExtent> {
        BoundingExtent::of_points(self.records.iter().map(|r| (r.x, r.y)))
    }
}

/// Joint extent of several datasets.
///
/// Each dataset is reduced to its own extent first and the per-dataset
/// extents are then reduced to one. Datasets without points are skipped with
/// a warning.
///
/// # Errors
///
/// Returns [`ExtentError::NoPoints`] when no dataset has any points.
pub fn joint_extent<'a, I>(datasets: I) -> Result<BoundingExtent, ExtentError>
where
    I: IntoIterator<Item = &'a Dataset>,
{
    let mut count = 0;
    let extent = datasets
        .into_iter()
        .filter_map(|dataset| {
            count += 1;
            let extent = dataset.extent();
            if extent.is_none() {
                warn!("Skipping empty dataset {} in extent", dataset.label());
            }
            extent
        })
        .reduce(|a, b| a.union(&b));

    extent.ok_or(ExtentError::NoPoints { datasets: count })
}
