//! Per-axis affine coordinate mapping.
//!
//! A transform is fitted exactly from the two extreme values of each axis:
//! the source `min`/`max` are mapped onto the target `min`/`max`, either
//! directly or inverted for frames whose vertical axis runs the other way.

use std::fmt;

use thiserror::Error;

use super::extent::BoundingExtent;
use crate::core::points::{Dataset, TerrainData};

/// Coordinate axis, used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Errors raised while fitting a transform.
#[derive(Debug, Error, PartialEq)]
pub enum AffineError {
    #[error("Degenerate {axis} extent: min and max are both {value}")]
    DegenerateFit { axis: Axis, value: f64 },

    #[error("Fit on {axis} axis produced a non-finite slope or intercept")]
    NonFinite { axis: Axis },
}

/// How the source range is laid onto the target range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `src_min -> dst_min`, `src_max -> dst_max`
    Direct,
    /// `src_min -> dst_max`, `src_max -> dst_min`
    Inverted,
}

/// One-dimensional map `value -> slope * value + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearMap {
    /// Fit the line through the two correspondences implied by `orientation`.
    ///
    /// # Errors
    ///
    /// Returns [`AffineError::DegenerateFit`] when `src_min == src_max`, and
    /// [`AffineError::NonFinite`] if the solution overflows.
    pub fn fit(
        axis: Axis,
        src_min: f64,
        src_max: f64,
        dst_min: f64,
        dst_max: f64,
        orientation: Orientation,
    ) -> Result<Self, AffineError> {
        if src_min == src_max {
            return Err(AffineError::DegenerateFit {
                axis,
                value: src_min,
            });
        }

        let (dst_at_min, dst_at_max) = match orientation {
            Orientation::Direct => (dst_min, dst_max),
            Orientation::Inverted => (dst_max, dst_min),
        };

        let slope = (dst_at_max - dst_at_min) / (src_max - src_min);
        let intercept = dst_at_min - slope * src_min;

        if !slope.is_finite() || !intercept.is_finite() {
            return Err(AffineError::NonFinite { axis });
        }

        Ok(Self { slope, intercept })
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        self.slope * value + self.intercept
    }
}

impl fmt::Display for LinearMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}v + {:.2}", self.slope, self.intercept)
    }
}

/// A pair of per-axis linear maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub x: LinearMap,
    pub y: LinearMap,
}

impl AffineTransform {
    /// Fit a transform taking `source` onto `target` with the given
    /// orientation per axis.
    pub fn fit(
        source: &BoundingExtent,
        target: &BoundingExtent,
        x_orientation: Orientation,
        y_orientation: Orientation,
    ) -> Result<Self, AffineError> {
        let x = LinearMap::fit(
            Axis::X,
            source.min_x,
            source.max_x,
            target.min_x,
            target.max_x,
            x_orientation,
        )?;
        let y = LinearMap::fit(
            Axis::Y,
            source.min_y,
            source.max_y,
            target.min_y,
            target.max_y,
            y_orientation,
        )?;
        Ok(Self { x, y })
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.apply(x), self.y.apply(y))
    }
}

/// Point collections whose coordinates can be rewritten by a transform.
pub trait Transformable {
    /// Extent of the current coordinates, or `None` when empty.
    fn extent(&self) -> Option<BoundingExtent>;

    /// Rewrite every coordinate in place.
    fn transform(&mut self, transform: &AffineTransform);
}

impl Transformable for Dataset {
    fn extent(&self) -> Option<BoundingExtent> {
        Dataset::extent(self)
    }

    fn transform(&mut self, transform: &AffineTransform) {
        for x in &mut self.x {
            *x = transform.x.apply(*x);
        }
        for y in &mut self.y {
            *y = transform.y.apply(*y);
        }
    }
}

impl Transformable for TerrainData {
    fn extent(&self) -> Option<BoundingExtent> {
        TerrainData::extent(self)
    }

    fn transform(&mut self, transform: &AffineTransform) {
        for record in &mut self.records {
            (record.x, record.y) = transform.apply(record.x, record.y);
        }
    }
}
