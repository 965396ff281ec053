//! Row-major elevation raster.

use thiserror::Error;

/// Errors raised when constructing a raster from malformed input.
#[derive(Debug, Error, PartialEq)]
pub enum RasterError {
    #[error("Raster must have non-zero dimensions, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("Raster data has {actual} samples, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// A 2D grid of elevation samples stored row-major.
///
/// The shape is fixed at construction and is always non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl RasterGrid {
    /// Creates a grid from row-major samples.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyGrid { width, height });
        }
        let expected = width * height;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a grid filled with a single value.
    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self, RasterError> {
        Self::new(width, height, vec![value; width * height])
    }

    /// Creates a grid from a vector of equally sized rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, RasterError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());

        let mut data = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(RasterError::RaggedRow {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            data.extend(values);
        }

        Self::new(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major sample buffer.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.width + col] = value;
    }

    /// Returns one row as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }
}
