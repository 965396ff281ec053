//! Iterative removal of elevation spikes.
//!
//! Each pass derives three views from the current grid (a local minimum and
//! two local medians) and rebuilds the grid cell by cell from those views.
//! A cell above the upper bound is treated as a spike:
//!
//! - over low ground (local minimum below `low_floor`) it is flattened to the
//!   local minimum;
//! - otherwise it is replaced by the `median_radius_2` median.
//!
//! Passes never read partially updated values: views are computed from an
//! immutable snapshot and the next grid is written to a fresh buffer.

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use super::filters::{check_radius, median_filter, minimum_filter, FilterError};
use crate::config::DenoiseConfig;
use crate::core::raster::RasterGrid;

#[derive(Debug, Error, PartialEq)]
pub enum DenoiseError {
    #[error("Denoise filter failed: {0}")]
    Filter(#[from] FilterError),
}

/// What the repair rule does to a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRepair {
    Keep,
    /// Replace with the local minimum.
    Floor,
    /// Replace with the repair median.
    Median,
}

/// Decide how to treat one cell given its local minimum.
#[inline]
pub fn classify_cell(pixel: f32, minimum: f32, config: &DenoiseConfig) -> CellRepair {
    if pixel > config.upper_bound {
        if minimum < config.low_floor {
            CellRepair::Floor
        } else {
            CellRepair::Median
        }
    } else {
        CellRepair::Keep
    }
}

/// Repaired value of one cell.
#[inline]
pub fn repair_cell(pixel: f32, minimum: f32, median: f32, config: &DenoiseConfig) -> f32 {
    match classify_cell(pixel, minimum, config) {
        CellRepair::Keep => pixel,
        CellRepair::Floor => minimum,
        CellRepair::Median => median,
    }
}

/// Read-only filter views of one grid snapshot.
#[derive(Debug, Clone)]
pub struct FilterViews {
    pub minimum: RasterGrid,
    pub median_1: RasterGrid,
    pub median_2: RasterGrid,
}

impl FilterViews {
    pub fn compute(grid: &RasterGrid, config: &DenoiseConfig) -> Result<Self, FilterError> {
        Ok(Self {
            minimum: minimum_filter(grid, config.min_radius)?,
            median_1: median_filter(grid, config.median_radius_1)?,
            median_2: median_filter(grid, config.median_radius_2)?,
        })
    }
}

/// Counts of cells changed in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub floored: usize,
    pub median_repaired: usize,
}

impl PassStats {
    pub fn changed(&self) -> usize {
        self.floored + self.median_repaired
    }
}

/// Run one pass over `grid`, returning the next grid.
pub fn denoise_pass(
    grid: &RasterGrid,
    config: &DenoiseConfig,
) -> Result<(RasterGrid, PassStats), DenoiseError> {
    let views = FilterViews::compute(grid, config)?;

    let (data, repairs): (Vec<f32>, Vec<CellRepair>) = grid
        .data()
        .par_iter()
        .zip(views.minimum.data().par_iter())
        .zip(views.median_2.data().par_iter())
        .map(|((&pixel, &minimum), &median)| {
            let repair = classify_cell(pixel, minimum, config);
            (repair_cell(pixel, minimum, median, config), repair)
        })
        .unzip();

    let stats = PassStats {
        floored: repairs.iter().filter(|&&r| r == CellRepair::Floor).count(),
        median_repaired: repairs.iter().filter(|&&r| r == CellRepair::Median).count(),
    };

    let next = RasterGrid::new(grid.width(), grid.height(), data).map_err(FilterError::from)?;
    Ok((next, stats))
}

/// Output of a completed pass, borrowed from the denoiser for the duration
/// of the pass callback.
#[derive(Debug, Clone, Copy)]
pub struct PassOutput<'a> {
    /// 1-based pass number.
    pub pass: usize,
    pub grid: &'a RasterGrid,
    pub stats: PassStats,
}

/// Runs the configured number of passes over a grid.
#[derive(Debug, Clone)]
pub struct Denoiser {
    config: DenoiseConfig,
}

impl Denoiser {
    pub fn new(config: DenoiseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Check every filter radius against the grid shape.
    pub fn validate(&self, grid: &RasterGrid) -> Result<(), DenoiseError> {
        check_radius(grid, self.config.min_radius)?;
        check_radius(grid, self.config.median_radius_1)?;
        check_radius(grid, self.config.median_radius_2)?;
        Ok(())
    }

    /// Run all passes, handing each result to `on_pass` before the next pass
    /// is computed.
    ///
    /// Stops at the first error from either a pass or the callback and
    /// returns the final grid otherwise.
    pub fn run_with<F, E>(&self, grid: RasterGrid, mut on_pass: F) -> Result<RasterGrid, E>
    where
        F: FnMut(PassOutput<'_>) -> Result<(), E>,
        E: From<DenoiseError>,
    {
        self.validate(&grid)?;

        let iterations = self.config.iterations;
        let mut current = grid;
        for pass in 1..=iterations {
            debug!("Denoise pass {} of {}", pass, iterations);
            let (next, stats) = denoise_pass(&current, &self.config)?;
            info!(
                "Pass {}: {} cells floored, {} median-repaired",
                pass, stats.floored, stats.median_repaired
            );
            current = next;
            on_pass(PassOutput {
                pass,
                grid: &current,
                stats,
            })?;
        }

        Ok(current)
    }

    /// Run all passes and return the final grid.
    pub fn run(&self, grid: RasterGrid) -> Result<RasterGrid, DenoiseError> {
        self.run_with(grid, |_| Ok(()))
    }
}
