//! Local minimum and median filters over square windows.
//!
//! Borders are handled by half-sample symmetric reflection
//! (`d c b a | a b c d | d c b a`). Every filter reads an immutable input
//! grid and writes a new one; rows are processed in parallel with Rayon.

use rayon::prelude::*;
use thiserror::Error;

use crate::core::raster::{RasterError, RasterGrid};

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Filter radius {radius} exceeds {width}x{height} grid")]
    RadiusExceedsGrid {
        radius: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Check that a single reflection covers a window of `radius`.
pub fn check_radius(grid: &RasterGrid, radius: usize) -> Result<(), FilterError> {
    if radius > grid.width() || radius > grid.height() {
        return Err(FilterError::RadiusExceedsGrid {
            radius,
            width: grid.width(),
            height: grid.height(),
        });
    }
    Ok(())
}

/// Map a possibly out-of-range index back into `0..len` by reflection.
///
/// Valid for `-len <= idx < 2 * len`.
#[inline]
pub fn reflect_index(idx: isize, len: usize) -> usize {
    let len = len as isize;
    let reflected = if idx < 0 {
        -idx - 1
    } else if idx >= len {
        2 * len - 1 - idx
    } else {
        idx
    };
    debug_assert!((0..len).contains(&reflected));
    reflected as usize
}

/// Window offsets `-r..=r` resolved against an axis of `len` samples.
fn window_indices(center: usize, radius: usize, len: usize) -> impl Iterator<Item = usize> {
    let r = radius as isize;
    let c = center as isize;
    (c - r..=c + r).map(move |i| reflect_index(i, len))
}

/// Local minimum over a `(2r + 1) x (2r + 1)` window.
///
/// Computed separably: a minimum along rows followed by a minimum along
/// columns, which is exact for square windows.
pub fn minimum_filter(grid: &RasterGrid, radius: usize) -> Result<RasterGrid, FilterError> {
    check_radius(grid, radius)?;
    let width = grid.width();
    let height = grid.height();

    let mut horizontal = vec![0.0f32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            let src = grid.row(row);
            for (col, value) in out.iter_mut().enumerate() {
                *value = window_indices(col, radius, width)
                    .map(|c| src[c])
                    .fold(f32::INFINITY, f32::min);
            }
        });

    let mut output = vec![0.0f32; width * height];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            for (col, value) in out.iter_mut().enumerate() {
                *value = window_indices(row, radius, height)
                    .map(|r| horizontal[r * width + col])
                    .fold(f32::INFINITY, f32::min);
            }
        });

    Ok(RasterGrid::new(width, height, output)?)
}

/// Local median over a `(2r + 1) x (2r + 1)` window.
pub fn median_filter(grid: &RasterGrid, radius: usize) -> Result<RasterGrid, FilterError> {
    check_radius(grid, radius)?;
    let width = grid.width();
    let height = grid.height();
    let window = 2 * radius + 1;
    let mid = window * window / 2;

    let mut output = vec![0.0f32; width * height];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            let rows: Vec<usize> = window_indices(row, radius, height).collect();
            let mut samples = Vec::with_capacity(window * window);

            for (col, value) in out.iter_mut().enumerate() {
                samples.clear();
                for c in window_indices(col, radius, width) {
                    samples.extend(rows.iter().map(|&r| grid.get(r, c)));
                }
                let (_, median, _) = samples.select_nth_unstable_by(mid, f32::total_cmp);
                *value = *median;
            }
        });

    Ok(RasterGrid::new(width, height, output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `sample_grid` padded by one reflected cell on every side.
    const PADDED_R1: [[f32; 6]; 5] = [
        [9.0, 9.0, 1.0, 4.0, 7.0, 7.0],
        [9.0, 9.0, 1.0, 4.0, 7.0, 7.0],
        [3.0, 3.0, 8.0, 2.0, 6.0, 6.0],
        [5.0, 5.0, 0.5, 7.5, 1.5, 1.5],
        [5.0, 5.0, 0.5, 7.5, 1.5, 1.5],
    ];

    /// `sample_grid` padded by two reflected cells on every side.
    const PADDED_R2: [[f32; 8]; 7] = [
        [8.0, 3.0, 3.0, 8.0, 2.0, 6.0, 6.0, 2.0],
        [1.0, 9.0, 9.0, 1.0, 4.0, 7.0, 7.0, 4.0],
        [1.0, 9.0, 9.0, 1.0, 4.0, 7.0, 7.0, 4.0],
        [8.0, 3.0, 3.0, 8.0, 2.0, 6.0, 6.0, 2.0],
        [0.5, 5.0, 5.0, 0.5, 7.5, 1.5, 1.5, 7.5],
        [0.5, 5.0, 5.0, 0.5, 7.5, 1.5, 1.5, 7.5],
        [8.0, 3.0, 3.0, 8.0, 2.0, 6.0, 6.0, 2.0],
    ];

    fn window_values<const W: usize>(
        padded: &[[f32; W]],
        row: usize,
        col: usize,
        radius: usize,
    ) -> Vec<f32> {
        // (row, col) are grid coordinates; the padded grid is offset by radius.
        let mut values = Vec::new();
        for r in row..=row + 2 * radius {
            for c in col..=col + 2 * radius {
                values.push(padded[r][c]);
            }
        }
        values
    }

    fn sample_grid() -> RasterGrid {
        RasterGrid::from_rows(vec![
            vec![9.0, 1.0, 4.0, 7.0],
            vec![3.0, 8.0, 2.0, 6.0],
            vec![5.0, 0.5, 7.5, 1.5],
        ])
        .unwrap()
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(-4, 4), 3);
        assert_eq!(reflect_index(2, 4), 2);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(7, 4), 0);
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let grid = sample_grid();
        assert_eq!(minimum_filter(&grid, 0).unwrap(), grid);
        assert_eq!(median_filter(&grid, 0).unwrap(), grid);
    }

    #[test]
    fn test_minimum_filter() {
        let grid = sample_grid();
        let min = minimum_filter(&grid, 1).unwrap();

        assert_eq!(min.get(0, 0), 1.0);
        assert_eq!(min.get(0, 3), 2.0);
        assert_eq!(min.get(1, 1), 0.5);
        assert_eq!(min.get(2, 3), 1.5);
    }

    #[test]
    fn test_median_filter() {
        let grid = sample_grid();
        let median = median_filter(&grid, 1).unwrap();

        // Window around (1, 1): 9 1 4 / 3 8 2 / 5 0.5 7.5
        assert_eq!(median.get(1, 1), 4.0);
    }

    fn assert_matches_padded<const W: usize>(padded: &[[f32; W]], radius: usize) {
        let grid = sample_grid();
        let min = minimum_filter(&grid, radius).unwrap();
        let median = median_filter(&grid, radius).unwrap();

        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let mut values = window_values(padded, row, col, radius);
                let expected_min = values.iter().copied().fold(f32::INFINITY, f32::min);
                values.sort_by(f32::total_cmp);
                let expected_median = values[values.len() / 2];

                assert_eq!(min.get(row, col), expected_min, "min at ({row}, {col}) r={radius}");
                assert_eq!(
                    median.get(row, col),
                    expected_median,
                    "median at ({row}, {col}) r={radius}"
                );
            }
        }
    }

    #[test]
    fn test_filters_match_reflect_padding() {
        assert_matches_padded(&PADDED_R1, 1);
        assert_matches_padded(&PADDED_R2, 2);
    }

    #[test]
    fn test_corner_uses_mirrored_neighbours() {
        // Zero padding would pull the corner minimum down to 0.
        let grid = RasterGrid::from_rows(vec![
            vec![100.0, 5.0, 6.0],
            vec![5.0, 5.0, 6.0],
            vec![6.0, 6.0, 6.0],
        ])
        .unwrap();

        let min = minimum_filter(&grid, 1).unwrap();
        let median = median_filter(&grid, 1).unwrap();

        assert_eq!(min.get(0, 0), 5.0);
        // Window: 100 100 5 / 100 100 5 / 5 5 5
        assert_eq!(median.get(0, 0), 5.0);
    }

    #[test]
    fn test_radius_exceeds_grid() {
        let grid = sample_grid();
        let err = median_filter(&grid, 4).unwrap_err();
        assert_eq!(
            err,
            FilterError::RadiusExceedsGrid {
                radius: 4,
                width: 4,
                height: 3
            }
        );
        assert!(minimum_filter(&grid, 3).is_ok());
    }
}
