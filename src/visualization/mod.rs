//! Verification plots for terrain point data and rainfall series.
//!
//! Scatter plots of merged terrain records, coloured by category, and line
//! plots of hourly rainfall, rendered to PNG with the plotters bitmap
//! backend. No text is drawn, so no font backend is needed.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::points::PointRecord;
use crate::core::weather::WeatherRecord;
use crate::processors::extent::BoundingExtent;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("No points to plot")]
    EmptyPointCloud,

    #[error("No rainfall records to plot")]
    EmptySeries,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1200;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 1000;

/// Colours for the standard categories.
const CATEGORY_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("greenery", (0, 100, 0)),   // Dark green
    ("catch", (255, 0, 0)),      // Red
    ("inout", (255, 165, 0)),    // Orange
    ("manhole", (255, 192, 203)), // Pink
    ("grass", (34, 139, 34)),    // Forest green
    ("water", (0, 0, 139)),      // Dark blue
];

/// Colour for categories without a palette entry.
const OTHER_COLOR: (u8, u8, u8) = (112, 128, 144);

fn category_color(category: &str) -> RGBColor {
    let (r, g, b) = CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, c)| *c)
        .unwrap_or(OTHER_COLOR);
    RGBColor(r, g, b)
}

/// Every `step`-th item, with `step` chosen so at most `max_points` remain.
///
/// A cap of zero is treated as one.
fn subsample<T>(items: &[T], max_points: usize) -> impl Iterator<Item = &T> {
    let step = items.len().div_ceil(max_points.max(1)).max(1);
    items.iter().step_by(step)
}

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Plot terrain records as a 2D scatter plot and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `records` - Records to plot
/// * `bounds` - Fixed plot bounds; computed from the records when `None`
/// * `max_points` - Maximum number of points to plot (subsamples if exceeded)
///
/// Returns the number of points drawn.
pub fn plot_terrain<'a, I>(
    output_path: &Path,
    records: I,
    bounds: Option<BoundingExtent>,
    max_points: usize,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a PointRecord>,
{
    let records: Vec<&PointRecord> = records.into_iter().collect();
    if records.is_empty() {
        return Err(VisualizationError::EmptyPointCloud);
    }

    let points: Vec<(f64, f64, RGBColor)> = subsample(&records, max_points)
        .map(|r| (r.x, r.y, category_color(&r.category)))
        .collect();

    let (x_range, y_range) = match bounds {
        Some(b) => ((b.min_x, b.max_x), (b.min_y, b.max_y)),
        None => padded_bounds(&points),
    };

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y, color)| Circle::new((*x, *y), 1, color.filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;

    Ok(points.len())
}

/// Plot hourly rainfall against time as a line and save as PNG.
pub fn plot_rainfall(output_path: &Path, records: &[WeatherRecord]) -> Result<()> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first.time as f64, last.time as f64),
        _ => return Err(VisualizationError::EmptySeries),
    };

    let x_range = if last > first { (first, last) } else { (first - 1.0, first + 1.0) };
    let peak = records.iter().map(|r| r.rainfall).fold(0.0f64, f64::max);
    let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT / 2)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_range.0..x_range.1, 0.0..y_max)
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (r.time as f64, r.rainfall)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;

    Ok(())
}

/// Compute data bounds with 5% padding, widening flat axes.
fn padded_bounds(points: &[(f64, f64, RGBColor)]) -> ((f64, f64), (f64, f64)) {
    let extent = BoundingExtent::of_points(points.iter().map(|(x, y, _)| (*x, *y)))
        .unwrap_or(BoundingExtent::new(0.0, 1.0, 0.0, 1.0));

    let pad = |min: f64, max: f64| {
        let span = max - min;
        if span.abs() < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            (min - span * 0.05, max + span * 0.05)
        }
    };

    (
        pad(extent.min_x, extent.max_x),
        pad(extent.min_y, extent.max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn grid_records(n: usize) -> Vec<PointRecord> {
        (0..n)
            .map(|i| PointRecord::new((i % 10) as f64, (i / 10) as f64, "water"))
            .collect()
    }

    #[test]
    fn test_category_color() {
        assert_eq!(category_color("water"), RGBColor(0, 0, 139));
        assert_eq!(category_color("unknown"), RGBColor(112, 128, 144));
    }

    #[test]
    fn test_subsample_respects_cap() {
        let items: Vec<usize> = (0..150).collect();

        let kept: Vec<usize> = subsample(&items, 100).copied().collect();
        assert_eq!(kept.len(), 75);
        assert_eq!(&kept[..3], &[0, 2, 4]);

        assert_eq!(subsample(&items, 150).count(), 150);
        assert_eq!(subsample(&items, 1000).count(), 150);
        assert_eq!(subsample(&items, 7).count(), 7);
        assert_eq!(subsample(&items, 0).count(), 1);
    }

    #[test]
    fn test_padded_bounds_flat_axis() {
        let points = vec![(1.0, 5.0, WHITE), (3.0, 5.0, WHITE)];
        let ((x0, x1), (y0, y1)) = padded_bounds(&points);

        assert!((x0 - 0.9).abs() < 1e-12);
        assert!((x1 - 3.1).abs() < 1e-12);
        assert_eq!((y0, y1), (4.0, 6.0));
    }

    #[test]
    fn test_plot_empty() {
        let dir = tempdir().unwrap();
        let records: Vec<PointRecord> = Vec::new();
        let result = plot_terrain(&dir.path().join("empty.png"), &records, None, 100);
        assert!(matches!(result, Err(VisualizationError::EmptyPointCloud)));
    }

    #[test]
    fn test_plot_terrain_renders_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cbd_data.png");
        let records = grid_records(40);

        let drawn = plot_terrain(&path, &records, None, 1000).unwrap();

        assert_eq!(drawn, 40);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_terrain_caps_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cbd_verify.png");
        let records = grid_records(150);
        let bounds = BoundingExtent::new(0.0, 10.0, 0.0, 15.0);

        let drawn = plot_terrain(&path, &records, Some(bounds), 100).unwrap();

        assert!(drawn <= 100);
        assert_eq!(drawn, 75);
        assert!(path.exists());
    }

    #[test]
    fn test_plot_rainfall() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rainfall.png");
        let records: Vec<WeatherRecord> = (0..48)
            .map(|h| WeatherRecord::new(h * 3600, if h == 20 { 12.0 } else { 0.5 }))
            .collect();

        plot_rainfall(&path, &records).unwrap();
        assert!(path.exists());

        assert!(matches!(
            plot_rainfall(&dir.path().join("none.png"), &[]),
            Err(VisualizationError::EmptySeries)
        ));
    }
}
