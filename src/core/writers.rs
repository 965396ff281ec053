//! Data writers for terrain JSON and raster TIFF outputs.
//!
//! This module provides functions for persisting pipeline results:
//! - Merged terrain records and hourly rainfall as pretty-printed JSON
//! - Elevation rasters as single-channel 32-bit float TIFF

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tiff::encoder::{colortype, TiffEncoder};

use super::points::TerrainData;
use super::raster::RasterGrid;
use super::weather::WeatherData;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON write error for '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// TIFF encoding error.
    #[error("TIFF write error for '{path}': {source}")]
    TiffError {
        path: String,
        #[source]
        source: tiff::TiffError,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Write terrain records as `{"terrainData": [...]}`.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `data` - Merged terrain records
///
/// # Example
///
/// ```no_run
/// use terrain_prep::core::points::{PointRecord, TerrainData};
/// use terrain_prep::core::writers::write_terrain_json;
/// use std::path::Path;
///
/// let data = TerrainData::new(vec![PointRecord::new(1.0, 2.0, "water")]);
/// write_terrain_json(Path::new("cbd_all.json"), &data).unwrap();
/// ```
pub fn write_terrain_json(path: &Path, data: &TerrainData) -> Result<()> {
    write_json(path, data)
}

/// Write hourly rainfall as `{"weatherData": [{"time": ..., "rainfall": ...}]}`.
pub fn write_weather_json(path: &Path, data: &WeatherData) -> Result<()> {
    write_json(path, data)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();

    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| WriteError::JsonError {
        path: path_str.clone(),
        source: e,
    })?;

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write a raster as a single-channel 32-bit float TIFF.
pub fn write_raster_tiff(path: &Path, grid: &RasterGrid) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();

    let tiff_err = |e: tiff::TiffError| WriteError::TiffError {
        path: path_str.clone(),
        source: e,
    };

    {
        let mut encoder = TiffEncoder::new(&mut writer).map_err(tiff_err)?;
        encoder
            .write_image::<colortype::Gray32Float>(
                grid.width() as u32,
                grid.height() as u32,
                grid.data(),
            )
            .map_err(tiff_err)?;
    }

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::{load_raster_tiff, load_terrain_json};
    use crate::core::points::PointRecord;
    use crate::core::weather::WeatherRecord;
    use tempfile::tempdir;

    #[test]
    fn test_write_terrain_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("cbd_all.json");
        let data = TerrainData::new(vec![
            PointRecord::new(1.0, 2.0, "greenery"),
            PointRecord::new(3.0, 4.0, "water"),
        ]);

        write_terrain_json(&path, &data).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        let records = json["terrainData"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["type"], "water");
        assert_eq!(records[0]["X"], 1.0);

        assert_eq!(load_terrain_json(&path).unwrap(), data);
    }

    #[test]
    fn test_write_weather_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("akl_processed.json");
        let data = WeatherData::new(vec![WeatherRecord::new(0, 0.0), WeatherRecord::new(3600, 2.5)]);

        write_weather_json(&path, &data).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["weatherData"][1]["time"], 3600);
        assert_eq!(json["weatherData"][1]["rainfall"], 2.5);
    }

    #[test]
    fn test_write_raster_tiff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orakeipass1.tif");
        let grid = RasterGrid::new(3, 2, vec![0.5, 1.0, 1.5, 2.0, 62.25, 3.0]).unwrap();

        write_raster_tiff(&path, &grid).unwrap();

        let loaded = load_raster_tiff(&path).unwrap();
        assert_eq!(loaded, grid);
    }
}
