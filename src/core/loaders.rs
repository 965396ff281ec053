//! Data loaders for point CSVs, terrain JSON and elevation TIFFs.
//!
//! This module provides parsers for:
//! - Point CSV files with `X`/`Y` columns (drainage, mask exports)
//! - NDVI CSV files with an extra `value` column
//! - Merged terrain JSON files (`{"terrainData": [...]}`)
//! - Hourly precipitation JSON exports (`{"hourly": {...}}`)
//! - Single-channel TIFF elevation rasters

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};

use super::points::{Dataset, TerrainData};
use super::raster::{RasterError, RasterGrid};
use super::weather::HourlyWeather;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TIFF decoding error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Invalid raster: {0}")]
    Raster(#[from] RasterError),

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Invalid {column} value '{value}' on line {line} of {path}")]
    ParseError {
        column: String,
        value: String,
        line: u64,
        path: PathBuf,
    },

    #[error("Unsupported TIFF sample format in {0}")]
    UnsupportedSampleFormat(PathBuf),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Case-insensitive header lookup for a CSV file.
struct ColumnIndex {
    columns: HashMap<String, usize>,
    path: PathBuf,
}

impl ColumnIndex {
    fn new(headers: &StringRecord, path: &Path) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_lowercase(), i))
            .collect();
        Self {
            columns,
            path: path.to_path_buf(),
        }
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| LoaderError::MissingColumn {
                column: column.to_string(),
                path: self.path.clone(),
            })
    }

    fn parse(&self, record: &StringRecord, idx: usize, column: &str) -> Result<f64> {
        let raw = record.get(idx).unwrap_or_default();
        raw.parse().map_err(|_| LoaderError::ParseError {
            column: column.to_string(),
            value: raw.to_string(),
            line: record.position().map_or(0, |p| p.line()),
            path: self.path.clone(),
        })
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file)))
}

/// Load a point dataset from a CSV file with `X` and `Y` columns.
///
/// Column names are matched case-insensitively and any other columns are
/// ignored. A file with a header but no rows yields an empty dataset.
///
/// # Errors
///
/// Returns an error if the file cannot be read, lacks an `X` or `Y` column,
/// or contains a non-numeric coordinate.
pub fn load_points_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let mut reader = open_csv(path)?;

    let columns = ColumnIndex::new(reader.headers()?, path);
    let x_idx = columns.require("x")?;
    let y_idx = columns.require("y")?;

    let mut dataset = Dataset::with_capacity(10_000);
    for result in reader.records() {
        let record = result?;
        let x = columns.parse(&record, x_idx, "X")?;
        let y = columns.parse(&record, y_idx, "Y")?;
        dataset.push(x, y);
    }

    if dataset.is_empty() {
        warn!("No points in {}", path.display());
    }
    debug!("Loaded {} points from {}", dataset.len(), path.display());

    dataset.source_path = Some(path.to_path_buf());
    Ok(dataset)
}

/// NDVI samples split by vegetation value.
#[derive(Debug, Clone, Default)]
pub struct NdviSplit {
    /// Samples with `value == 0`.
    pub bare: Dataset,
    /// Samples with a non-zero value.
    pub greenery: Dataset,
}

/// Load an NDVI CSV (`X`, `Y`, `value`) and split it on zero values.
pub fn load_ndvi_csv<P: AsRef<Path>>(path: P) -> Result<NdviSplit> {
    let path = path.as_ref();
    let mut reader = open_csv(path)?;

    let columns = ColumnIndex::new(reader.headers()?, path);
    let x_idx = columns.require("x")?;
    let y_idx = columns.require("y")?;
    let value_idx = columns.require("value")?;

    let mut split = NdviSplit::default();
    for result in reader.records() {
        let record = result?;
        let x = columns.parse(&record, x_idx, "X")?;
        let y = columns.parse(&record, y_idx, "Y")?;
        let value = columns.parse(&record, value_idx, "value")?;

        if value == 0.0 {
            split.bare.push(x, y);
        } else {
            split.greenery.push(x, y);
        }
    }

    debug!(
        "Loaded NDVI from {}: {} bare, {} greenery",
        path.display(),
        split.bare.len(),
        split.greenery.len()
    );

    split.bare.source_path = Some(path.to_path_buf());
    split.greenery.source_path = Some(path.to_path_buf());
    Ok(split)
}

/// Load merged terrain records from a JSON file.
pub fn load_terrain_json<P: AsRef<Path>>(path: P) -> Result<TerrainData> {
    let file = File::open(path.as_ref())?;
    let data: TerrainData = serde_json::from_reader(BufReader::new(file))?;
    Ok(data)
}

/// Load an hourly forecast-archive export.
pub fn load_hourly_weather_json<P: AsRef<Path>>(path: P) -> Result<HourlyWeather> {
    let file = File::open(path.as_ref())?;
    let weather: HourlyWeather = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        "Loaded {} hourly readings from {}",
        weather.hourly.time.len(),
        path.as_ref().display()
    );
    Ok(weather)
}

/// Load a single-channel TIFF raster as `f32` elevations.
///
/// # Errors
///
/// Returns an error for unreadable files, unsupported sample formats, and
/// images whose sample count does not match a single channel.
pub fn load_raster_tiff<P: AsRef<Path>>(path: P) -> Result<RasterGrid> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    let data: Vec<f32> = match decoder.read_image()? {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|s| s as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err(LoaderError::UnsupportedSampleFormat(path.to_path_buf())),
    };

    debug!("Loaded {}x{} raster from {}", width, height, path.display());

    Ok(RasterGrid::new(width as usize, height as usize, data)?)
}
