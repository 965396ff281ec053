//! Terrain data preparation for a 3D rendering engine.
//!
//! This crate provides tools for:
//! - Loading drainage, NDVI and mask point exports and elevation TIFFs
//! - Fitting per-axis affine transforms between coordinate frames
//! - Aligning groups of datasets into one shared frame and merging them
//! - Rescaling merged points into a fixed terrain rectangle
//! - Iteratively removing spikes from elevation rasters
//! - Converting hourly precipitation exports into engine rainfall records
//!
//! # Example
//!
//! ```no_run
//! use terrain_prep::{core::loaders::load_raster_tiff, processors::Denoiser, DenoiseConfig};
//!
//! let grid = load_raster_tiff("orakei.tif").unwrap();
//! let cleaned = Denoiser::new(DenoiseConfig::default()).run(grid).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{
    DenoiseConfig, LocationConfig, MergeConfig, PipelineConfig, TerrainRect, WeatherConfig,
};
pub use core::{Dataset, PointRecord, RasterGrid, TerrainData, WeatherData, WeatherRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
