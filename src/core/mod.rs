//! Core data types and I/O operations.

pub mod loaders;
pub mod points;
pub mod raster;
pub mod weather;
pub mod writers;

pub use points::{Dataset, PointRecord, TerrainData};
pub use raster::{RasterError, RasterGrid};
pub use weather::{HourlyWeather, WeatherData, WeatherRecord};
pub use writers::{write_raster_tiff, write_terrain_json, write_weather_json, WriteError};
