//! Coordinate alignment, raster denoising and rainfall preparation.

pub mod affine;
pub mod alignment;
pub mod denoise;
pub mod extent;
pub mod filters;
pub mod location;
pub mod merge;
pub mod weather;

// Re-export key types for convenience
pub use affine::{AffineError, AffineTransform, Axis, LinearMap, Orientation, Transformable};
pub use alignment::{align_to_reference, rescale_to_terrain, AlignmentError};
pub use denoise::{DenoiseError, Denoiser, PassOutput, PassStats};
pub use extent::{joint_extent, BoundingExtent, ExtentError};
pub use filters::{median_filter, minimum_filter, FilterError};
pub use location::{prepare_location, LocationData, LocationError, LocationSources};
pub use merge::merge_datasets;
pub use weather::{peak_hour, peak_window, rainfall_series, WeatherError};
