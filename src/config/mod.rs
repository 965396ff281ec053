//! Configuration types for the terrain pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or querying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Location '{0}' has no terrain size configured")]
    MissingTerrainSize(String),
}

/// Size of the target terrain rectangle `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainRect {
    pub width: f64,
    pub height: f64,
}

impl TerrainRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-location constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Terrain rectangle that point data is rescaled into
    #[serde(default)]
    pub terrain_size: Option<TerrainRect>,

    /// Denoise threshold override for this location
    #[serde(default)]
    pub upper_bound: Option<f32>,
}

fn default_locations() -> HashMap<String, LocationConfig> {
    let mut locations = HashMap::new();
    locations.insert(
        "orakei".to_string(),
        LocationConfig {
            terrain_size: Some(TerrainRect::new(3521.0, 4074.0)),
            upper_bound: Some(70.0),
        },
    );
    locations.insert(
        "cbd".to_string(),
        LocationConfig {
            terrain_size: Some(TerrainRect::new(3376.0, 3796.0)),
            upper_bound: None,
        },
    );
    locations.insert(
        "penrose".to_string(),
        LocationConfig {
            terrain_size: Some(TerrainRect::new(5310.0, 2584.0)),
            upper_bound: None,
        },
    );
    locations.insert(
        "sylvia".to_string(),
        LocationConfig {
            terrain_size: None,
            upper_bound: Some(55.0),
        },
    );
    locations
}

/// Parameters of the iterative raster denoiser.
///
/// Radii are half-widths, so a radius of `r` covers a `(2r + 1) x (2r + 1)`
/// window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenoiseConfig {
    /// Radius of the first median view
    #[serde(default = "default_median_radius_1")]
    pub median_radius_1: usize,

    /// Radius of the median view used for repair
    #[serde(default = "default_median_radius_2")]
    pub median_radius_2: usize,

    /// Radius of the local minimum view
    #[serde(default = "default_min_radius")]
    pub min_radius: usize,

    /// Cells above this value are candidates for repair
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f32,

    /// Local minimum below which a neighbourhood counts as low ground.
    ///
    /// Expressed in the source raster's elevation units.
    #[serde(default = "default_low_floor")]
    pub low_floor: f32,

    /// Number of passes to run
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

fn default_median_radius_1() -> usize {
    5
}

fn default_median_radius_2() -> usize {
    2
}

fn default_min_radius() -> usize {
    12
}

fn default_upper_bound() -> f32 {
    60.0
}

fn default_low_floor() -> f32 {
    2.0
}

fn default_iterations() -> usize {
    5
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            median_radius_1: default_median_radius_1(),
            median_radius_2: default_median_radius_2(),
            min_radius: default_min_radius(),
            upper_bound: default_upper_bound(),
            low_floor: default_low_floor(),
            iterations: default_iterations(),
        }
    }
}

/// Configuration for merging aligned datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Category tags in output order
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

fn default_tags() -> Vec<String> {
    ["greenery", "catch", "inout", "manhole", "grass", "water"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { tags: default_tags() }
    }
}

/// Configuration for rainfall preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Hours plotted on each side of the wettest hour
    #[serde(default = "default_plot_window_hours")]
    pub plot_window_hours: usize,
}

fn default_plot_window_hours() -> usize {
    500
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            plot_window_hours: default_plot_window_hours(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_locations")]
    pub locations: HashMap<String, LocationConfig>,

    #[serde(default)]
    pub denoise: DenoiseConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub weather: WeatherConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            denoise: DenoiseConfig::default(),
            merge: MergeConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a location, failing on unknown names.
    pub fn location(&self, name: &str) -> Result<&LocationConfig, ConfigError> {
        self.locations
            .get(name)
            .ok_or_else(|| ConfigError::UnknownLocation(name.to_string()))
    }

    /// Terrain rectangle configured for a location.
    pub fn terrain_rect(&self, name: &str) -> Result<TerrainRect, ConfigError> {
        self.location(name)?
            .terrain_size
            .ok_or_else(|| ConfigError::MissingTerrainSize(name.to_string()))
    }

    /// Denoise parameters with the location's threshold override applied.
    pub fn denoise_for(&self, name: &str) -> Result<DenoiseConfig, ConfigError> {
        let location = self.location(name)?;
        let mut config = self.denoise.clone();
        if let Some(upper_bound) = location.upper_bound {
            config.upper_bound = upper_bound;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_denoise_config() {
        let config = DenoiseConfig::default();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.min_radius, 12);
        assert_eq!(config.upper_bound, 60.0);
        assert_eq!(config.low_floor, 2.0);
    }

    #[test]
    fn test_terrain_rect_lookup() {
        let config = PipelineConfig::default();
        let rect = config.terrain_rect("penrose").unwrap();
        assert_eq!(rect, TerrainRect::new(5310.0, 2584.0));
    }

    #[test]
    fn test_terrain_rect_missing() {
        let config = PipelineConfig::default();
        assert!(matches!(
            config.terrain_rect("sylvia"),
            Err(ConfigError::MissingTerrainSize(_))
        ));
    }

    #[test]
    fn test_unknown_location_is_error() {
        let config = PipelineConfig::default();
        assert!(matches!(
            config.denoise_for("atlantis"),
            Err(ConfigError::UnknownLocation(name)) if name == "atlantis"
        ));
        assert!(config.terrain_rect("atlantis").is_err());
    }

    #[test]
    fn test_upper_bound_override() {
        let config = PipelineConfig::default();
        assert_eq!(config.denoise_for("orakei").unwrap().upper_bound, 70.0);
        assert_eq!(config.denoise_for("sylvia").unwrap().upper_bound, 55.0);
        assert_eq!(config.denoise_for("cbd").unwrap().upper_bound, 60.0);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "denoise:\n  iterations: 3\nlocations:\n  testville:\n    upper_bound: 42.0\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.denoise.iterations, 3);
        assert_eq!(config.denoise.min_radius, 12);
        assert_eq!(config.merge.tags.len(), 6);
        assert_eq!(config.weather.plot_window_hours, 500);
        assert_eq!(config.denoise_for("testville").unwrap().upper_bound, 42.0);
        assert!(config.location("orakei").is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = PipelineConfig::default();
        config.to_yaml(&path).unwrap();
        let loaded = PipelineConfig::from_yaml(&path).unwrap();

        assert_eq!(loaded.locations, config.locations);
        assert_eq!(loaded.denoise, config.denoise);
        assert_eq!(loaded.weather, config.weather);
    }
}
