//! Per-location preparation of merged terrain data.
//!
//! A location directory holds drainage exports (catch pits, inlets/outlets,
//! manholes), an NDVI sample grid, and grass/water/other mask exports. The
//! mask exports live in their own frame and are aligned onto the joint
//! extent of the drainage and NDVI data before everything is merged.

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use super::affine::AffineTransform;
use super::alignment::{align_to_reference, AlignmentError};
use super::merge::merge_datasets;
use crate::core::loaders::{load_ndvi_csv, load_points_csv, LoaderError, NdviSplit};
use crate::core::points::{Dataset, TerrainData};

/// Number of datasets emitted by [`LocationData::merge`].
pub const MERGED_DATASETS: usize = 6;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Missing source files for location '{location}': {missing:?}")]
    MissingSources {
        location: String,
        missing: Vec<PathBuf>,
    },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("Expected {expected} merge tags, got {actual}")]
    TagCount { expected: usize, actual: usize },
}

/// Source file paths for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSources {
    pub location: String,
    pub catch: PathBuf,
    pub in_out: PathBuf,
    pub manhole: PathBuf,
    pub ndvi: PathBuf,
    pub grass: PathBuf,
    pub water: PathBuf,
    pub other: PathBuf,
}

impl LocationSources {
    /// Standard file layout under `<base_dir>/<location>data/`.
    pub fn discover(base_dir: &Path, location: &str) -> Self {
        let dir = base_dir.join(format!("{location}data"));
        Self {
            location: location.to_string(),
            catch: dir.join(format!("{location}_catch.csv")),
            in_out: dir.join(format!("{location}_in_out.csv")),
            manhole: dir.join(format!("{location}_manhole.csv")),
            ndvi: dir.join(format!("10DayNVDIMedian{location}.csv")),
            grass: dir.join(format!("{location}2_g.txt")),
            water: dir.join(format!("{location}2_b.txt")),
            other: dir.join(format!("{location}2_other.txt")),
        }
    }

    fn all(&self) -> [&PathBuf; 7] {
        [
            &self.catch,
            &self.in_out,
            &self.manhole,
            &self.ndvi,
            &self.grass,
            &self.water,
            &self.other,
        ]
    }

    /// Fail if any source file is absent.
    pub fn ensure_exist(&self) -> Result<(), LocationError> {
        let missing: Vec<PathBuf> = self
            .all()
            .into_iter()
            .filter(|p| !p.is_file())
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LocationError::MissingSources {
                location: self.location.clone(),
                missing,
            })
        }
    }
}

/// Loaded datasets of one location.
#[derive(Debug, Clone)]
pub struct LocationData {
    pub catch: Dataset,
    pub in_out: Dataset,
    pub manhole: Dataset,
    pub ndvi: NdviSplit,
    /// Mask exports in load order: grass, water, other.
    pub masks: [Dataset; 3],
}

impl LocationData {
    pub fn load(sources: &LocationSources) -> Result<Self, LocationError> {
        sources.ensure_exist()?;

        Ok(Self {
            catch: load_points_csv(&sources.catch)?,
            in_out: load_points_csv(&sources.in_out)?,
            manhole: load_points_csv(&sources.manhole)?,
            ndvi: load_ndvi_csv(&sources.ndvi)?,
            masks: [
                load_points_csv(&sources.grass)?,
                load_points_csv(&sources.water)?,
                load_points_csv(&sources.other)?,
            ],
        })
    }

    /// Align the mask exports onto the drainage and NDVI frame.
    pub fn align(&mut self) -> Result<AffineTransform, LocationError> {
        let reference = [
            &self.catch,
            &self.in_out,
            &self.manhole,
            &self.ndvi.bare,
            &self.ndvi.greenery,
        ];
        Ok(align_to_reference(&reference, &mut self.masks)?)
    }

    /// Merge greenery, catch, inout, manhole, grass and water under `tags`.
    ///
    /// Bare NDVI samples and the `other` mask only shape the extents.
    pub fn merge<S: AsRef<str>>(&self, tags: &[S]) -> Result<TerrainData, LocationError> {
        if tags.len() != MERGED_DATASETS {
            return Err(LocationError::TagCount {
                expected: MERGED_DATASETS,
                actual: tags.len(),
            });
        }

        let datasets = [
            &self.ndvi.greenery,
            &self.catch,
            &self.in_out,
            &self.manhole,
            &self.masks[0],
            &self.masks[1],
        ];
        let inputs: Vec<(&str, &Dataset)> = tags
            .iter()
            .map(|t| t.as_ref())
            .zip(datasets)
            .collect();

        Ok(merge_datasets(&inputs))
    }
}

/// Load, align and merge one location.
pub fn prepare_location<S: AsRef<str>>(
    base_dir: &Path,
    location: &str,
    tags: &[S],
) -> Result<TerrainData, LocationError> {
    let sources = LocationSources::discover(base_dir, location);
    info!("Loading data for {}", location);
    let mut data = LocationData::load(&sources)?;

    data.align()?;
    let merged = data.merge(tags)?;
    info!("Merged {} records for {}", merged.len(), location);

    Ok(merged)
}
