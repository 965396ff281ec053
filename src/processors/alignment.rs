//! Aligning dataset groups into a shared coordinate frame.

use log::info;
use thiserror::Error;

use super::affine::{AffineError, AffineTransform, Orientation, Transformable};
use super::extent::{joint_extent, BoundingExtent, ExtentError};
use crate::config::TerrainRect;
use crate::core::points::Dataset;

/// Errors that can occur while aligning datasets.
#[derive(Debug, Error, PartialEq)]
pub enum AlignmentError {
    #[error("Reference group has no points: {0}")]
    EmptyReference(#[source] ExtentError),

    #[error("Group to align has no points: {0}")]
    EmptyGroup(#[source] ExtentError),

    #[error("No points to rescale")]
    NoPoints,

    #[error(transparent)]
    Fit(#[from] AffineError),
}

/// Bring `group` into the frame spanned by `reference`.
///
/// One transform is fitted from the joint extent of `group` onto the joint
/// extent of `reference` (X direct, Y inverted, since the mask exports count
/// rows downward) and applied to every dataset in `group`. Relative geometry
/// between the datasets of `group` is therefore preserved.
///
/// Returns the transform that was applied.
pub fn align_to_reference(
    reference: &[&Dataset],
    group: &mut [Dataset],
) -> Result<AffineTransform, AlignmentError> {
    let target = joint_extent(reference.iter().copied()).map_err(AlignmentError::EmptyReference)?;
    let source = joint_extent(group.iter()).map_err(AlignmentError::EmptyGroup)?;

    let transform = AffineTransform::fit(&source, &target, Orientation::Direct, Orientation::Inverted)?;
    info!("X equation: x2 = {}", transform.x);
    info!("Y equation: y2 = {}", transform.y);

    for dataset in group.iter_mut() {
        dataset.transform(&transform);
    }

    Ok(transform)
}

/// Rescale points into a fixed terrain rectangle `[0, width] x [0, height]`.
///
/// X is mapped directly and Y inverted, the same policy as
/// [`align_to_reference`], but the target extent is the configured rectangle
/// rather than another dataset's extent.
pub fn rescale_to_terrain<T>(points: &mut T, rect: TerrainRect) -> Result<AffineTransform, AlignmentError>
where
    T: Transformable,
{
    let source = points.extent().ok_or(AlignmentError::NoPoints)?;
    let target = BoundingExtent::from_rect(rect);

    let transform = AffineTransform::fit(&source, &target, Orientation::Direct, Orientation::Inverted)?;
    info!("X equation: x2 = {}", transform.x);
    info!("Y equation: y2 = {}", transform.y);

    points.transform(&transform);
    Ok(transform)
}
