//! Tagging and concatenating aligned datasets.

use crate::core::points::{Dataset, PointRecord, TerrainData};

/// Concatenate datasets into tagged terrain records.
///
/// Output order is the order of `inputs`, each dataset keeping its own
/// insertion order. Records carry only coordinates and the tag.
pub fn merge_datasets<S: AsRef<str>>(inputs: &[(S, &Dataset)]) -> TerrainData {
    let total: usize = inputs.iter().map(|(_, dataset)| dataset.len()).sum();
    let mut records = Vec::with_capacity(total);

    for (tag, dataset) in inputs {
        let tag = tag.as_ref();
        records.extend(dataset.points().map(|(x, y)| PointRecord::new(x, y, tag)));
    }

    TerrainData::new(records)
}
