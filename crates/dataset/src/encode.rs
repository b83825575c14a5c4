//! CoverageJSON encoding of datasets.

use climate_common::time::format_timestamp;
use edr_protocol::coverage_json::{CoverageDocument, Domain};

use crate::types::Dataset;

/// Encode a dataset as a CoverageJSON grid coverage.
///
/// Axis values are copied in storage order and time values formatted as
/// `YYYY-MM-DDTHH:MM:SSZ`. Each variable becomes a parameter described by its
/// own name with an `Unknown` unit, plus an NdArray range over its dims.
pub fn encode_coverage(dataset: &Dataset) -> CoverageDocument {
    let domain = Domain::grid(
        dataset.x.clone(),
        dataset.y.clone(),
        dataset.z.clone(),
        dataset.t.iter().map(format_timestamp).collect(),
    );

    dataset
        .variables()
        .fold(CoverageDocument::new(domain), |coverage, variable| {
            coverage.with_parameter(
                &variable.name,
                variable.values.clone(),
                dataset.shape_of(&variable.dims),
                variable
                    .dims
                    .iter()
                    .map(|d| d.axis_name().to_string())
                    .collect(),
            )
        })
}
