//! Outer-join merging of per-model datasets.
//!
//! Each source dataset comes from one catalog item. Variables listed for
//! renaming get a `_<model>` suffix so datasets from different models sit
//! side by side, then all inputs are aligned on the union of their axes.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use crate::error::{DatasetError, Result};
use crate::types::{flat_index, for_each_index, Dataset, Dim, Variable};

/// A dataset paired with the model identifier of its source item.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedDataset {
    pub model: String,
    pub dataset: Dataset,
}

impl TaggedDataset {
    pub fn new(model: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            model: model.into(),
            dataset,
        }
    }

    /// Tag a dataset from its item's model property.
    ///
    /// Strings are used verbatim, numbers in their JSON rendering. Any other
    /// value, or no value, is [`DatasetError::MissingModel`].
    pub fn from_property(item_id: &str, model: Option<&Value>, dataset: Dataset) -> Result<Self> {
        let model = match model {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(DatasetError::MissingModel(item_id.to_string())),
        };
        Ok(Self::new(model, dataset))
    }
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged(Dataset),
    /// No inputs were given.
    NoData,
}

impl MergeOutcome {
    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            MergeOutcome::Merged(ds) => Some(ds),
            MergeOutcome::NoData => None,
        }
    }
}

/// Name a variable takes after tagging with its model.
pub fn tagged_name(variable: &str, model: &str) -> String {
    format!("{}_{}", variable, model)
}

/// Merge tagged datasets into one aggregate dataset.
///
/// Every name in `variables` is renamed to `<name>_<model>` in its source
/// before the join; a source missing one of them fails with
/// [`DatasetError::VariableNotFound`]. An axis every input shares keeps its
/// native order; differing axes become their sorted union. Cells no input
/// covers stay `None`. Variables that still share a name must agree wherever
/// both hold a value.
pub fn merge_datasets(inputs: Vec<TaggedDataset>, variables: &[String]) -> Result<MergeOutcome> {
    if inputs.is_empty() {
        return Ok(MergeOutcome::NoData);
    }

    let mut sources = Vec::with_capacity(inputs.len());
    for TaggedDataset { model, mut dataset } in inputs {
        for name in variables {
            dataset.rename_variable(name, &tagged_name(name, &model))?;
        }
        sources.push(dataset);
    }

    let x = join_axis(&collect_axes(&sources, |d| &d.x), f64::total_cmp);
    let y = join_axis(&collect_axes(&sources, |d| &d.y), f64::total_cmp);
    let z = join_axis(&collect_axes(&sources, |d| &d.z), f64::total_cmp);
    let t = join_axis(&collect_axes(&sources, |d| &d.t), Ord::cmp);

    let mut merged = Dataset::new(x, y, z, t);
    let mut pending: Vec<Variable> = Vec::new();

    for source in &sources {
        let maps = AxisMaps::between(source, &merged);

        for variable in source.variables() {
            let target_shape = merged.shape_of(&variable.dims);
            let source_shape = source.shape_of(&variable.dims);

            let position = match pending.iter().position(|v| v.name == variable.name) {
                Some(pos) => {
                    if pending[pos].dims != variable.dims {
                        return Err(DatasetError::MergeConflict {
                            variable: variable.name.clone(),
                            detail: format!(
                                "dimensions {:?} vs {:?}",
                                pending[pos].dims, variable.dims
                            ),
                        });
                    }
                    pos
                }
                None => {
                    let mut fresh = Variable::new(
                        variable.name.clone(),
                        variable.dims.clone(),
                        vec![None; target_shape.iter().product()],
                    );
                    fresh.units = variable.units.clone();
                    pending.push(fresh);
                    pending.len() - 1
                }
            };
            let target = &mut pending[position];

            let mut conflict = None;
            for_each_index(&source_shape, |idx| {
                if conflict.is_some() {
                    return;
                }
                let Some(value) = variable.values[flat_index(&source_shape, idx)] else {
                    return;
                };
                let target_idx: Vec<usize> = variable
                    .dims
                    .iter()
                    .zip(idx)
                    .map(|(dim, i)| maps.get(*dim)[*i])
                    .collect();
                let slot = &mut target.values[flat_index(&target_shape, &target_idx)];
                if let Some(existing) = *slot {
                    if !values_equal(existing, value) {
                        conflict = Some(format!(
                            "conflicting values {} and {} at {:?}",
                            existing, value, target_idx
                        ));
                        return;
                    }
                }
                *slot = Some(value);
            });

            if let Some(detail) = conflict {
                return Err(DatasetError::MergeConflict {
                    variable: variable.name.clone(),
                    detail,
                });
            }
        }
    }

    for variable in pending {
        merged.add_variable(variable)?;
    }

    debug!(
        inputs = sources.len(),
        variables = ?merged.variable_names(),
        x = merged.x.len(),
        y = merged.y.len(),
        z = merged.z.len(),
        t = merged.t.len(),
        "Merged datasets"
    );

    Ok(MergeOutcome::Merged(merged))
}

fn values_equal(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Source-to-aggregate index maps for each axis.
struct AxisMaps {
    x: Vec<usize>,
    y: Vec<usize>,
    z: Vec<usize>,
    t: Vec<usize>,
}

impl AxisMaps {
    fn between(source: &Dataset, merged: &Dataset) -> Self {
        Self {
            x: positions(&source.x, &merged.x, f64::total_cmp),
            y: positions(&source.y, &merged.y, f64::total_cmp),
            z: positions(&source.z, &merged.z, f64::total_cmp),
            t: positions(&source.t, &merged.t, Ord::cmp),
        }
    }

    fn get(&self, dim: Dim) -> &[usize] {
        match dim {
            Dim::X => &self.x,
            Dim::Y => &self.y,
            Dim::Z => &self.z,
            Dim::T => &self.t,
        }
    }
}

fn collect_axes<'a, T>(
    sources: &'a [Dataset],
    axis: impl Fn(&'a Dataset) -> &'a Vec<T>,
) -> Vec<&'a [T]> {
    sources.iter().map(|d| axis(d).as_slice()).collect()
}

/// Aggregate axis of the inputs.
///
/// Identical axes are kept as they are, so a single input or aligned inputs
/// never get reordered. Otherwise the result is the sorted, deduplicated union.
fn join_axis<T: Copy>(axes: &[&[T]], cmp: impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    let same = |a: &[T], b: &[T]| {
        a.len() == b.len() && a.iter().zip(b).all(|(u, v)| cmp(u, v) == Ordering::Equal)
    };
    if let Some((first, rest)) = axes.split_first() {
        if rest.iter().all(|axis| same(*first, *axis)) {
            return first.to_vec();
        }
    }

    let mut all: Vec<T> = axes.iter().flat_map(|axis| axis.iter().copied()).collect();
    all.sort_by(&cmp);
    all.dedup_by(|a, b| cmp(a, b) == Ordering::Equal);
    all
}

/// Index of each source coordinate on the aggregate axis.
fn positions<T>(values: &[T], axis: &[T], cmp: impl Fn(&T, &T) -> Ordering) -> Vec<usize> {
    values
        .iter()
        .filter_map(|v| axis.iter().position(|u| cmp(u, v) == Ordering::Equal))
        .collect()
}
