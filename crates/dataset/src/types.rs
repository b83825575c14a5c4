//! Core dataset types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// A dataset dimension. The declaration order is the canonical layout
/// order (time, altitude, latitude, longitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dim {
    T,
    Z,
    Y,
    X,
}

impl Dim {
    /// Axis name used in coverage documents.
    pub fn axis_name(&self) -> &'static str {
        match self {
            Dim::T => "t",
            Dim::Z => "z",
            Dim::Y => "y",
            Dim::X => "x",
        }
    }
}

/// A data variable laid out row-major over `dims`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub dims: Vec<Dim>,
    /// `None` marks a missing value.
    pub values: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, dims: Vec<Dim>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            dims,
            values,
            units: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Number of non-missing values.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// A labelled dataset on longitude (`x`), latitude (`y`), altitude (`z`)
/// and time (`t`) axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub t: Vec<DateTime<Utc>>,
    variables: BTreeMap<String, Variable>,
}

impl Dataset {
    /// Create a dataset with the given axes and no variables.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, t: Vec<DateTime<Utc>>) -> Self {
        Self {
            x,
            y,
            z,
            t,
            variables: BTreeMap::new(),
        }
    }

    /// Length of one axis.
    pub fn axis_len(&self, dim: Dim) -> usize {
        match dim {
            Dim::T => self.t.len(),
            Dim::Z => self.z.len(),
            Dim::Y => self.y.len(),
            Dim::X => self.x.len(),
        }
    }

    /// Shape of a variable over this dataset's axes.
    pub fn shape_of(&self, dims: &[Dim]) -> Vec<usize> {
        dims.iter().map(|d| self.axis_len(*d)).collect()
    }

    /// Add a variable after checking its layout, replacing any variable
    /// with the same name.
    pub fn add_variable(&mut self, variable: Variable) -> Result<()> {
        for (i, dim) in variable.dims.iter().enumerate() {
            if variable.dims[..i].contains(dim) {
                return Err(DatasetError::DuplicateDimension(variable.name.clone()));
            }
        }

        let expected: usize = self.shape_of(&variable.dims).iter().product();
        if expected != variable.values.len() {
            return Err(DatasetError::ShapeMismatch {
                variable: variable.name.clone(),
                expected,
                actual: variable.values.len(),
            });
        }

        self.variables.insert(variable.name.clone(), variable);
        Ok(())
    }

    /// Builder form of [`Dataset::add_variable`].
    pub fn with_variable(mut self, variable: Variable) -> Result<Self> {
        self.add_variable(variable)?;
        Ok(self)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Variables in name order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Rename a variable in place. Renaming onto another existing variable
    /// is [`DatasetError::NameConflict`].
    pub fn rename_variable(&mut self, from: &str, to: &str) -> Result<()> {
        if !self.variables.contains_key(from) {
            return Err(DatasetError::VariableNotFound(from.to_string()));
        }
        if from == to {
            return Ok(());
        }
        if self.variables.contains_key(to) {
            return Err(DatasetError::NameConflict(to.to_string()));
        }

        let mut variable = self
            .variables
            .remove(from)
            .ok_or_else(|| DatasetError::VariableNotFound(from.to_string()))?;
        variable.name = to.to_string();
        self.variables.insert(to.to_string(), variable);
        Ok(())
    }

    /// Drop every variable whose name is not listed. Returns the names
    /// that were requested but not present.
    pub fn retain_variables(&mut self, names: &[String]) -> Vec<String> {
        self.variables.retain(|name, _| names.contains(name));
        names
            .iter()
            .filter(|n| !self.variables.contains_key(*n))
            .cloned()
            .collect()
    }

    /// Value of a variable at per-axis indices (only the variable's own
    /// dimensions are read).
    pub fn value_at(&self, name: &str, index: &AxisIndex) -> Option<f64> {
        let variable = self.variables.get(name)?;
        let shape = self.shape_of(&variable.dims);
        let mut flat = 0;
        for (dim, len) in variable.dims.iter().zip(&shape) {
            let i = index.get(*dim);
            if i >= *len {
                return None;
            }
            flat = flat * len + i;
        }
        variable.values.get(flat).copied().flatten()
    }

    /// Keep only the z levels accepted by `keep`, re-laying every variable
    /// that spans the z axis.
    pub fn select_z(&mut self, keep: impl Fn(f64) -> bool) {
        let kept: Vec<usize> = (0..self.z.len()).filter(|&i| keep(self.z[i])).collect();
        if kept.len() == self.z.len() {
            return;
        }

        let old_shapes: BTreeMap<String, Vec<usize>> = self
            .variables
            .values()
            .map(|v| (v.name.clone(), self.shape_of(&v.dims)))
            .collect();

        self.z = kept.iter().map(|&i| self.z[i]).collect();

        for variable in self.variables.values_mut() {
            let Some(z_pos) = variable.dims.iter().position(|d| *d == Dim::Z) else {
                continue;
            };
            let old_shape = &old_shapes[&variable.name];
            let mut new_shape = old_shape.clone();
            new_shape[z_pos] = kept.len();

            let mut values = Vec::with_capacity(new_shape.iter().product());
            for_each_index(&new_shape, |idx| {
                let mut old_idx = idx.to_vec();
                old_idx[z_pos] = kept[idx[z_pos]];
                values.push(variable.values[flat_index(old_shape, &old_idx)]);
            });
            variable.values = values;
        }
    }
}

/// Indices along each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisIndex {
    pub t: usize,
    pub z: usize,
    pub y: usize,
    pub x: usize,
}

impl AxisIndex {
    pub fn new(t: usize, z: usize, y: usize, x: usize) -> Self {
        Self { t, z, y, x }
    }

    pub fn get(&self, dim: Dim) -> usize {
        match dim {
            Dim::T => self.t,
            Dim::Z => self.z,
            Dim::Y => self.y,
            Dim::X => self.x,
        }
    }
}

/// Row-major flat offset of a multi-index.
pub(crate) fn flat_index(shape: &[usize], idx: &[usize]) -> usize {
    shape
        .iter()
        .zip(idx)
        .fold(0, |acc, (len, i)| acc * len + i)
}

/// Visit every multi-index of `shape` in row-major order.
pub(crate) fn for_each_index(shape: &[usize], mut f: impl FnMut(&[usize])) {
    if shape.iter().any(|&len| len == 0) {
        return;
    }
    let mut idx = vec![0usize; shape.len()];
    loop {
        f(&idx);

        let mut axis = shape.len();
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] < shape[axis] {
                break;
            }
            idx[axis] = 0;
        }
    }
}
