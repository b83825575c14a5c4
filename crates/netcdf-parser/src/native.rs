//! Native NetCDF decoding using the netcdf library.
//!
//! The netcdf library requires a file path (it wraps libnetcdf/HDF5 which need
//! file handles). When reading from bytes, we write to a temp file first.
//! On Linux, we use `/dev/shm` (memory-backed tmpfs) to minimize I/O latency.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use chrono::{DateTime, Utc};
use dataset::{Dataset, Dim, Variable};
use tracing::debug;

use crate::cf_time::decode_times;
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// HDF5 prints diagnostics even for errors the caller handles (e.g. probing
/// optional attributes). Call early in `main()`; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Names of the coordinate variables (and their dimensions) in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateNames {
    pub x: String,
    pub y: String,
    pub z: String,
    pub t: String,
}

impl Default for CoordinateNames {
    fn default() -> Self {
        Self {
            x: "geo_x".to_string(),
            y: "geo_y".to_string(),
            z: "geo_z".to_string(),
            t: "time".to_string(),
        }
    }
}

impl CoordinateNames {
    /// Dataset dimension for a file dimension name.
    pub fn dim_for(&self, name: &str) -> Option<Dim> {
        if name == self.x {
            Some(Dim::X)
        } else if name == self.y {
            Some(Dim::Y)
        } else if name == self.z {
            Some(Dim::Z)
        } else if name == self.t {
            Some(Dim::T)
        } else {
            None
        }
    }

    fn is_coordinate(&self, name: &str) -> bool {
        self.dim_for(name).is_some()
    }
}

/// Decode NetCDF (or HDF5-backed NetCDF-4) bytes into a dataset.
///
/// `variables` lists the data variables to read; when empty, every
/// non-coordinate variable laid out on the coordinate dimensions is read.
pub fn decode_dataset(
    data: &[u8],
    coords: &CoordinateNames,
    variables: &[String],
) -> NetCdfResult<Dataset> {
    silence_hdf5_errors();

    let temp = TempFile::write(data)?;
    decode_file(temp.path(), coords, variables)
}

/// Decode a NetCDF file on disk into a dataset.
pub fn decode_file(
    path: &Path,
    coords: &CoordinateNames,
    variables: &[String],
) -> NetCdfResult<Dataset> {
    let file = netcdf::open(path)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let x = read_axis(&file, &coords.x)?
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", coords.x)))?;
    let y = read_axis(&file, &coords.y)?
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", coords.y)))?;
    let z = read_axis(&file, &coords.z)?.unwrap_or_default();
    let t = read_time_axis(&file, &coords.t)?;

    let mut dataset = Dataset::new(x, y, z, t);

    let names: Vec<String> = if variables.is_empty() {
        file.variables()
            .filter(|v| !coords.is_coordinate(&v.name()))
            .filter(|v| {
                !v.dimensions().is_empty()
                    && v.dimensions().iter().all(|d| coords.dim_for(&d.name()).is_some())
            })
            .map(|v| v.name())
            .collect()
    } else {
        variables.to_vec()
    };

    for name in &names {
        let var = file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;
        dataset.add_variable(read_variable(&var, coords)?)?;
    }

    debug!(
        variables = ?names,
        x = dataset.x.len(),
        y = dataset.y.len(),
        z = dataset.z.len(),
        t = dataset.t.len(),
        "Decoded NetCDF dataset"
    );

    Ok(dataset)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Coordinate values of an axis. A dimension without a coordinate variable
/// gets the index axis `0..len`; `None` when neither exists.
fn read_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Option<Vec<f64>>> {
    let Some(var) = file.variable(name) else {
        return Ok(file
            .dimension(name)
            .map(|dim| (0..dim.len()).map(|i| i as f64).collect()));
    };
    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
    Ok(Some(values))
}

fn read_time_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let Some(var) = file.variable(name) else {
        if file.dimension(name).map_or(false, |dim| dim.len() > 0) {
            return Err(NetCdfError::MissingData(format!(
                "{} coordinate variable for the {} dimension",
                name, name
            )));
        }
        return Ok(Vec::new());
    };
    let offsets: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
    let units = get_str_attr(&var, "units")
        .ok_or_else(|| NetCdfError::MissingData(format!("{} units attribute", name)))?;
    decode_times(&units, &offsets)
}

fn read_variable(var: &netcdf::Variable, coords: &CoordinateNames) -> NetCdfResult<Variable> {
    let name = var.name();
    let dims = var
        .dimensions()
        .iter()
        .map(|d| {
            coords.dim_for(&d.name()).ok_or_else(|| {
                NetCdfError::InvalidFormat(format!(
                    "variable {} uses non-coordinate dimension {}",
                    name,
                    d.name()
                ))
            })
        })
        .collect::<NetCdfResult<Vec<Dim>>>()?;

    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    let fill_value = get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"));
    let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);

    let values = mask_and_scale(&raw, fill_value, scale_factor, add_offset);

    let mut variable = Variable::new(name, dims, values);
    if let Some(units) = get_str_attr(var, "units") {
        variable = variable.with_units(units);
    }
    Ok(variable)
}

/// Fill values and NaNs become `None`; everything else is unpacked.
fn mask_and_scale(raw: &[f64], fill: Option<f64>, scale: f64, offset: f64) -> Vec<Option<f64>> {
    raw.iter()
        .map(|&v| {
            if v.is_nan() || fill.map_or(false, |f| v == f) {
                None
            } else {
                Some(v * scale + offset)
            }
        })
        .collect()
}

/// Temp copy of in-memory bytes, removed on drop.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn write(data: &[u8]) -> NetCdfResult<Self> {
        let path = get_optimal_temp_dir().join(generate_temp_filename());
        let mut file = std::fs::File::create(&path)?;
        file.write_all(data)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Get the optimal temp directory for NetCDF file operations.
///
/// On Linux, uses /dev/shm (memory-backed tmpfs) when writable; otherwise the
/// system temp directory.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let test_path = shm_path.join(format!(".netcdf_test_{}", std::process::id()));
            if std::fs::write(&test_path, b"test").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Unique temp file name: process ID, thread ID and a counter.
fn generate_temp_filename() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let tid = std::thread::current().id();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("cube_asset_{}_{:?}_{}.nc", pid, tid, count)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
