//! NetCDF decoding for forecast assets.
//!
//! Reads the coordinate axes (`geo_x`, `geo_y`, `geo_z`, `time` by default)
//! and data variables of a NetCDF-4/HDF5 file into a [`dataset::Dataset`].
//! CF conventions are honoured for time units, `_FillValue`/`missing_value`
//! masking and `scale_factor`/`add_offset` packing.
//!
//! Requires the system netCDF and HDF5 libraries (libnetcdf-dev, libhdf5-dev).

pub mod cf_time;
pub mod error;
pub mod native;

pub use cf_time::{decode_times, TimeUnits};
pub use error::{NetCdfError, NetCdfResult};
pub use native::{decode_dataset, decode_file, silence_hdf5_errors, CoordinateNames};
