//! Decoding tests against small NetCDF files written on the fly.

use std::path::Path;

use chrono::{TimeZone, Utc};
use dataset::{AxisIndex, Dim};
use netcdf_parser::{decode_dataset, decode_file, CoordinateNames, NetCdfError};
use test_utils::assert_approx_eq;

fn write_sample(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("geo_x", 3).unwrap();
    file.add_dimension("geo_y", 2).unwrap();

    let mut x = file.add_variable::<f64>("geo_x", &["geo_x"]).unwrap();
    x.put_values(&[10.0, 10.5, 11.0], ..).unwrap();

    let mut y = file.add_variable::<f64>("geo_y", &["geo_y"]).unwrap();
    y.put_values(&[45.0, 45.5], ..).unwrap();

    let mut cout = file
        .add_variable::<f64>("COUT", &["geo_y", "geo_x"])
        .unwrap();
    cout.put_values(&[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0], ..)
        .unwrap();
}

/// Forecast layout: `time, geo_z, geo_y, geo_x` with packed values. `geo_z`
/// has no coordinate variable; `time` has one only when `with_time` is set.
fn write_forecast(path: &Path, with_time: bool) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", 2).unwrap();
    file.add_dimension("geo_z", 2).unwrap();
    file.add_dimension("geo_y", 2).unwrap();
    file.add_dimension("geo_x", 3).unwrap();

    if with_time {
        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_values(&[0.0, 6.0], ..).unwrap();
        time.put_attribute("units", "hours since 2024-02-01 00:00:00")
            .unwrap();
    }

    let mut x = file.add_variable::<f64>("geo_x", &["geo_x"]).unwrap();
    x.put_values(&[10.0, 10.5, 11.0], ..).unwrap();

    let mut y = file.add_variable::<f64>("geo_y", &["geo_y"]).unwrap();
    y.put_values(&[46.0, 45.5], ..).unwrap();

    let raw: Vec<f64> = (0..24).map(f64::from).collect();
    let mut cout = file
        .add_variable::<f64>("COUT", &["time", "geo_z", "geo_y", "geo_x"])
        .unwrap();
    cout.put_values(&raw, ..).unwrap();
    cout.put_attribute("scale_factor", 0.1).unwrap();
    cout.put_attribute("add_offset", 273.15).unwrap();
}

// ============================================================================
// Decoding from bytes
// ============================================================================

#[test]
fn test_decode_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);
    let bytes = std::fs::read(&path).unwrap();

    let ds = decode_dataset(&bytes, &CoordinateNames::default(), &["COUT".to_string()]).unwrap();

    assert_eq!(ds.x, vec![10.0, 10.5, 11.0]);
    assert_eq!(ds.y, vec![45.0, 45.5]);
    assert!(ds.z.is_empty());
    assert!(ds.t.is_empty());

    let cout = ds.variable("COUT").unwrap();
    assert_eq!(cout.dims, vec![Dim::Y, Dim::X]);
    assert_eq!(cout.values[2], None);
    assert_eq!(ds.value_at("COUT", &AxisIndex::new(0, 0, 1, 2)), Some(6.0));
}

#[test]
fn test_all_data_variables_when_none_requested() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let ds = decode_file(&path, &CoordinateNames::default(), &[]).unwrap();
    assert_eq!(ds.variable_names(), vec!["COUT".to_string()]);
}

#[test]
fn test_forecast_layout_with_index_z_axis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.nc");
    write_forecast(&path, true);

    let ds = decode_file(&path, &CoordinateNames::default(), &["COUT".to_string()]).unwrap();

    assert_eq!(ds.z, vec![0.0, 1.0]);
    assert_eq!(ds.y, vec![46.0, 45.5]);
    assert_eq!(
        ds.t,
        vec![
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap(),
        ]
    );

    let cout = ds.variable("COUT").unwrap();
    assert_eq!(cout.dims, vec![Dim::T, Dim::Z, Dim::Y, Dim::X]);
    assert_eq!(cout.values.len(), 24);

    // Last cell of the second time step and upper level: raw 23.
    let value = ds.value_at("COUT", &AxisIndex::new(1, 1, 1, 2)).unwrap();
    assert_approx_eq!(value, 23.0 * 0.1 + 273.15, 1e-9);
    let value = ds.value_at("COUT", &AxisIndex::new(0, 1, 0, 0)).unwrap();
    assert_approx_eq!(value, 6.0 * 0.1 + 273.15, 1e-9);
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_missing_requested_variable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let err = decode_file(&path, &CoordinateNames::default(), &["TEMP".to_string()]).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
}

#[test]
fn test_missing_coordinate_axis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let coords = CoordinateNames {
        x: "lon".to_string(),
        ..CoordinateNames::default()
    };
    let err = decode_file(&path, &coords, &[]).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
}

#[test]
fn test_time_dimension_without_coordinate_variable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.nc");
    write_forecast(&path, false);

    let err = decode_file(&path, &CoordinateNames::default(), &["COUT".to_string()]).unwrap_err();
    match err {
        NetCdfError::MissingData(detail) => assert!(detail.contains("time")),
        other => panic!("expected MissingData, got {:?}", other),
    }
}
