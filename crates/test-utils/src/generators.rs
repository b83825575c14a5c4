//! Test data generators for synthetic forecast datasets.
//!
//! Values follow predictable patterns so tests can check that data survives
//! merging and encoding at the right coordinates.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dataset::{Dataset, Dim, Variable};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Returns
///
/// Row-major values (row 0 first), every cell present.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], Some(1000.0)); // col=1, row=0
/// assert_eq!(grid[10], Some(1.0));   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(Some((col * 1000 + row) as f64));
        }
    }
    data
}

/// Like [`create_test_grid`] but every `every`-th cell is missing.
pub fn create_grid_with_gaps(width: usize, height: usize, every: usize) -> Vec<Option<f64>> {
    create_test_grid(width, height)
        .into_iter()
        .enumerate()
        .map(|(i, v)| if every > 0 && i % every == 0 { None } else { v })
        .collect()
}

/// `count` timestamps six hours apart starting at `start`.
pub fn six_hourly(start: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|i| start + Duration::hours(6 * i as i64))
        .collect()
}

/// 2024-02-01T00:00:00Z
pub fn february_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// A single-level forecast dataset with one `T, Z, Y, X` variable.
///
/// Axes start at `(x0, y0)` with 0.5 degree spacing; the variable holds
/// `base + flat index` for every cell.
pub fn create_model_dataset(
    variable: &str,
    base: f64,
    x0: f64,
    y0: f64,
    (nx, ny): (usize, usize),
    times: Vec<DateTime<Utc>>,
) -> Dataset {
    let x = (0..nx).map(|i| x0 + i as f64 * 0.5).collect();
    let y = (0..ny).map(|j| y0 + j as f64 * 0.5).collect();
    let n = nx * ny * times.len();
    let values = (0..n).map(|i| Some(base + i as f64)).collect();

    Dataset::new(x, y, vec![0.0], times)
        .with_variable(Variable::new(
            variable,
            vec![Dim::T, Dim::Z, Dim::Y, Dim::X],
            values,
        ))
        .expect("generated variable matches its axes")
}
