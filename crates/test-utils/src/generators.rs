//! Test data generators for creating synthetic grid matrices.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use ndarray::Array2;

/// Creates a test matrix with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that `matrix[[row, col]] == col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_matrix;
///
/// let matrix = create_test_matrix(5, 10);
/// assert_eq!(matrix.dim(), (5, 10));
/// assert_eq!(matrix[[0, 1]], 1000.0); // col=1, row=0
/// assert_eq!(matrix[[1, 0]], 1.0);    // col=0, row=1
/// ```
pub fn create_test_matrix(nrows: usize, ncols: usize) -> Array2<f64> {
    Array2::from_shape_fn((nrows, ncols), |(row, col)| (col * 1000 + row) as f64)
}

/// Creates a wind speed matrix in m/s.
///
/// Values range from 0 to ~25 m/s in a radial pattern (calm in the
/// center, stronger towards the edges).
pub fn create_wind_speed_matrix(nrows: usize, ncols: usize) -> Array2<f64> {
    let center_row = nrows as f64 / 2.0;
    let center_col = ncols as f64 / 2.0;
    let max_dist = (center_row.powi(2) + center_col.powi(2)).sqrt().max(1.0);

    Array2::from_shape_fn((nrows, ncols), |(row, col)| {
        let dr = row as f64 - center_row;
        let dc = col as f64 - center_col;
        (dr.powi(2) + dc.powi(2)).sqrt() / max_dist * 25.0
    })
}

/// Sets every `step`-th cell (row-major) to `nodata`.
pub fn with_nodata(mut matrix: Array2<f64>, nodata: f64, step: usize) -> Array2<f64> {
    if step == 0 {
        return matrix;
    }
    for (i, value) in matrix.iter_mut().enumerate() {
        if i % step == 0 {
            *value = nodata;
        }
    }
    matrix
}
