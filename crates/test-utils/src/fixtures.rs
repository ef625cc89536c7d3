//! Common test fixtures for ASCII grid tests.
//!
//! Fixtures are the literal text of small `.asc` files so tests can write
//! them to a temp dir and read them back.

/// 2x2 wind speed map in m/s with one no-data cell.
pub const WIND_MAP_2X2: &str = "\
ncols 2
nrows 2
xllcorner 0
yllcorner 0
cellsize 1
nodata_value -9999
2 3
-9999 4
";

/// 3x4 grid with mixed-case keys, float georeferencing and an extra blank line.
pub const MIXED_CASE_3X4: &str = "\
NCOLS        4
NROWS        3
XLLCORNER    -122.5
YLLCORNER    37.25
CELLSIZE     0.125
NODATA_value -9999
1.5 2.5 3.5 4.5

5 6 7 8
-9999 10 11 12
";

/// Header uses `xllcenter`, so `xllcorner` is missing.
pub const MISSING_XLLCORNER: &str = "\
ncols 2
nrows 1
xllcenter 0.5
yllcorner 0
cellsize 1
nodata_value -9999
1 2
";

/// Third header line has three tokens.
pub const EXTRA_TOKEN_LINE_3: &str = "\
ncols 2
nrows 1
xllcorner 0 0
yllcorner 0
cellsize 1
nodata_value -9999
1 2
";

/// Sixth header line has a non-numeric value.
pub const NON_NUMERIC_LINE_6: &str = "\
ncols 2
nrows 1
xllcorner 0
yllcorner 0
cellsize 1
nodata_value none
1 2
";

/// Body declares two rows but holds one.
pub const SHORT_BODY: &str = "\
ncols 2
nrows 2
xllcorner 0
yllcorner 0
cellsize 1
nodata_value -9999
1 2
";

/// Annual energy density for a wind speed, in Wh/m² per year.
///
/// `0.5 * air density * v³ * hours per year`
pub fn annual_energy(wind_speed: f64) -> f64 {
    0.5 * 1.225 * wind_speed.powi(3) * 24.0 * 365.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_have_six_header_lines() {
        for fixture in [WIND_MAP_2X2, MIXED_CASE_3X4, SHORT_BODY] {
            assert!(fixture.lines().count() >= 7);
        }
    }

    #[test]
    fn test_annual_energy() {
        // 0.5 * 1.225 * 8 * 8766
        assert!((annual_energy(2.0) - 42953.4).abs() < 1e-6);
    }
}
