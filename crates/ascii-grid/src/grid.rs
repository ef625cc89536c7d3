//! A fully loaded ASCII grid: headers plus matrix.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;

use crate::config::WriteOptions;
use crate::error::{AsciiGridError, Result};
use crate::header::{parse_headers, GridHeaders, HEADER_LINES};
use crate::matrix::parse_body;
use crate::writer::write_grid;

/// Grid headers together with the cell values they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub headers: GridHeaders,
    /// Cell values, row 0 is the northern-most row.
    pub data: Array2<f64>,
}

impl AsciiGrid {
    /// Create a grid, checking the matrix shape against the headers.
    pub fn new(headers: GridHeaders, data: Array2<f64>) -> Result<Self> {
        headers.validate()?;
        let expected = headers.shape()?;
        if data.dim() != expected {
            return Err(AsciiGridError::ShapeMismatch {
                expected,
                found: data.dim(),
            });
        }
        Ok(Self { headers, data })
    }

    /// Read a whole grid file in one pass.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let headers = parse_headers(&mut reader)?;
        let data = parse_body(&mut reader, &headers, HEADER_LINES + 1)?;
        Ok(Self { headers, data })
    }

    /// Write the grid to `path`.
    pub fn write(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
        write_grid(path, &self.headers, self.data.clone(), options)
    }

    /// Matrix shape as `(nrows, ncols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Value at a cell, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    /// Whether the cell holds the no-data sentinel.
    pub fn is_nodata(&self, row: usize, col: usize) -> bool {
        self.get(row, col)
            .map(|v| self.headers.is_nodata(v))
            .unwrap_or(false)
    }

    /// Map coordinates of a cell's center.
    pub fn cell_center(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        let (nrows, ncols) = self.shape();
        if row >= nrows || col >= ncols {
            return None;
        }

        let cellsize = self.headers.cellsize().ok()?;
        let x = self.headers.xllcorner().ok()? + (col as f64 + 0.5) * cellsize;
        let y = self.headers.yllcorner().ok()? + ((nrows - row) as f64 - 0.5) * cellsize;
        Some((x, y))
    }
}
