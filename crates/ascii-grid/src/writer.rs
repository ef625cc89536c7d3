//! Serializes headers and a matrix to the ASCII grid format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use tracing::info;

use crate::config::WriteOptions;
use crate::error::{AsciiGridError, Result};
use crate::header::GridHeaders;

/// Write a grid to `writer`.
///
/// Header lines are `key<TAB>value` in insertion order; body rows are
/// tab-delimited and formatted with `options.number_format`.
pub fn write_grid_to<W: Write>(
    writer: &mut W,
    headers: &GridHeaders,
    matrix: &Array2<f64>,
    options: &WriteOptions,
) -> Result<()> {
    for (key, value) in headers.iter() {
        writeln!(writer, "{}\t{}", key, value)?;
    }

    let mut line = String::new();
    for row in matrix.rows() {
        line.clear();
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            line.push_str(&options.number_format.format(*value));
        }
        writeln!(writer, "{}", line)?;
    }

    Ok(())
}

/// Write a grid file.
///
/// The matrix shape is checked against the headers before the file is
/// created. With `options.fill_nan`, NaN cells are replaced with 0.
pub fn write_grid(
    path: impl AsRef<Path>,
    headers: &GridHeaders,
    mut matrix: Array2<f64>,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    options.validate()?;

    let expected = headers.shape()?;
    if matrix.dim() != expected {
        return Err(AsciiGridError::ShapeMismatch {
            expected,
            found: matrix.dim(),
        });
    }

    if options.fill_nan {
        matrix.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_grid_to(&mut writer, headers, &matrix, options)?;
    writer.flush()?;

    info!(
        path = %path.display(),
        rows = expected.0,
        cols = expected.1,
        format = %options.number_format,
        "Wrote ASCII grid"
    );
    Ok(())
}
