//! Matrix loading: from a grid file body or filled with a constant.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::error::{AsciiGridError, Result};
use crate::header::{GridHeaders, HEADER_LINES};

/// Parse a grid body from a reader positioned just after the header block.
///
/// Each non-blank line is one row and must hold exactly `ncols` values;
/// there must be exactly `nrows` rows. `first_line` is the 1-indexed file
/// line of the first body line, used in error messages.
pub fn parse_body<R: BufRead>(
    reader: &mut R,
    headers: &GridHeaders,
    first_line: usize,
) -> Result<Array2<f64>> {
    // Preallocation is capped; the body decides how much memory is used.
    const MAX_PREALLOCATED_CELLS: usize = 1 << 20;

    let (nrows, ncols) = headers.shape()?;
    let cells = headers.cell_count()?;
    let mut data = Vec::with_capacity(cells.min(MAX_PREALLOCATED_CELLS));
    let mut rows = 0;

    for (offset, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = first_line + offset;

        if line.trim().is_empty() {
            continue;
        }

        if rows == nrows {
            return Err(AsciiGridError::ShapeMismatch {
                expected: (nrows, ncols),
                found: (rows + 1, ncols),
            });
        }

        let start = data.len();
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| {
                AsciiGridError::body_format(line_num, format!("value '{}' is not numeric", token))
            })?;
            data.push(value);
        }

        let found = data.len() - start;
        if found != ncols {
            return Err(AsciiGridError::body_format(
                line_num,
                format!("expected {} values, found {}", ncols, found),
            ));
        }
        rows += 1;
    }

    if rows != nrows {
        return Err(AsciiGridError::ShapeMismatch {
            expected: (nrows, ncols),
            found: (rows, ncols),
        });
    }

    Array2::from_shape_vec((nrows, ncols), data)
        .map_err(|e| AsciiGridError::body_format(first_line, e.to_string()))
}

/// Read the body of a grid file, skipping its header block.
pub fn read_matrix(path: impl AsRef<Path>, headers: &GridHeaders) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let mut skipped = String::new();
    for _ in 0..HEADER_LINES {
        skipped.clear();
        reader.read_line(&mut skipped)?;
    }

    let matrix = parse_body(&mut reader, headers, HEADER_LINES + 1)?;
    debug!(path = %path.display(), shape = ?matrix.dim(), "Loaded grid body");
    Ok(matrix)
}

/// Build a matrix of the header-declared shape with every cell set to `value`.
pub fn constant_matrix(headers: &GridHeaders, value: f64) -> Result<Array2<f64>> {
    headers.cell_count()?;
    Ok(Array2::from_elem(headers.shape()?, value))
}

/// Produce the starting matrix for a generation run.
///
/// Uses the body of `source` when it names an existing file, otherwise a
/// constant matrix filled with `default_element`.
pub fn load_initial_matrix(
    source: Option<&Path>,
    headers: &GridHeaders,
    default_element: f64,
) -> Result<Array2<f64>> {
    match source {
        Some(path) if path.is_file() => read_matrix(path, headers),
        _ => {
            debug!(default_element, "Using constant-filled matrix");
            constant_matrix(headers, default_element)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    fn headers(nrows: usize, ncols: usize) -> GridHeaders {
        GridHeaders::new(nrows, ncols, 0, 0, 1, -9999)
    }

    #[test]
    fn test_parse_body() {
        let body = "1 2 3\n\n4\t5 6\n";
        let matrix = parse_body(&mut Cursor::new(body), &headers(2, 3), 7).unwrap();
        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[0, 2]], 3.0);
        assert_eq!(matrix[[1, 0]], 4.0);
    }

    #[test]
    fn test_parse_body_accepts_nan_tokens() {
        let matrix = parse_body(&mut Cursor::new("nan 1\n"), &headers(1, 2), 7).unwrap();
        assert!(matrix[[0, 0]].is_nan());
    }

    #[test]
    fn test_non_numeric_body_value() {
        let err = parse_body(&mut Cursor::new("1 2\n3 x\n"), &headers(2, 2), 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.line(), Some(8));
    }

    #[test]
    fn test_wrong_column_count() {
        let err = parse_body(&mut Cursor::new("1 2 3\n"), &headers(1, 2), 7).unwrap_err();
        assert_eq!(err.line(), Some(7));
        assert!(err.to_string().contains("expected 2 values, found 3"));
    }

    #[test]
    fn test_wrong_row_count() {
        let err = parse_body(&mut Cursor::new("1 2\n"), &headers(2, 2), 7).unwrap_err();
        assert!(matches!(
            err,
            AsciiGridError::ShapeMismatch {
                expected: (2, 2),
                found: (1, 2)
            }
        ));

        let err = parse_body(&mut Cursor::new("1 2\n3 4\n5 6\n"), &headers(2, 2), 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_oversized_header_is_an_error() {
        let huge = headers(100_000_000_000, 100_000_000_000);
        let err = parse_body(&mut Cursor::new("1 2\n"), &huge, 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(constant_matrix(&huge, 0.0).is_err());

        // Large but addressable: the short body is reported, nothing is preallocated in full
        let wide = headers(1, 1_000_000_000_000);
        let err = parse_body(&mut Cursor::new("1 2\n"), &wide, 7).unwrap_err();
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_constant_matrix() {
        let matrix = constant_matrix(&headers(3, 4), 7.5).unwrap();
        assert_eq!(matrix.dim(), (3, 4));
        assert!(matrix.iter().all(|&v| v == 7.5));
    }

    #[test]
    fn test_missing_source_falls_back_to_constant() {
        let matrix = load_initial_matrix(
            Some(Path::new("/nonexistent/grid.asc")),
            &headers(2, 2),
            1.0,
        )
        .unwrap();
        assert!(matrix.iter().all(|&v| v == 1.0));
    }
}
