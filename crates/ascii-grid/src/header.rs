//! ASCII grid header block: values, the ordered header map and the parser.
//!
//! An ASCII grid starts with six `<key> <value>` lines. Keys are matched
//! case-insensitively and stored lower-cased; values are numbers that stay
//! integers when they have no fractional part.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{AsciiGridError, Result};

/// Number of header lines at the top of every ASCII grid.
pub const HEADER_LINES: usize = 6;

/// Header keys every grid must carry.
pub const REQUIRED_HEADERS: [&str; 6] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "cellsize",
    "nodata_value",
];

/// A numeric header value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Int(i64),
    Float(f64),
}

impl HeaderValue {
    /// Build a value from a float, keeping whole numbers as integers.
    pub fn from_f64(value: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value < i64::MAX as f64
        {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    /// Parse a header token. Returns `None` if the token is not numeric.
    pub fn parse(token: &str) -> Option<Self> {
        token.parse::<f64>().ok().map(Self::from_f64)
    }

    /// The value as a float.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            // Debug gives the shortest representation that parses back exactly.
            Self::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for HeaderValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for HeaderValue {
    fn from(value: usize) -> Self {
        Self::from_f64(value as f64)
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

/// Georeferenced bounds of a grid, from the lower-left corner and cell size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Width in map units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in map units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point falls inside the extent.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Insertion-ordered header map.
///
/// Order matters: headers are written back in the order they were parsed
/// or constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridHeaders {
    entries: Vec<(String, HeaderValue)>,
}

impl GridHeaders {
    /// Assemble headers from the six required values.
    pub fn new(
        nrows: usize,
        ncols: usize,
        xllcorner: impl Into<HeaderValue>,
        yllcorner: impl Into<HeaderValue>,
        cellsize: impl Into<HeaderValue>,
        nodata_value: impl Into<HeaderValue>,
    ) -> Self {
        let mut headers = Self::default();
        headers.insert("nrows", nrows);
        headers.insert("ncols", ncols);
        headers.insert("xllcorner", xllcorner);
        headers.insert("yllcorner", yllcorner);
        headers.insert("cellsize", cellsize);
        headers.insert("nodata_value", nodata_value);
        headers
    }

    /// Insert a header. The key is lower-cased; an existing key keeps its
    /// position and gets the new value.
    pub fn insert(&mut self, key: &str, value: impl Into<HeaderValue>) {
        let key = key.to_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a header (case-insensitive).
    pub fn get(&self, key: &str) -> Option<HeaderValue> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every required header is present.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .filter(|key| !self.contains_key(key))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AsciiGridError::MissingHeaders {
                found: self.keys(),
                missing,
            })
        }
    }

    fn required(&self, key: &str) -> Result<HeaderValue> {
        self.get(key).ok_or_else(|| AsciiGridError::MissingHeaders {
            found: self.keys(),
            missing: vec![key.to_string()],
        })
    }

    fn dimension(&self, key: &str) -> Result<usize> {
        match self.required(key)? {
            HeaderValue::Int(n) if n >= 0 => Ok(n as usize),
            other => Err(AsciiGridError::invalid_header(
                key,
                format!("expected a non-negative integer, found {}", other),
            )),
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> Result<usize> {
        self.dimension("nrows")
    }

    /// Number of columns.
    pub fn ncols(&self) -> Result<usize> {
        self.dimension("ncols")
    }

    /// Matrix shape as `(nrows, ncols)`.
    pub fn shape(&self) -> Result<(usize, usize)> {
        Ok((self.nrows()?, self.ncols()?))
    }

    /// Total number of cells, `nrows * ncols`.
    ///
    /// Fails when the product does not fit in memory addressing, so a bogus
    /// header cannot drive an allocation.
    pub fn cell_count(&self) -> Result<usize> {
        let (nrows, ncols) = self.shape()?;
        nrows
            .checked_mul(ncols)
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or_else(|| {
                AsciiGridError::invalid_header(
                    "ncols",
                    format!("{} x {} cells exceeds the addressable grid size", nrows, ncols),
                )
            })
    }

    pub fn xllcorner(&self) -> Result<f64> {
        Ok(self.required("xllcorner")?.as_f64())
    }

    pub fn yllcorner(&self) -> Result<f64> {
        Ok(self.required("yllcorner")?.as_f64())
    }

    pub fn cellsize(&self) -> Result<f64> {
        Ok(self.required("cellsize")?.as_f64())
    }

    /// The no-data sentinel.
    pub fn nodata_value(&self) -> Result<f64> {
        Ok(self.required("nodata_value")?.as_f64())
    }

    /// Check whether a cell value equals the no-data sentinel.
    ///
    /// Returns false when the grid has no `nodata_value` header.
    pub fn is_nodata(&self, value: f64) -> bool {
        self.get("nodata_value")
            .map(|nodata| nodata.as_f64() == value)
            .unwrap_or(false)
    }

    /// Bounds covered by the grid.
    pub fn extent(&self) -> Result<Extent> {
        let (nrows, ncols) = self.shape()?;
        let cellsize = self.cellsize()?;
        let min_x = self.xllcorner()?;
        let min_y = self.yllcorner()?;

        Ok(Extent {
            min_x,
            min_y,
            max_x: min_x + ncols as f64 * cellsize,
            max_y: min_y + nrows as f64 * cellsize,
        })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for GridHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parse the six header lines from a reader, leaving it positioned at the body.
pub fn parse_headers<R: BufRead>(reader: &mut R) -> Result<GridHeaders> {
    let mut headers = GridHeaders::default();
    let mut line = String::new();

    for line_num in 1..=HEADER_LINES {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(AsciiGridError::header_format(
                line_num,
                "unexpected end of file",
            ));
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [key, value] = tokens.as_slice() else {
            return Err(AsciiGridError::header_format(
                line_num,
                format!("expected `<key> <value>`, found {} tokens", tokens.len()),
            ));
        };

        let parsed = HeaderValue::parse(value).ok_or_else(|| {
            AsciiGridError::header_format(
                line_num,
                format!("value '{}' for '{}' is not numeric", value, key),
            )
        })?;

        debug!(line = line_num, key = %key, value = %parsed, "Parsed header line");
        headers.insert(key, parsed);
    }

    headers.validate()?;
    Ok(headers)
}

/// Read the headers of an ASCII grid file without loading its body.
pub fn read_headers(path: impl AsRef<Path>) -> Result<GridHeaders> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    parse_headers(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<GridHeaders> {
        parse_headers(&mut Cursor::new(text))
    }

    const VALID: &str = "ncols 4\nnrows 3\nxllcorner 100.5\nyllcorner -20\ncellsize 0.25\nNODATA_value -9999\n1 2 3 4\n";

    #[test]
    fn test_header_value_normalization() {
        assert_eq!(HeaderValue::parse("4"), Some(HeaderValue::Int(4)));
        assert_eq!(HeaderValue::parse("4.0"), Some(HeaderValue::Int(4)));
        assert_eq!(HeaderValue::parse("-9999"), Some(HeaderValue::Int(-9999)));
        assert_eq!(HeaderValue::parse("0.25"), Some(HeaderValue::Float(0.25)));
        assert_eq!(HeaderValue::parse("abc"), None);
        assert!(matches!(HeaderValue::parse("nan"), Some(HeaderValue::Float(v)) if v.is_nan()));
        assert_eq!(HeaderValue::from(2.0_f64), HeaderValue::Int(2));
    }

    #[test]
    fn test_header_value_display() {
        assert_eq!(HeaderValue::Int(-9999).to_string(), "-9999");
        assert_eq!(HeaderValue::Float(0.25).to_string(), "0.25");
        assert_eq!(HeaderValue::Float(100.5).to_string(), "100.5");
    }

    #[test]
    fn test_parse_valid_headers() {
        let headers = parse(VALID).unwrap();
        assert_eq!(headers.len(), 6);
        assert_eq!(headers.get("ncols"), Some(HeaderValue::Int(4)));
        assert_eq!(headers.get("NROWS"), Some(HeaderValue::Int(3)));
        assert_eq!(headers.get("xllcorner"), Some(HeaderValue::Float(100.5)));
        assert_eq!(headers.get("nodata_value"), Some(HeaderValue::Int(-9999)));
        assert_eq!(
            headers.keys(),
            vec!["ncols", "nrows", "xllcorner", "yllcorner", "cellsize", "nodata_value"]
        );
        assert_eq!(headers.shape().unwrap(), (3, 4));
    }

    #[test]
    fn test_parse_leaves_reader_at_body() {
        let mut cursor = Cursor::new(VALID);
        parse_headers(&mut cursor).unwrap();
        let mut rest = String::new();
        cursor.read_line(&mut rest).unwrap();
        assert_eq!(rest, "1 2 3 4\n");
    }

    #[test]
    fn test_missing_required_header() {
        let text = "ncols 4\nnrows 3\nxllcenter 1\nyllcorner 2\ncellsize 1\nnodata_value -9999\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        match err {
            AsciiGridError::MissingHeaders { found, missing } => {
                assert!(found.contains(&"xllcenter".to_string()));
                assert_eq!(missing, vec!["xllcorner".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_lines_report_line_number() {
        let too_many = "ncols 4\nnrows 3 7\n";
        let err = parse(too_many).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.line(), Some(2));

        let empty = "ncols 4\nnrows 3\nxllcorner 0\n\n";
        assert_eq!(parse(empty).unwrap_err().line(), Some(4));

        let non_numeric = "ncols 4\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize one\n";
        let err = parse(non_numeric).unwrap_err();
        assert_eq!(err.line(), Some(5));
        assert!(err.to_string().contains("'one'"));
    }

    #[test]
    fn test_truncated_header_block() {
        let err = parse("ncols 4\nnrows 3\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut headers = GridHeaders::new(2, 3, 0, 0, 1, -9999);
        headers.insert("NCOLS", 5);
        assert_eq!(headers.keys()[1], "ncols");
        assert_eq!(headers.ncols().unwrap(), 5);
        assert_eq!(headers.len(), 6);
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut headers = GridHeaders::new(2, 3, 0, 0, 1, -9999);
        headers.insert("nrows", -2);
        assert!(matches!(
            headers.nrows(),
            Err(AsciiGridError::InvalidHeader { .. })
        ));
        headers.insert("nrows", 2.5);
        assert_eq!(headers.nrows().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_cell_count_overflow() {
        let headers = GridHeaders::new(3, 4, 0, 0, 1, -9999);
        assert_eq!(headers.cell_count().unwrap(), 12);

        let huge = GridHeaders::new(100_000_000_000, 100_000_000_000, 0, 0, 1, -9999);
        let err = huge.cell_count().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_extent_and_nodata() {
        let headers = GridHeaders::new(10, 20, -5.0, 40.0, 0.5, -9999);
        let extent = headers.extent().unwrap();
        assert_eq!(extent.min_x, -5.0);
        assert_eq!(extent.max_x, 5.0);
        assert_eq!(extent.max_y, 45.0);
        assert_eq!(extent.width(), 10.0);
        assert!(extent.contains(0.0, 42.0));
        assert!(headers.is_nodata(-9999.0));
        assert!(!headers.is_nodata(0.0));
    }

    #[test]
    fn test_to_json_preserves_numbers() {
        let headers = GridHeaders::new(2, 2, 0, 0, 0.5, -9999);
        let json = headers.to_json();
        assert_eq!(json["nrows"], serde_json::json!(2));
        assert_eq!(json["cellsize"], serde_json::json!(0.5));
        let text = serde_json::to_string(&headers).unwrap();
        assert!(text.starts_with("{\"nrows\":2,\"ncols\":2"));
    }
}
