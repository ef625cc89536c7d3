//! Number formats for grid body cells.
//!
//! Formats are named with the printf-style strings grid tools commonly use
//! (`%d`, `%.3f`, `%e`, `%g`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AsciiGridError;

/// How cell values are rendered in the grid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NumberFormat {
    /// `%d`: integer, truncated toward zero.
    #[default]
    Integer,
    /// `%.Nf`: fixed-point with N decimals.
    Fixed(usize),
    /// `%.Ne`: scientific notation with N decimals.
    Scientific(usize),
    /// `%g`: shortest representation that reads back exactly.
    General,
}

impl NumberFormat {
    /// Render a single cell value.
    ///
    /// Non-finite values print as `nan`, `inf` or `-inf` for every format.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "nan".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_string();
        }

        match *self {
            Self::Integer => {
                // `+ 0.0` turns a truncated -0.0 into 0.0 so it prints as "0".
                format!("{:.0}", value.trunc() + 0.0)
            }
            Self::Fixed(precision) => format!("{:.*}", precision, value),
            Self::Scientific(precision) => c_exponent(&format!("{:.*e}", precision, value)),
            Self::General => format!("{}", value),
        }
    }

    /// The printf-style name of this format.
    pub fn as_printf(&self) -> String {
        match self {
            Self::Integer => "%d".to_string(),
            Self::Fixed(p) => format!("%.{}f", p),
            Self::Scientific(p) => format!("%.{}e", p),
            Self::General => "%g".to_string(),
        }
    }
}

/// Rewrite Rust's `1.5e3` exponent into C's `1.5e+03`.
fn c_exponent(rust: &str) -> String {
    match rust.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rust.to_string(),
    }
}

impl FromStr for NumberFormat {
    type Err = AsciiGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AsciiGridError::configuration(format!("unsupported number format '{}'", s));

        let directive = s.trim().strip_prefix('%').ok_or_else(invalid)?;
        let split = directive.char_indices().last().map(|(i, _)| i).unwrap_or(0);
        let (body, conversion) = directive.split_at(split);

        let precision = match body {
            "" => None,
            _ => Some(
                body.strip_prefix('.')
                    .and_then(|p| p.parse::<usize>().ok())
                    .ok_or_else(invalid)?,
            ),
        };

        match (conversion, precision) {
            ("d" | "i", None) => Ok(Self::Integer),
            ("f", p) => Ok(Self::Fixed(p.unwrap_or(6))),
            ("e", p) => Ok(Self::Scientific(p.unwrap_or(6))),
            ("g", None) => Ok(Self::General),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for NumberFormat {
    type Error = AsciiGridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NumberFormat> for String {
    fn from(value: NumberFormat) -> Self {
        value.as_printf()
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_printf())
    }
}
