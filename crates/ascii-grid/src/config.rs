//! Options controlling how grids are written.

use serde::{Deserialize, Serialize};

use crate::error::{AsciiGridError, Result};
use crate::format::NumberFormat;

/// Configuration for the grid writer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Format applied to every body cell.
    pub number_format: NumberFormat,

    /// Replace NaN cells with 0 before writing.
    ///
    /// This targets NaN produced by transform arithmetic, not the grid's
    /// `nodata_value` sentinel.
    pub fill_nan: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            number_format: NumberFormat::Integer,
            fill_nan: true,
        }
    }
}

impl WriteOptions {
    /// Set the body number format.
    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    /// Set the body number format from a printf-style string such as `%.2f`.
    pub fn with_printf(self, directive: &str) -> Result<Self> {
        Ok(self.with_number_format(directive.parse()?))
    }

    /// Enable or disable NaN filling.
    pub fn with_fill_nan(mut self, fill_nan: bool) -> Self {
        self.fill_nan = fill_nan;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        // f64 carries at most 17 significant digits; anything wider is noise.
        const MAX_PRECISION: usize = 17;

        match self.number_format {
            NumberFormat::Fixed(p) | NumberFormat::Scientific(p) if p > MAX_PRECISION => {
                Err(AsciiGridError::configuration(format!(
                    "number format precision {} exceeds {}",
                    p, MAX_PRECISION
                )))
            }
            _ => Ok(()),
        }
    }
}
