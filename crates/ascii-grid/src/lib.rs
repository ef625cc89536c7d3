//! ASCII Raster Grid Reading, Transformation and Writing
//!
//! This crate handles the plain-text ASCII grid (`.asc`) raster format: a
//! six-line header followed by a row-major matrix of cell values. It
//! provides:
//!
//! - **Header parsing**: case-insensitive keys, integer/float values,
//!   required-key validation with line-numbered errors
//! - **Matrix loading**: from a grid body (strict shape checks) or a
//!   constant fill
//! - **Transform pipelines**: element, row, column and whole-matrix stages
//!   in a deterministic order
//! - **Writing**: tab-delimited output with printf-style number formats
//!
//! # Architecture
//!
//! ```text
//! AsciiGridGenerator
//!      │
//!      ├─► read_headers / GridHeaders::new
//!      │
//!      ├─► load_initial_matrix
//!      │
//!      ├─► TransformPipeline::run
//!      │
//!      └─► write_grid
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ascii_grid::{AsciiGridGenerator, GenerateRequest, NumberFormat};
//!
//! let generator = AsciiGridGenerator::from_file("wind_map.asc")?;
//! generator.generate(
//!     GenerateRequest::new("annual_energy.asc", -9999.0)
//!         .with_every_element(|v, headers| {
//!             if headers.is_nodata(v) { v } else { 0.5 * 1.225 * v.powi(3) * 24.0 * 365.25 }
//!         })
//!         .with_number_format(NumberFormat::Integer),
//! )?;
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod grid;
pub mod header;
pub mod matrix;
pub mod transform;
pub mod writer;

// Re-export commonly used types at crate root
pub use config::WriteOptions;
pub use error::{AsciiGridError, ErrorKind, Result};
pub use format::NumberFormat;
pub use generator::{AsciiGridGenerator, GenerateRequest, GeneratorBuilder};
pub use grid::AsciiGrid;
pub use header::{
    parse_headers, read_headers, Extent, GridHeaders, HeaderValue, HEADER_LINES, REQUIRED_HEADERS,
};
pub use matrix::{constant_matrix, load_initial_matrix, read_matrix};
pub use transform::{Transform, TransformPipeline};
pub use writer::{write_grid, write_grid_to};
