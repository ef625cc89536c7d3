//! Generator facade: derive a new grid from a source grid or explicit headers.
//!
//! ```text
//! AsciiGridGenerator::build()
//!      │
//!      ├─► source file exists  → read_headers(source)
//!      └─► otherwise           → GridHeaders::new(explicit values)
//!
//! AsciiGridGenerator::generate(request)
//!      │
//!      ├─► load_initial_matrix (source body or constant fill)
//!      ├─► TransformPipeline::run
//!      └─► write_grid
//! ```
//!
//! The whole matrix is computed before the output file is created, so a
//! failing transform never leaves a partial file behind.

use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayViewMut1};
use tracing::{info, warn};

use crate::config::WriteOptions;
use crate::error::{AsciiGridError, Result};
use crate::format::NumberFormat;
use crate::header::{read_headers, GridHeaders, HeaderValue};
use crate::matrix::load_initial_matrix;
use crate::transform::{Transform, TransformPipeline};
use crate::writer::write_grid;

/// Reject header sets whose grids cannot be read back.
///
/// Rows of a zero-column grid are blank lines, which the loader skips, so
/// `ncols == 0` is only allowed together with `nrows == 0`.
fn check_round_trippable(headers: &GridHeaders) -> Result<()> {
    let (nrows, ncols) = headers.shape()?;
    if ncols == 0 && nrows > 0 {
        return Err(AsciiGridError::invalid_header(
            "ncols",
            format!("{} rows of zero columns cannot be written as a grid", nrows),
        ));
    }
    headers.cell_count()?;
    Ok(())
}

/// Builder for [`AsciiGridGenerator`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorBuilder {
    source: Option<PathBuf>,
    nrows: Option<usize>,
    ncols: Option<usize>,
    xllcorner: Option<HeaderValue>,
    yllcorner: Option<HeaderValue>,
    cellsize: Option<HeaderValue>,
    nodata_value: Option<HeaderValue>,
}

impl GeneratorBuilder {
    /// Use an existing grid file for headers and the starting matrix.
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn nrows(mut self, nrows: usize) -> Self {
        self.nrows = Some(nrows);
        self
    }

    pub fn ncols(mut self, ncols: usize) -> Self {
        self.ncols = Some(ncols);
        self
    }

    pub fn xllcorner(mut self, value: impl Into<HeaderValue>) -> Self {
        self.xllcorner = Some(value.into());
        self
    }

    pub fn yllcorner(mut self, value: impl Into<HeaderValue>) -> Self {
        self.yllcorner = Some(value.into());
        self
    }

    pub fn cellsize(mut self, value: impl Into<HeaderValue>) -> Self {
        self.cellsize = Some(value.into());
        self
    }

    pub fn nodata_value(mut self, value: impl Into<HeaderValue>) -> Self {
        self.nodata_value = Some(value.into());
        self
    }

    /// Resolve headers and build the generator.
    ///
    /// A source path that names an existing file wins. Otherwise all six
    /// explicit header values must be set; zero is a valid value.
    pub fn build(self) -> Result<AsciiGridGenerator> {
        if let Some(source) = self.source {
            if source.is_file() {
                let headers = read_headers(&source)?;
                info!(source = %source.display(), "Loaded headers from source grid");
                return Ok(AsciiGridGenerator {
                    source: Some(source),
                    headers,
                });
            }
            warn!(
                source = %source.display(),
                "Source grid is not a file, falling back to explicit headers"
            );
        }

        match (
            self.nrows,
            self.ncols,
            self.xllcorner,
            self.yllcorner,
            self.cellsize,
            self.nodata_value,
        ) {
            (
                Some(nrows),
                Some(ncols),
                Some(xllcorner),
                Some(yllcorner),
                Some(cellsize),
                Some(nodata_value),
            ) => {
                let headers =
                    GridHeaders::new(nrows, ncols, xllcorner, yllcorner, cellsize, nodata_value);
                check_round_trippable(&headers)?;
                info!(nrows, ncols, "Built headers from explicit values");
                Ok(AsciiGridGenerator {
                    source: None,
                    headers,
                })
            }
            (nrows, ncols, xll, yll, cellsize, nodata) => {
                let missing: Vec<&str> = [
                    ("nrows", nrows.is_some()),
                    ("ncols", ncols.is_some()),
                    ("xllcorner", xll.is_some()),
                    ("yllcorner", yll.is_some()),
                    ("cellsize", cellsize.is_some()),
                    ("nodata_value", nodata.is_some()),
                ]
                .into_iter()
                .filter(|(_, present)| !present)
                .map(|(key, _)| key)
                .collect();

                Err(AsciiGridError::configuration(format!(
                    "a source grid file or all six header values must be specified (missing: {})",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Parameters for one [`AsciiGridGenerator::generate`] call.
#[derive(Debug)]
pub struct GenerateRequest {
    output_path: PathBuf,
    default_element: f64,
    pipeline: TransformPipeline,
    options: WriteOptions,
}

impl GenerateRequest {
    /// Request a grid written to `output_path`, starting from
    /// `default_element` when there is no source grid.
    pub fn new(output_path: impl Into<PathBuf>, default_element: f64) -> Self {
        Self {
            output_path: output_path.into(),
            default_element,
            pipeline: TransformPipeline::new(),
            options: WriteOptions::default(),
        }
    }

    /// Replace the whole pipeline.
    pub fn with_pipeline(mut self, pipeline: TransformPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set the explicit transform order.
    pub fn with_order(mut self, order: Vec<Transform>) -> Self {
        self.pipeline = self.pipeline.with_order(order);
        self
    }

    pub fn with_every_element<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64, &GridHeaders) -> f64 + 'static,
    {
        self.pipeline = self.pipeline.with_every_element(f);
        self
    }

    pub fn with_every_row<F>(mut self, f: F) -> Self
    where
        F: FnMut(ArrayViewMut1<'_, f64>, &GridHeaders) + 'static,
    {
        self.pipeline = self.pipeline.with_every_row(f);
        self
    }

    pub fn with_every_column<F>(mut self, f: F) -> Self
    where
        F: FnMut(ArrayViewMut1<'_, f64>, &GridHeaders) + 'static,
    {
        self.pipeline = self.pipeline.with_every_column(f);
        self
    }

    pub fn with_single_run<F>(mut self, f: F) -> Self
    where
        F: FnMut(Array2<f64>, &GridHeaders) -> Array2<f64> + 'static,
    {
        self.pipeline = self.pipeline.with_single_run(f);
        self
    }

    /// Replace the write options.
    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.options = self.options.with_number_format(number_format);
        self
    }

    pub fn with_fill_nan(mut self, fill_nan: bool) -> Self {
        self.options = self.options.with_fill_nan(fill_nan);
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Produces new grids that share one header set.
#[derive(Debug, Clone)]
pub struct AsciiGridGenerator {
    source: Option<PathBuf>,
    headers: GridHeaders,
}

impl AsciiGridGenerator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::default()
    }

    /// Generator backed by an existing grid file.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().source(path).build()
    }

    /// Generator with explicit headers and no source grid.
    pub fn from_headers(headers: GridHeaders) -> Result<Self> {
        headers.validate()?;
        check_round_trippable(&headers)?;
        Ok(Self {
            source: None,
            headers,
        })
    }

    /// Headers shared by every generated grid.
    pub fn headers(&self) -> &GridHeaders {
        &self.headers
    }

    /// Source grid file, if headers came from one.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Load the starting matrix and run `pipeline` over it.
    pub fn compute_matrix(
        &self,
        default_element: f64,
        pipeline: &mut TransformPipeline,
    ) -> Result<Array2<f64>> {
        let matrix = load_initial_matrix(self.source(), &self.headers, default_element)?;
        pipeline.run(matrix, &self.headers)
    }

    /// Compute a new matrix and write it as a grid file.
    pub fn generate(&self, request: GenerateRequest) -> Result<()> {
        let GenerateRequest {
            output_path,
            default_element,
            mut pipeline,
            options,
        } = request;

        if output_path.as_os_str().is_empty() {
            return Err(AsciiGridError::configuration(
                "output path for the new grid is missing",
            ));
        }
        options.validate()?;

        info!(
            output = %output_path.display(),
            stages = pipeline.len(),
            "Generating ASCII grid"
        );

        let matrix = self.compute_matrix(default_element, &mut pipeline)?;
        write_grid(&output_path, &self.headers, matrix, &options)
    }
}
