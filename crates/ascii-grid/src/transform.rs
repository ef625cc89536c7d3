//! Transform pipeline applied to a grid matrix before it is written.
//!
//! A [`Transform`] works at one of four granularities (element, row,
//! column, whole matrix). A [`TransformPipeline`] runs an explicit ordered
//! list of transforms followed by up to four named slots.
//!
//! # Stage order
//!
//! ```text
//! explicit order[0] → order[1] → ... → every_row → every_column → every_element → single_run
//! ```
//!
//! Every stage receives the previous stage's output. A stage must keep the
//! matrix shape; otherwise the run fails with
//! [`AsciiGridError::TransformShape`].

use std::fmt;

use ndarray::{Array2, ArrayViewMut1};
use tracing::debug;

use crate::error::{AsciiGridError, Result};
use crate::header::GridHeaders;

/// Maps one cell value to a new value.
pub type ElementFn = Box<dyn FnMut(f64, &GridHeaders) -> f64>;

/// Mutates a single row or column in place.
pub type LaneFn = Box<dyn FnMut(ArrayViewMut1<'_, f64>, &GridHeaders)>;

/// Maps the whole matrix to a new matrix.
pub type MatrixFn = Box<dyn FnMut(Array2<f64>, &GridHeaders) -> Array2<f64>>;

/// A typed transformation step.
pub enum Transform {
    EveryElement(ElementFn),
    EveryRow(LaneFn),
    EveryColumn(LaneFn),
    SingleRun(MatrixFn),
}

impl Transform {
    /// Apply `f` to every cell.
    pub fn every_element<F>(f: F) -> Self
    where
        F: FnMut(f64, &GridHeaders) -> f64 + 'static,
    {
        Self::EveryElement(Box::new(f))
    }

    /// Apply `f` to every cell except those equal to `nodata_value`, which
    /// pass through unchanged.
    pub fn every_valid_element<F>(mut f: F) -> Self
    where
        F: FnMut(f64, &GridHeaders) -> f64 + 'static,
    {
        Self::every_element(move |value, headers| {
            if headers.is_nodata(value) {
                value
            } else {
                f(value, headers)
            }
        })
    }

    /// Call `f` on each row, top to bottom.
    pub fn every_row<F>(f: F) -> Self
    where
        F: FnMut(ArrayViewMut1<'_, f64>, &GridHeaders) + 'static,
    {
        Self::EveryRow(Box::new(f))
    }

    /// Call `f` on each column, left to right.
    pub fn every_column<F>(f: F) -> Self
    where
        F: FnMut(ArrayViewMut1<'_, f64>, &GridHeaders) + 'static,
    {
        Self::EveryColumn(Box::new(f))
    }

    /// Call `f` once with the whole matrix.
    pub fn single_run<F>(f: F) -> Self
    where
        F: FnMut(Array2<f64>, &GridHeaders) -> Array2<f64> + 'static,
    {
        Self::SingleRun(Box::new(f))
    }

    /// A transform that returns its input unchanged.
    pub fn identity() -> Self {
        Self::single_run(|matrix, _| matrix)
    }

    /// Granularity name of this transform.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EveryElement(_) => "every_element",
            Self::EveryRow(_) => "every_row",
            Self::EveryColumn(_) => "every_column",
            Self::SingleRun(_) => "single_run",
        }
    }

    /// Apply this transform to `matrix`.
    pub fn apply(&mut self, mut matrix: Array2<f64>, headers: &GridHeaders) -> Array2<f64> {
        match self {
            Self::EveryElement(f) => {
                matrix.mapv_inplace(|value| f(value, headers));
                matrix
            }
            Self::EveryRow(f) => {
                for row in matrix.rows_mut() {
                    f(row, headers);
                }
                matrix
            }
            Self::EveryColumn(f) => {
                for column in matrix.columns_mut() {
                    f(column, headers);
                }
                matrix
            }
            Self::SingleRun(f) => f(matrix, headers),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform::{}", self.kind())
    }
}

/// Ordered set of transforms run against a matrix.
#[derive(Debug, Default)]
pub struct TransformPipeline {
    order: Vec<Transform>,
    every_row: Option<Transform>,
    every_column: Option<Transform>,
    every_element: Option<Transform>,
    single_run: Option<Transform>,
}

impl TransformPipeline {
    /// Create an empty pipeline. Running it returns the matrix unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the explicit stage order.
    pub fn with_order(mut self, order: Vec<Transform>) -> Self {
        self.order = order;
        self
    }

    /// Append a stage to the explicit order.
    pub fn then(mut self, transform: Transform) -> Self {
        self.order.push(transform);
        self
    }

    /// Fill the row slot.
    pub fn with_every_row<F>(mut self, f: F) -> Self
    where
        F: FnMut(ArrayViewMut1<'_, f64>, &GridHeaders) + 'static,
    {
        self.every_row = Some(Transform::every_row(f));
        self
    }

    /// Fill the column slot.
    pub fn with_every_column<F>(mut self, f: F) -> Self
    where
        F: FnMut(ArrayViewMut1<'_, f64>, &GridHeaders) + 'static,
    {
        self.every_column = Some(Transform::every_column(f));
        self
    }

    /// Fill the element slot.
    pub fn with_every_element<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64, &GridHeaders) -> f64 + 'static,
    {
        self.every_element = Some(Transform::every_element(f));
        self
    }

    /// Fill the single-run slot.
    pub fn with_single_run<F>(mut self, f: F) -> Self
    where
        F: FnMut(Array2<f64>, &GridHeaders) -> Array2<f64> + 'static,
    {
        self.single_run = Some(Transform::single_run(f));
        self
    }

    fn stages_mut(&mut self) -> impl Iterator<Item = (String, &mut Transform)> {
        let explicit = self
            .order
            .iter_mut()
            .enumerate()
            .map(|(i, t)| (format!("order[{}]", i), t));

        let slots = [
            &mut self.every_row,
            &mut self.every_column,
            &mut self.every_element,
            &mut self.single_run,
        ]
        .into_iter()
        .filter_map(|slot| slot.as_mut())
        .map(|t| (t.kind().to_string(), t));

        explicit.chain(slots)
    }

    /// Stage labels in execution order.
    pub fn stage_names(&self) -> Vec<String> {
        let explicit = (0..self.order.len()).map(|i| format!("order[{}]", i));
        let slots = [
            &self.every_row,
            &self.every_column,
            &self.every_element,
            &self.single_run,
        ]
        .into_iter()
        .flatten()
        .map(|t| t.kind().to_string());

        explicit.chain(slots).collect()
    }

    /// Number of stages that will run.
    pub fn len(&self) -> usize {
        self.order.len()
            + [
                &self.every_row,
                &self.every_column,
                &self.every_element,
                &self.single_run,
            ]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every stage in order, feeding each stage's output to the next.
    pub fn run(&mut self, mut matrix: Array2<f64>, headers: &GridHeaders) -> Result<Array2<f64>> {
        for (stage, transform) in self.stages_mut() {
            let expected = matrix.dim();
            matrix = transform.apply(matrix, headers);

            let found = matrix.dim();
            if found != expected {
                return Err(AsciiGridError::TransformShape {
                    stage,
                    expected,
                    found,
                });
            }
            debug!(stage = %stage, kind = transform.kind(), "Applied transform stage");
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn headers() -> GridHeaders {
        GridHeaders::new(2, 3, 0, 0, 1, -9999)
    }

    fn sample() -> Array2<f64> {
        array![[1.0, 2.0, 3.0], [4.0, -9999.0, 6.0]]
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let mut pipeline = TransformPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.run(sample(), &headers()).unwrap(), sample());
    }

    #[test]
    fn test_identity_transform() {
        let mut pipeline = TransformPipeline::new().with_order(vec![Transform::identity()]);
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.run(sample(), &headers()).unwrap(), sample());
    }

    #[test]
    fn test_granularities() {
        let h = headers();

        let out = Transform::every_element(|v, _| v * 2.0).apply(sample(), &h);
        assert_eq!(out[[0, 2]], 6.0);

        let out = Transform::every_row(|mut row, _| {
            let sum: f64 = row.sum();
            row.fill(sum);
        })
        .apply(array![[1.0, 2.0], [3.0, 4.0]], &h);
        assert_eq!(out, array![[3.0, 3.0], [7.0, 7.0]]);

        let out = Transform::every_column(|mut col, _| {
            let first = col[0];
            col.fill(first);
        })
        .apply(array![[1.0, 2.0], [3.0, 4.0]], &h);
        assert_eq!(out, array![[1.0, 2.0], [1.0, 2.0]]);
    }

    #[test]
    fn test_valid_element_skips_nodata() {
        let out = Transform::every_valid_element(|v, _| v + 1.0).apply(sample(), &headers());
        assert_eq!(out, array![[2.0, 3.0, 4.0], [5.0, -9999.0, 7.0]]);
    }

    #[test]
    fn test_slot_order_after_explicit_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let record = |name: &'static str| {
            let log = Rc::clone(&log);
            move |m: Array2<f64>, _: &GridHeaders| {
                log.borrow_mut().push(name);
                m
            }
        };

        let row_log = Rc::clone(&log);
        let element_log = Rc::clone(&log);
        let mut pipeline = TransformPipeline::new()
            .with_single_run(record("single_run"))
            .with_every_element(move |v, _| {
                element_log.borrow_mut().push("element");
                v
            })
            .with_every_row(move |_, _| row_log.borrow_mut().push("row"))
            .then(Transform::single_run(record("first")))
            .then(Transform::single_run(record("second")));

        assert_eq!(
            pipeline.stage_names(),
            vec!["order[0]", "order[1]", "every_row", "every_element", "single_run"]
        );

        pipeline
            .run(array![[1.0, 2.0]], &headers())
            .unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["first", "second", "row", "element", "element", "single_run"]
        );
    }

    #[test]
    fn test_stage_names_through_shared_reference() {
        let pipeline = TransformPipeline::new()
            .with_every_column(|_, _| {})
            .then(Transform::identity());
        let shared = &pipeline;
        assert_eq!(shared.stage_names(), vec!["order[0]", "every_column"]);
        assert_eq!(shared.stage_names().len(), shared.len());
    }

    #[test]
    fn test_setting_slot_twice_replaces() {
        let mut pipeline = TransformPipeline::new()
            .with_every_element(|v, _| v + 1.0)
            .with_every_element(|v, _| v * 10.0);
        assert_eq!(pipeline.len(), 1);
        let out = pipeline.run(array![[1.0]], &headers()).unwrap();
        assert_eq!(out, array![[10.0]]);
    }

    #[test]
    fn test_shape_change_is_rejected() {
        let mut pipeline = TransformPipeline::new()
            .then(Transform::single_run(|_, _| Array2::zeros((1, 1))));
        let err = pipeline.run(sample(), &headers()).unwrap_err();
        match err {
            AsciiGridError::TransformShape {
                stage,
                expected,
                found,
            } => {
                assert_eq!(stage, "order[0]");
                assert_eq!(expected, (2, 3));
                assert_eq!(found, (1, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nan_from_arithmetic_propagates() {
        let mut pipeline = TransformPipeline::new().with_every_element(|v, _| v / 0.0 * 0.0);
        let out = pipeline.run(array![[1.0, 0.0]], &headers()).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
