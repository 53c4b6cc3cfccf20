//! Checks a converted dataset against the cohort it was generated from.
//!
//! Variables are checked in schema order and the run stops at the first
//! variable that fails. Within a variable every element is checked, so a
//! failing `Comparison` lists all of its mismatches, including those in
//! every slice of a three-slice array.

use std::fmt;
use std::path::Path;

use ndarray::{ArrayView1, ArrayView2, ArrayView3, Axis, Ix1, Ix2, Ix3};
use tracing::{debug, error, info_span};

use crate::cohort::Cohort;
use crate::dataset::{decode_strings, Dataset, OpenDataset, Variable};
use crate::error::{OracleError, Result};
use crate::schema::{Check, VariableSpec, DEFAULT_SCHEMA};

pub const DEFAULT_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    /// The dataset has no variable of this name
    Missing,
    /// Stored with a dtype or rank the check cannot read
    Layout { expected: String, actual: String },
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// `slice` is the 0-based position on the last axis of a three-slice array
    Value {
        slice: Option<usize>,
        index: Vec<usize>,
        expected: String,
        actual: String,
    },
}

impl Mismatch {
    fn shape(expected: &[usize], actual: &[usize]) -> Self {
        Mismatch::Shape {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    fn layout(expected: &str, actual: &Variable) -> Self {
        Mismatch::Layout {
            expected: expected.to_owned(),
            actual: actual.to_string(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mismatch::Missing => write!(f, "variable not present in dataset"),
            Mismatch::Layout { expected, actual } => {
                write!(f, "expected {}, found {}", expected, actual)
            }
            Mismatch::Shape { expected, actual } => {
                write!(f, "different sizes {:?} {:?}", actual, expected)
            }
            Mismatch::Value {
                slice,
                index,
                expected,
                actual,
            } => {
                let at = index
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "compare failed at index {}: {} != {}", at, actual, expected)?;
                if let Some(s) = slice {
                    write!(f, " Slice{}", s + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of checking a single variable.
#[derive(Clone, Debug)]
pub struct Comparison {
    variable: String,
    mismatches: Vec<Mismatch>,
}

impl Comparison {
    pub fn new(variable: &str, mismatches: Vec<Mismatch>) -> Self {
        Self {
            variable: variable.into(),
            mismatches,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Comparisons in schema order, ending at the first failure if there is one.
#[derive(Clone, Debug)]
pub struct Report {
    comparisons: Vec<Comparison>,
}

impl Report {
    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn passed(&self) -> bool {
        self.comparisons.iter().all(Comparison::passed)
    }

    pub fn first_failure(&self) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| !c.passed())
    }
}

fn within(actual: f64, expected: f64, epsilon: Option<f64>) -> bool {
    match epsilon {
        None => actual == expected,
        Some(e) => (actual - expected).abs() <= e,
    }
}

/// Element-wise string equality.
pub fn compare_strings(actual: &[String], expected: &[String]) -> Vec<Mismatch> {
    if actual.len() != expected.len() {
        return vec![Mismatch::shape(&[expected.len()], &[actual.len()])];
    }
    actual
        .iter()
        .zip(expected)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, (a, b))| Mismatch::Value {
            slice: None,
            index: vec![i],
            expected: b.clone(),
            actual: a.clone(),
        })
        .collect()
}

/// Element-wise equality of single characters.
pub fn compare_chars(actual: ArrayView1<u8>, expected: ArrayView1<u8>) -> Vec<Mismatch> {
    if actual.len() != expected.len() {
        return vec![Mismatch::shape(expected.shape(), actual.shape())];
    }
    actual
        .iter()
        .zip(expected.iter())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, (&a, &b))| Mismatch::Value {
            slice: None,
            index: vec![i],
            expected: (b as char).to_string(),
            actual: (a as char).to_string(),
        })
        .collect()
}

/// Exact when `epsilon` is `None`, otherwise `|a - b| <= epsilon`.
pub fn compare_vector(
    actual: ArrayView1<f64>,
    expected: ArrayView1<f64>,
    epsilon: Option<f64>,
) -> Vec<Mismatch> {
    if actual.len() != expected.len() {
        return vec![Mismatch::shape(expected.shape(), actual.shape())];
    }
    actual
        .iter()
        .zip(expected.iter())
        .enumerate()
        .filter(|(_, (&a, &b))| !within(a, b, epsilon))
        .map(|(i, (a, b))| Mismatch::Value {
            slice: None,
            index: vec![i],
            expected: b.to_string(),
            actual: a.to_string(),
        })
        .collect()
}

pub fn compare_matrix(
    actual: ArrayView2<f64>,
    expected: ArrayView2<f64>,
    epsilon: Option<f64>,
) -> Vec<Mismatch> {
    if actual.dim() != expected.dim() {
        return vec![Mismatch::shape(expected.shape(), actual.shape())];
    }
    matrix_values(actual, expected, epsilon, None)
}

/// Compares each slice of the last axis against its own matrix.
///
/// The last axis must have extent 3 and the first two must match every
/// expected matrix. All three slices are checked even when one fails.
pub fn compare_three_matrix(
    actual: ArrayView3<f64>,
    expected: [ArrayView2<f64>; 3],
    epsilon: Option<f64>,
) -> Vec<Mismatch> {
    let (rows, cols, depth) = actual.dim();
    if depth != 3 || expected.iter().any(|m| m.dim() != (rows, cols)) {
        let (er, ec) = expected[0].dim();
        return vec![Mismatch::shape(&[er, ec, 3], actual.shape())];
    }
    expected
        .iter()
        .enumerate()
        .flat_map(|(s, m)| matrix_values(actual.index_axis(Axis(2), s), m.view(), epsilon, Some(s)))
        .collect()
}

fn matrix_values(
    actual: ArrayView2<f64>,
    expected: ArrayView2<f64>,
    epsilon: Option<f64>,
    slice: Option<usize>,
) -> Vec<Mismatch> {
    actual
        .indexed_iter()
        .zip(expected.iter())
        .filter(|((_, &a), &b)| !within(a, b, epsilon))
        .map(|(((i, j), a), b)| Mismatch::Value {
            slice,
            index: vec![i, j],
            expected: b.to_string(),
            actual: a.to_string(),
        })
        .collect()
}

/// Walks a schema over a dataset.
pub struct Comparator {
    epsilon: f64,
    schema: Vec<VariableSpec>,
}

impl Comparator {
    /// Comparator over `DEFAULT_SCHEMA` with `DEFAULT_EPSILON`
    pub fn new() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            schema: DEFAULT_SCHEMA.to_vec(),
        }
    }

    /// Tolerance for rows marked tolerant. Other rows stay exact.
    pub fn epsilon(&mut self, epsilon: f64) -> &mut Self {
        self.epsilon = epsilon;
        self
    }

    pub fn schema(&mut self, schema: &[VariableSpec]) -> &mut Self {
        self.schema = schema.to_vec();
        self
    }

    /// Checks every schema variable, stopping after the first that fails.
    ///
    /// Only dataset access failures are errors; a missing variable or a
    /// wrong value is reported in the returned `Report`.
    pub fn compare<D: Dataset>(&self, dataset: &D, cohort: &Cohort) -> Result<Report> {
        let _span = info_span!(
            "compare",
            n_samples = cohort.n_samples(),
            n_variants = cohort.n_variants()
        )
        .entered();

        let mut comparisons = vec![];
        for spec in self.schema.iter() {
            let comparison = self.compare_variable(dataset, spec, cohort)?;
            let passed = comparison.passed();
            if passed {
                debug!(variable = spec.name, "matches");
            } else {
                for mismatch in comparison.mismatches() {
                    match mismatch {
                        Mismatch::Value {
                            slice,
                            index,
                            expected,
                            actual,
                        } => error!(
                            variable = spec.name,
                            slice = ?slice,
                            index = ?index,
                            expected = %expected,
                            actual = %actual,
                            "{}",
                            mismatch
                        ),
                        _ => error!(variable = spec.name, "{}", mismatch),
                    }
                }
            }
            comparisons.push(comparison);
            if !passed {
                break;
            }
        }
        Ok(Report { comparisons })
    }

    /// Opens the dataset at `path`, compares, and releases it on every path out.
    pub fn compare_path<O: OpenDataset>(
        &self,
        opener: &O,
        path: &Path,
        cohort: &Cohort,
    ) -> Result<Report> {
        let dataset = opener.open(path)?;
        self.compare(&dataset, cohort)
    }

    pub fn compare_variable<D: Dataset>(
        &self,
        dataset: &D,
        spec: &VariableSpec,
        cohort: &Cohort,
    ) -> Result<Comparison> {
        let variable = match dataset.variable(spec.name) {
            Ok(v) => v,
            Err(OracleError::MissingVariable { .. }) => {
                return Ok(Comparison::new(spec.name, vec![Mismatch::Missing]))
            }
            Err(e) => return Err(e),
        };
        let tolerance = |tolerant: bool| if tolerant { Some(self.epsilon) } else { None };

        let mismatches = match spec.check {
            Check::Strings(truth) => {
                let expected = truth(cohort);
                match &variable {
                    Variable::Char(chars) => match chars.view().into_dimensionality::<Ix2>() {
                        Ok(chars) => compare_strings(&decode_strings(chars), &expected),
                        Err(_) => vec![Mismatch::shape(&[expected.len()], chars.shape())],
                    },
                    _ => vec![Mismatch::layout("2-D char array", &variable)],
                }
            }
            Check::Chars(truth) => {
                let expected = truth(cohort);
                match &variable {
                    Variable::Char(chars) => match chars.view().into_dimensionality::<Ix1>() {
                        Ok(chars) => compare_chars(chars, expected.view()),
                        Err(_) => vec![Mismatch::shape(expected.shape(), chars.shape())],
                    },
                    _ => vec![Mismatch::layout("1-D char array", &variable)],
                }
            }
            Check::Vector { truth, tolerant } => {
                let expected = truth(cohort);
                match variable.to_f64().map(|a| a.into_dimensionality::<Ix1>()) {
                    Some(Ok(actual)) => {
                        compare_vector(actual.view(), expected.view(), tolerance(tolerant))
                    }
                    Some(Err(_)) => vec![Mismatch::shape(expected.shape(), variable.shape())],
                    None => vec![Mismatch::layout("numeric vector", &variable)],
                }
            }
            Check::Matrix { truth, tolerant } => {
                let expected = truth(cohort);
                match variable.to_f64().map(|a| a.into_dimensionality::<Ix2>()) {
                    Some(Ok(actual)) => {
                        compare_matrix(actual.view(), expected.view(), tolerance(tolerant))
                    }
                    Some(Err(_)) => vec![Mismatch::shape(expected.shape(), variable.shape())],
                    None => vec![Mismatch::layout("numeric matrix", &variable)],
                }
            }
            Check::ThreeSlice { truth, tolerant } => {
                let [first, second, third] = truth(cohort);
                match variable.to_f64().map(|a| a.into_dimensionality::<Ix3>()) {
                    Some(Ok(actual)) => compare_three_matrix(
                        actual.view(),
                        [first.view(), second.view(), third.view()],
                        tolerance(tolerant),
                    ),
                    Some(Err(_)) => {
                        let (rows, cols) = first.dim();
                        vec![Mismatch::shape(&[rows, cols, 3], variable.shape())]
                    }
                    None => vec![Mismatch::layout("3-D numeric array", &variable)],
                }
            }
        };

        Ok(Comparison::new(spec.name, mismatches))
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}

/// True when every variable in the default schema matches the cohort.
pub fn compare_variables<D: Dataset>(dataset: &D, cohort: &Cohort) -> Result<bool> {
    Ok(Comparator::new().compare(dataset, cohort)?.passed())
}
