//! Named-variable array containers, the shape a converted VCF arrives in.
//!
//! The on-disk reader is somebody else's problem; anything that can hand
//! back a variable by name implements `Dataset`. `MemoryDataset` is the
//! in-memory implementation and can encode a `Cohort` the way a correct
//! converter would.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView2};

use crate::cohort::Cohort;
use crate::error::{OracleError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dtype {
    Int,
    Float,
    Char,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dtype::Int => write!(f, "int"),
            Dtype::Float => write!(f, "float"),
            Dtype::Char => write!(f, "char"),
        }
    }
}

/// A variable as read from a dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum Variable {
    Int(ArrayD<i64>),
    Float(ArrayD<f64>),
    /// Single bytes. Strings are stored as 2-D, one NUL-padded row each.
    Char(ArrayD<u8>),
}

impl Variable {
    pub fn dtype(&self) -> Dtype {
        match self {
            Variable::Int(_) => Dtype::Int,
            Variable::Float(_) => Dtype::Float,
            Variable::Char(_) => Dtype::Char,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Variable::Int(a) => a.shape(),
            Variable::Float(a) => a.shape(),
            Variable::Char(a) => a.shape(),
        }
    }

    /// Numeric values widened to `f64`; `None` for character data.
    pub fn to_f64(&self) -> Option<ArrayD<f64>> {
        match self {
            Variable::Int(a) => Some(a.mapv(|x| x as f64)),
            Variable::Float(a) => Some(a.clone()),
            Variable::Char(_) => None,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{:?}", self.dtype(), self.shape())
    }
}

/// Read access to variables by name.
pub trait Dataset {
    fn variable(&self, name: &str) -> Result<Variable>;
}

/// Opens a dataset for reading. The handle is released when dropped.
pub trait OpenDataset {
    type Handle: Dataset;

    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// Decodes a fixed-width character matrix, one string per row.
///
/// Trailing NUL padding is stripped; anything that is not UTF-8 is replaced
/// rather than rejected so the comparison can still report it.
pub fn decode_strings(chars: ArrayView2<u8>) -> Vec<String> {
    chars
        .outer_iter()
        .map(|row| {
            let bytes = row.to_vec();
            let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            String::from_utf8_lossy(&bytes[..end]).into_owned()
        })
        .collect()
}

/// Encodes strings as rows of a NUL-padded matrix as wide as the longest one.
pub fn encode_strings<S: AsRef<str>>(strings: &[S]) -> Array2<u8> {
    let width = strings
        .iter()
        .map(|s| s.as_ref().len())
        .max()
        .unwrap_or(0)
        .max(1);
    let mut chars = Array2::zeros((strings.len(), width));
    for (mut row, s) in chars.outer_iter_mut().zip(strings) {
        for (cell, &b) in row.iter_mut().zip(s.as_ref().as_bytes()) {
            *cell = b;
        }
    }
    chars
}

#[derive(Clone, Debug, Default)]
pub struct MemoryDataset {
    variables: HashMap<String, Variable>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `variable` under `name`, returning whatever it replaced.
    pub fn insert(&mut self, name: &str, variable: Variable) -> Option<Variable> {
        self.variables.insert(name.into(), variable)
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Encodes the cohort exactly as a faithful converter would.
    pub fn from_cohort(cohort: &Cohort) -> Self {
        let v = cohort.variants();
        let g = cohort.genotypes();
        let mut dataset = Self::new();

        dataset.insert("Sample_ID", strings(cohort.sample_ids()));
        dataset.insert("Chromosome", ints(&v.chromosome.mapv(i64::from)));
        dataset.insert("Position", ints(&v.position.mapv(i64::from)));
        dataset.insert("ID", strings(&v.ids));
        dataset.insert("Reference_Allele", chars(&v.reference));
        dataset.insert("Alternate1_Allele", chars(&v.alternate[0]));
        dataset.insert("Alternate2_Allele", chars(&v.alternate[1]));
        dataset.insert("Alternate3_Allele", chars(&v.alternate[2]));
        dataset.insert("info_SB", ints(&v.info_sb.mapv(i64::from)));
        dataset.insert("info_RD", ints(&v.info_rd.mapv(i64::from)));
        dataset.insert(
            "info_BQ",
            Variable::Float(v.info_bq.mapv(f64::from).into_dyn()),
        );
        dataset.insert("FILTER", strings(&v.filter));

        let shape = (cohort.n_samples(), cohort.n_variants(), 3);
        let gt = Array3::from_shape_fn(shape, |(i, k, c)| {
            let m = match c {
                0 => &g.allele1,
                1 => &g.phase,
                _ => &g.allele2,
            };
            i64::from(m[(i, k)])
        });
        dataset.insert("array_GT", Variable::Int(gt.into_dyn()));
        dataset.insert(
            "array_RD",
            Variable::Int(g.read_depth.mapv(i64::from).into_dyn()),
        );
        let pl = Array3::from_shape_fn(shape, |(i, k, c)| g.likelihood[c][(i, k)]);
        dataset.insert("array_PL", Variable::Float(pl.into_dyn()));

        dataset
    }
}

fn strings(values: &[String]) -> Variable {
    Variable::Char(encode_strings(values).into_dyn())
}

fn ints(values: &Array1<i64>) -> Variable {
    Variable::Int(values.clone().into_dyn())
}

fn chars(values: &Array1<u8>) -> Variable {
    Variable::Char(values.clone().into_dyn())
}

impl Dataset for MemoryDataset {
    fn variable(&self, name: &str) -> Result<Variable> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| OracleError::missing_variable(name))
    }
}

/// Datasets registered under paths, standing in for files on disk.
#[derive(Default)]
pub struct MemoryStore {
    files: HashMap<PathBuf, MemoryDataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, dataset: MemoryDataset) {
        self.files.insert(path.into(), dataset);
    }
}

impl OpenDataset for MemoryStore {
    type Handle = MemoryDataset;

    fn open(&self, path: &Path) -> Result<MemoryDataset> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| OracleError::dataset_open(path, "no such dataset"))
    }
}
