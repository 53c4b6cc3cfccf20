//! Which dataset variables are checked, how, and against what.
//!
//! Each row declares how the stored variable is decoded and whether values
//! are compared exactly or within the comparator's epsilon, so the
//! comparator never has to guess from the stored dtype.

use ndarray::{Array1, Array2};

use crate::cohort::Cohort;

/// How a variable is decoded and compared, with the ground truth it is
/// compared against.
#[derive(Clone, Copy)]
pub enum Check {
    /// 2-D fixed-width character array decoded to one string per row.
    Strings(fn(&Cohort) -> Vec<String>),
    /// 1-D array of single characters.
    Chars(fn(&Cohort) -> Array1<u8>),
    /// 1-D numeric vector.
    Vector {
        truth: fn(&Cohort) -> Array1<f64>,
        tolerant: bool,
    },
    /// 2-D numeric matrix of shape `(n_samples, n_variants)`.
    Matrix {
        truth: fn(&Cohort) -> Array2<f64>,
        tolerant: bool,
    },
    /// 3-D numeric array whose last axis stacks three matrices.
    ThreeSlice {
        truth: fn(&Cohort) -> [Array2<f64>; 3],
        tolerant: bool,
    },
}

#[derive(Clone, Copy)]
pub struct VariableSpec {
    pub name: &'static str,
    pub check: Check,
}

/// Variables a converted VCF must contain, in checking order.
///
/// QUAL has no row: it is written to the VCF but never checked.
pub const DEFAULT_SCHEMA: [VariableSpec; 15] = [
    VariableSpec { name: "Sample_ID", check: Check::Strings(sample_ids) },
    VariableSpec { name: "Chromosome", check: Check::Vector { truth: chromosome, tolerant: false } },
    VariableSpec { name: "Position", check: Check::Vector { truth: position, tolerant: false } },
    VariableSpec { name: "ID", check: Check::Strings(variant_ids) },
    VariableSpec { name: "Reference_Allele", check: Check::Chars(reference) },
    VariableSpec { name: "Alternate1_Allele", check: Check::Chars(alternate1) },
    VariableSpec { name: "Alternate2_Allele", check: Check::Chars(alternate2) },
    VariableSpec { name: "Alternate3_Allele", check: Check::Chars(alternate3) },
    VariableSpec { name: "info_SB", check: Check::Vector { truth: info_sb, tolerant: false } },
    VariableSpec { name: "info_RD", check: Check::Vector { truth: info_rd, tolerant: false } },
    VariableSpec { name: "info_BQ", check: Check::Vector { truth: info_bq, tolerant: true } },
    VariableSpec { name: "array_GT", check: Check::ThreeSlice { truth: genotype, tolerant: false } },
    VariableSpec { name: "array_RD", check: Check::Matrix { truth: read_depth, tolerant: false } },
    VariableSpec { name: "array_PL", check: Check::ThreeSlice { truth: likelihood, tolerant: true } },
    VariableSpec { name: "FILTER", check: Check::Strings(filter) },
];

/// Looks up a row of `DEFAULT_SCHEMA` by variable name.
pub fn lookup(name: &str) -> Option<VariableSpec> {
    DEFAULT_SCHEMA.iter().find(|spec| spec.name == name).copied()
}

fn sample_ids(cohort: &Cohort) -> Vec<String> {
    cohort.sample_ids().to_vec()
}

fn variant_ids(cohort: &Cohort) -> Vec<String> {
    cohort.variants().ids.clone()
}

fn filter(cohort: &Cohort) -> Vec<String> {
    cohort.variants().filter.clone()
}

fn chromosome(cohort: &Cohort) -> Array1<f64> {
    cohort.variants().chromosome.mapv(f64::from)
}

fn position(cohort: &Cohort) -> Array1<f64> {
    cohort.variants().position.mapv(f64::from)
}

fn reference(cohort: &Cohort) -> Array1<u8> {
    cohort.variants().reference.clone()
}

fn alternate1(cohort: &Cohort) -> Array1<u8> {
    cohort.variants().alternate[0].clone()
}

fn alternate2(cohort: &Cohort) -> Array1<u8> {
    cohort.variants().alternate[1].clone()
}

fn alternate3(cohort: &Cohort) -> Array1<u8> {
    cohort.variants().alternate[2].clone()
}

fn info_sb(cohort: &Cohort) -> Array1<f64> {
    cohort.variants().info_sb.mapv(f64::from)
}

fn info_rd(cohort: &Cohort) -> Array1<f64> {
    cohort.variants().info_rd.mapv(f64::from)
}

fn info_bq(cohort: &Cohort) -> Array1<f64> {
    cohort.variants().info_bq.mapv(f64::from)
}

// Slice order is allele1, phase, allele2.
fn genotype(cohort: &Cohort) -> [Array2<f64>; 3] {
    let g = cohort.genotypes();
    [
        g.allele1.mapv(f64::from),
        g.phase.mapv(f64::from),
        g.allele2.mapv(f64::from),
    ]
}

fn read_depth(cohort: &Cohort) -> Array2<f64> {
    cohort.genotypes().read_depth.mapv(f64::from)
}

fn likelihood(cohort: &Cohort) -> [Array2<f64>; 3] {
    cohort.genotypes().likelihood.clone()
}
