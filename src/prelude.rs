pub use crate::cohort::{Cohort, CohortBuilder};
pub use crate::compare::{compare_variables, Comparator, Comparison, Mismatch, Report};
pub use crate::dataset::{Dataset, MemoryDataset, OpenDataset, Variable};
pub use crate::error::{OracleError, Result};
pub use crate::schema::{Check, VariableSpec, DEFAULT_SCHEMA};
pub use crate::vcf::{write_vcf, write_vcf_file};
