#![crate_name = "vcf_oracle"]
//! Ground truth for checking a VCF converter.
//!
//! Generate a `Cohort` of synthetic variant calls, write it as VCF for the
//! converter to consume, then check the dataset the converter produced
//! against the same cohort:
//!
//! ```no_run
//! use vcf_oracle::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let cohort = CohortBuilder::new().samples(10).variants(20).build()?;
//! write_vcf_file(&cohort, "test.vcf")?;
//! // ... run the converter on test.vcf ...
//! # let dataset = MemoryDataset::from_cohort(&cohort);
//! assert!(Comparator::new().compare(&dataset, &cohort)?.passed());
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod cohort;
pub mod compare;
pub mod dataset;
pub mod error;
pub mod schema;
pub mod vcf;
