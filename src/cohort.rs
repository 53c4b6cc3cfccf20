//! Ground-truth cohorts of synthetic variant calls.
//!
//! A `Cohort` holds one record per variant and one genotype call per
//! (sample, variant) pair, stored column-wise the same way a converted
//! dataset stores them: per-variant fields as `Array1`, per-call fields as
//! `Array2` of shape `(n_samples, n_variants)`.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info_span};

use crate::error::{OracleError, Result};

/// Chromosome labels indexed by chromosome code. Code 0 is never generated.
pub const CHROMOSOME_LABELS: [&str; 28] = [
    "-", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "X", "Y", "XY", "MT", "U",
];

/// Phase symbols indexed by phase code. Code 0 is never generated.
///
/// `\` comes from VCF 3.3 and was dropped in 4.0, but converters still accept it.
pub const PHASE_SYMBOLS: [char; 4] = ['-', '|', '\\', '/'];

pub const BASES: [u8; 4] = *b"ACGT";

/// Site-level fields, one entry per variant.
#[derive(Debug)]
pub struct Variants {
    pub ids: Vec<String>,
    pub chromosome: Array1<u8>,
    pub position: Array1<u32>,
    pub reference: Array1<u8>,
    pub alternate: [Array1<u8>; 3],
    /// Written to the VCF but never checked against the dataset.
    pub quality: Array1<f64>,
    pub filter: Vec<String>,
    pub info_sb: Array1<u32>,
    pub info_rd: Array1<u32>,
    pub info_bq: Array1<u32>,
}

/// Per-call fields, each of shape `(n_samples, n_variants)`.
#[derive(Debug)]
pub struct Genotypes {
    /// Allele categories in {1, 2}; the VCF encodes them as {0, 1}.
    pub allele1: Array2<u8>,
    pub allele2: Array2<u8>,
    /// Index into `PHASE_SYMBOLS`, in {1, 2, 3}.
    pub phase: Array2<u8>,
    pub read_depth: Array2<u32>,
    /// Likelihoods for homozygous-ref, heterozygous and homozygous-alt.
    pub likelihood: [Array2<f64>; 3],
}

#[derive(Debug)]
pub struct Cohort {
    n_samples: usize,
    n_variants: usize,
    sample_ids: Vec<String>,
    variants: Variants,
    genotypes: Genotypes,
}

impl Cohort {
    /// Draws every field independently from its declared range.
    ///
    /// Nothing is correlated: an alternate allele may equal the reference.
    pub fn generate<R: Rng>(n_samples: usize, n_variants: usize, rng: &mut R) -> Result<Self> {
        if n_samples == 0 || n_variants == 0 {
            return Err(OracleError::invalid_cohort(format!(
                "need at least one sample and one variant, got {} x {}",
                n_samples, n_variants
            )));
        }
        let _span = info_span!("generate_cohort", n_samples, n_variants).entered();

        let sample_ids = (1..=n_samples).map(|i| format!("HSample{}", i)).collect();

        let variants = Variants {
            ids: (1..=n_variants).map(|i| format!("Mito{}", i)).collect(),
            chromosome: Array1::from_shape_fn(n_variants, |_| rng.random_range(1..=25)),
            position: Array1::from_shape_fn(n_variants, |_| rng.random_range(1..=999)),
            reference: Array1::from_shape_fn(n_variants, |_| base(rng)),
            alternate: [
                Array1::from_shape_fn(n_variants, |_| base(rng)),
                Array1::from_shape_fn(n_variants, |_| base(rng)),
                Array1::from_shape_fn(n_variants, |_| base(rng)),
            ],
            quality: Array1::from_shape_fn(n_variants, |_| rng.random::<f64>()),
            filter: (1..=n_variants).map(|i| format!("A;PASS{}", i)).collect(),
            info_sb: Array1::from_shape_fn(n_variants, |_| rng.random_range(1..=999)),
            info_rd: Array1::from_shape_fn(n_variants, |_| rng.random_range(10..=49)),
            info_bq: Array1::from_shape_fn(n_variants, |_| rng.random_range(100..=199)),
        };

        let shape = (n_samples, n_variants);
        let genotypes = Genotypes {
            allele1: Array2::from_shape_fn(shape, |_| rng.random_range(1..=2)),
            allele2: Array2::from_shape_fn(shape, |_| rng.random_range(1..=2)),
            phase: Array2::from_shape_fn(shape, |_| rng.random_range(1..=3)),
            read_depth: Array2::from_shape_fn(shape, |_| rng.random_range(10..=49)),
            likelihood: [
                Array2::from_shape_fn(shape, |_| rng.random::<f64>()),
                Array2::from_shape_fn(shape, |_| rng.random::<f64>()),
                Array2::from_shape_fn(shape, |_| rng.random::<f64>()),
            ],
        };

        debug!("generated {} variants for {} samples", n_variants, n_samples);
        Ok(Self {
            n_samples,
            n_variants,
            sample_ids,
            variants,
            genotypes,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_variants(&self) -> usize {
        self.n_variants
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn variants(&self) -> &Variants {
        &self.variants
    }

    pub fn genotypes(&self) -> &Genotypes {
        &self.genotypes
    }
}

fn base<R: Rng>(rng: &mut R) -> u8 {
    BASES[rng.random_range(0..BASES.len())]
}

/// Label for a chromosome code, `"-"` for anything outside the table.
pub fn chromosome_label(code: u8) -> &'static str {
    CHROMOSOME_LABELS
        .get(code as usize)
        .copied()
        .unwrap_or(CHROMOSOME_LABELS[0])
}

/// Configures and builds a `Cohort`.
///
/// Without a seed the generator is seeded from the operating system, so two
/// builds produce different cohorts. Set a seed to reproduce one.
pub struct CohortBuilder {
    n_samples: usize,
    n_variants: usize,
    seed: Option<u64>,
}

impl CohortBuilder {
    /// Construct a new builder for a single sample and variant
    pub fn new() -> Self {
        Self {
            n_samples: 1,
            n_variants: 1,
            seed: None,
        }
    }

    pub fn samples(&mut self, n_samples: usize) -> &mut Self {
        self.n_samples = n_samples;
        self
    }

    pub fn variants(&mut self, n_variants: usize) -> &mut Self {
        self.n_variants = n_variants;
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(&self) -> Result<Cohort> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.build_with(&mut rng)
    }

    /// Builds from a caller-supplied random source, ignoring any seed.
    pub fn build_with<R: Rng>(&self, rng: &mut R) -> Result<Cohort> {
        Cohort::generate(self.n_samples, self.n_variants, rng)
    }
}

impl Default for CohortBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cohort_has_declared_shapes() -> std::result::Result<(), Box<dyn Error>> {
        let cohort = CohortBuilder::new().samples(4).variants(7).seed(3).build()?;
        let v = cohort.variants();
        let g = cohort.genotypes();

        assert_eq!(cohort.sample_ids().len(), 4);
        assert_eq!(v.ids.len(), 7);
        assert_eq!(v.filter.len(), 7);
        assert_eq!(v.chromosome.len(), 7);
        assert_eq!(v.quality.len(), 7);
        assert!(v.alternate.iter().all(|a| a.len() == 7));
        for m in [&g.allele1, &g.allele2, &g.phase] {
            assert_eq!(m.dim(), (4, 7));
        }
        assert_eq!(g.read_depth.dim(), (4, 7));
        assert!(g.likelihood.iter().all(|m| m.dim() == (4, 7)));
        Ok(())
    }

    #[test]
    fn test_identifiers_follow_patterns() -> std::result::Result<(), Box<dyn Error>> {
        let cohort = CohortBuilder::new().samples(2).variants(3).seed(1).build()?;
        assert_eq!(cohort.sample_ids(), ["HSample1", "HSample2"]);
        assert_eq!(cohort.variants().ids, vec!["Mito1", "Mito2", "Mito3"]);
        assert_eq!(cohort.variants().filter, vec!["A;PASS1", "A;PASS2", "A;PASS3"]);
        Ok(())
    }

    #[test]
    fn test_same_seed_gives_same_cohort() -> std::result::Result<(), Box<dyn Error>> {
        let a = CohortBuilder::new().samples(3).variants(5).seed(99).build()?;
        let b = CohortBuilder::new().samples(3).variants(5).seed(99).build()?;
        assert_eq!(a.variants().position, b.variants().position);
        assert_eq!(a.genotypes().phase, b.genotypes().phase);
        assert_eq!(a.genotypes().likelihood[2], b.genotypes().likelihood[2]);
        Ok(())
    }

    #[test]
    fn test_cohort_debug_shows_fields() -> std::result::Result<(), Box<dyn Error>> {
        let cohort = CohortBuilder::new().samples(1).variants(2).seed(6).build()?;
        let shown = format!("{:?}", cohort);
        assert!(shown.contains("HSample1"));
        assert!(shown.contains("Mito2"));
        assert!(shown.contains("likelihood"));
        Ok(())
    }

    #[test]
    fn test_empty_cohort_is_rejected() {
        assert!(CohortBuilder::new().samples(0).build().is_err());
        assert!(CohortBuilder::new().variants(0).build().is_err());
    }

    #[test]
    fn test_chromosome_labels() {
        assert_eq!(chromosome_label(1), "1");
        assert_eq!(chromosome_label(22), "22");
        assert_eq!(chromosome_label(23), "X");
        assert_eq!(chromosome_label(25), "XY");
        assert_eq!(chromosome_label(40), "-");
    }
}
