//! Renders a `Cohort` as a VCF v4.1 text stream.
//!
//! Every line is first assembled in its own buffer by a tab-delimited
//! `csv::Writer` and then handed to the sink with one `write_all`, so a
//! failing record never leaves half a line behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info_span};

use crate::cohort::{chromosome_label, Cohort, PHASE_SYMBOLS};
use crate::error::{OracleError, Result};

const META_LINES: [&str; 8] = [
    "##fileformat=VCFv4.1",
    "##INFO=<ID=SB,Number=1,Type=Integer,Description=\"Some value\">",
    "##INFO=<ID=RD,Number=1,Type=Integer,Description=\"Some value\">",
    "##INFO=<ID=BQ,Number=1,Type=Float,Description=\"Some value\">",
    "##FILTER=<ID=q10,Description=\"Quality below some level\">",
    "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Some value\">",
    "##FORMAT=<ID=RD,Number=1,Type=Integer,Description=\"Some value\">",
    "##FORMAT=<ID=PL,Number=3,Type=Float,Description=\"Some value\">",
];

const FIXED_COLUMNS: [&str; 9] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

const FORMAT_DESCRIPTOR: &str = "GT:RD:PL";

/// Writes the header block and one data line per variant.
pub fn write_vcf<W: Write>(cohort: &Cohort, sink: &mut W) -> Result<()> {
    let _span = info_span!("write_vcf", n_variants = cohort.n_variants()).entered();

    for line in META_LINES.iter() {
        sink.write_all(line.as_bytes())?;
        sink.write_all(b"\n")?;
    }

    let header = FIXED_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(cohort.sample_ids().iter().cloned());
    sink.write_all(&render_line(header)?)?;

    for k in 0..cohort.n_variants() {
        sink.write_all(&render_line(data_fields(cohort, k))?)?;
    }
    sink.flush()?;

    debug!("wrote {} data lines", cohort.n_variants());
    Ok(())
}

/// Creates (or truncates) `path` and writes the cohort to it.
pub fn write_vcf_file<P: AsRef<Path>>(cohort: &Cohort, path: P) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_vcf(cohort, &mut out)
}

/// Per-sample subfield `<a1><phase><a2>:<depth>:<pAA>,<pAB>,<pBB>`.
///
/// Allele categories {1, 2} are written as {0, 1}.
pub fn format_genotype(cohort: &Cohort, sample: usize, variant: usize) -> String {
    let g = cohort.genotypes();
    let at = (sample, variant);
    format!(
        "{}{}{}:{}:{:.6},{:.6},{:.6}",
        g.allele1[at] - 1,
        PHASE_SYMBOLS[g.phase[at] as usize],
        g.allele2[at] - 1,
        g.read_depth[at],
        g.likelihood[0][at],
        g.likelihood[1][at],
        g.likelihood[2][at],
    )
}

fn data_fields(cohort: &Cohort, k: usize) -> impl Iterator<Item = String> + '_ {
    let v = cohort.variants();
    let alt = v
        .alternate
        .iter()
        .map(|a| (a[k] as char).to_string())
        .collect::<Vec<_>>()
        .join(",");
    let info = format!(
        "SB={};RD={};BQ={:.6}",
        v.info_sb[k], v.info_rd[k], v.info_bq[k] as f64
    );

    vec![
        chromosome_label(v.chromosome[k]).to_string(),
        v.position[k].to_string(),
        v.ids[k].clone(),
        (v.reference[k] as char).to_string(),
        alt,
        v.quality[k].to_string(),
        v.filter[k].clone(),
        info,
        FORMAT_DESCRIPTOR.to_string(),
    ]
    .into_iter()
    .chain((0..cohort.n_samples()).map(move |i| format_genotype(cohort, i, k)))
}

fn render_line<I: IntoIterator<Item = String>>(fields: I) -> Result<Vec<u8>> {
    let mut line = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    line.write_record(fields)?;
    line.into_inner().map_err(|e| {
        let err = e.error();
        OracleError::Io(std::io::Error::new(err.kind(), err.to_string()))
    })
}
