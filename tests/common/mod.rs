//! A minimal stand-in for the external converter, used only by tests.
//!
//! Reads the VCF text this crate writes and stores it the way the real
//! converter lays out its output variables.

use std::error::Error;

use ndarray::{Array1, Array2, Array3};
use vcf_oracle::cohort::{CHROMOSOME_LABELS, PHASE_SYMBOLS};
use vcf_oracle::dataset::{encode_strings, MemoryDataset, Variable};

pub fn convert(text: &str) -> Result<MemoryDataset, Box<dyn Error>> {
    let samples: Vec<String> = text
        .lines()
        .find(|l| l.starts_with("#CHROM"))
        .ok_or("no column header")?
        .split('\t')
        .skip(9)
        .map(String::from)
        .collect();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .quoting(false)
        .from_reader(text.as_bytes());
    let rows = rdr
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

    let (n_samples, n_variants) = (samples.len(), rows.len());
    let mut chromosome = vec![];
    let mut position = vec![];
    let mut ids = vec![];
    let mut alleles: [Vec<u8>; 4] = Default::default();
    let mut filter = vec![];
    let mut info: [Vec<f64>; 3] = Default::default();
    let mut gt = Array3::<i64>::zeros((n_samples, n_variants, 3));
    let mut rd = Array2::<i64>::zeros((n_samples, n_variants));
    let mut pl = Array3::<f64>::zeros((n_samples, n_variants, 3));

    for (k, row) in rows.iter().enumerate() {
        let code = CHROMOSOME_LABELS
            .iter()
            .position(|l| *l == &row[0])
            .ok_or("unknown chromosome")?;
        chromosome.push(code as i64);
        position.push(row[1].parse::<i64>()?);
        ids.push(row[2].to_string());
        alleles[0].push(row[3].as_bytes()[0]);
        for (a, alt) in row[4].split(',').enumerate() {
            alleles[a + 1].push(alt.as_bytes()[0]);
        }
        filter.push(row[6].to_string());
        for (f, kv) in row[7].split(';').enumerate() {
            info[f].push(kv.split('=').nth(1).ok_or("bad INFO")?.parse::<f64>()?);
        }

        for i in 0..n_samples {
            let field = &row[9 + i];
            let parts: Vec<&str> = field.split(':').collect();
            let call: Vec<char> = parts[0].chars().collect();
            gt[(i, k, 0)] = call[0].to_digit(10).ok_or("bad allele")? as i64 + 1;
            gt[(i, k, 1)] = PHASE_SYMBOLS
                .iter()
                .position(|s| *s == call[1])
                .ok_or("bad phase")? as i64;
            gt[(i, k, 2)] = call[2].to_digit(10).ok_or("bad allele")? as i64 + 1;
            rd[(i, k)] = parts[1].parse()?;
            for (c, p) in parts[2].split(',').enumerate() {
                pl[(i, k, c)] = p.parse()?;
            }
        }
    }

    let ints = |v: Vec<i64>| Variable::Int(Array1::from(v).into_dyn());
    let chars = |v: &Vec<u8>| Variable::Char(Array1::from(v.clone()).into_dyn());
    let mut dataset = MemoryDataset::new();
    dataset.insert("Sample_ID", Variable::Char(encode_strings(&samples[..]).into_dyn()));
    dataset.insert("Chromosome", ints(chromosome));
    dataset.insert("Position", ints(position));
    dataset.insert("ID", Variable::Char(encode_strings(&ids[..]).into_dyn()));
    dataset.insert("Reference_Allele", chars(&alleles[0]));
    dataset.insert("Alternate1_Allele", chars(&alleles[1]));
    dataset.insert("Alternate2_Allele", chars(&alleles[2]));
    dataset.insert("Alternate3_Allele", chars(&alleles[3]));
    dataset.insert("info_SB", ints(info[0].iter().map(|x| *x as i64).collect()));
    dataset.insert("info_RD", ints(info[1].iter().map(|x| *x as i64).collect()));
    dataset.insert(
        "info_BQ",
        Variable::Float(Array1::from(info[2].clone()).into_dyn()),
    );
    dataset.insert("FILTER", Variable::Char(encode_strings(&filter[..]).into_dyn()));
    dataset.insert("array_GT", Variable::Int(gt.into_dyn()));
    dataset.insert("array_RD", Variable::Int(rd.into_dyn()));
    dataset.insert("array_PL", Variable::Float(pl.into_dyn()));
    Ok(dataset)
}
