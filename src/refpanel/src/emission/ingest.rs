use super::{BitSetEmission, ByteArrayEmission, Emission, Encoding, LowMafDiallelicEmission, LowMafMultiallelicEmission};
use crate::error::EmissionError;

/// Build the cheapest [`Emission`] for one marker's raw per-haplotype
/// allele calls.
///
/// Counts every allele's haplotype coverage, picks the major allele (the
/// unique allele of maximum count, or the least-indexed allele among those
/// tied for it), and dispatches to [`super::select_encoding`] to choose the
/// storage encoding before constructing it.
///
/// # Errors
/// [`EmissionError::TooFewAlleles`] if `n_alleles < 2`.
/// [`EmissionError::AlleleOutOfRange`] if any entry in `alleles` is
/// `>= n_alleles`. Otherwise propagates whatever the chosen encoding's own
/// constructor returns.
pub fn ingest_record(alleles: &[usize], n_alleles: usize) -> Result<Box<dyn Emission>, EmissionError> {
    if n_alleles < 2 {
        return Err(EmissionError::TooFewAlleles(n_alleles));
    }
    let n_haplotypes = alleles.len();
    let mut counts = vec![0usize; n_alleles];
    for &a in alleles {
        if a >= n_alleles {
            return Err(EmissionError::AlleleOutOfRange(a, n_alleles));
        }
        counts[a] += 1;
    }

    let mut major_allele = 0usize;
    let mut major_count = counts[0];
    for (allele, &count) in counts.iter().enumerate().skip(1) {
        if count > major_count {
            major_allele = allele;
            major_count = count;
        }
    }
    let minor_total = n_haplotypes - major_count;

    match super::select_encoding(n_alleles, n_haplotypes, minor_total) {
        Encoding::LowMafDiallelic => {
            let minor_allele = 1 - major_allele;
            let minor_haps: Vec<usize> = alleles.iter().enumerate().filter(|&(_, &a)| a == minor_allele).map(|(h, _)| h).collect();
            Ok(Box::new(LowMafDiallelicEmission::new(minor_allele, minor_haps, n_haplotypes)?))
        }
        Encoding::LowMafMultiallelic => {
            let mut non_major = Vec::new();
            for allele in 0..n_alleles {
                if allele == major_allele {
                    continue;
                }
                let haps: Vec<usize> = alleles.iter().enumerate().filter(|&(_, &a)| a == allele).map(|(h, _)| h).collect();
                if !haps.is_empty() {
                    non_major.push((allele, haps));
                }
            }
            Ok(Box::new(LowMafMultiallelicEmission::new(major_allele, n_alleles, n_haplotypes, non_major)?))
        }
        Encoding::ByteArray => {
            let bytes: Vec<u8> = alleles.iter().map(|&a| a as u8).collect();
            Ok(Box::new(ByteArrayEmission::new(bytes, n_alleles)?))
        }
        Encoding::BitSet => Ok(Box::new(BitSetEmission::new(alleles, n_alleles)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_low_maf_diallelic_and_the_less_common_allele_as_minor() {
        let alleles = vec![0, 0, 0, 1, 0, 0];
        let emission = ingest_record(&alleles, 2).unwrap();
        assert_eq!(emission.major_allele(), Some(0));
        assert_eq!(emission.allele_count(1), Some(1));
        for (h, &a) in alleles.iter().enumerate() {
            assert_eq!(emission.allele(h).unwrap(), a);
        }
    }

    #[test]
    fn tied_majority_picks_least_indexed_allele() {
        // alleles 0 and 1 both cover 2 haplotypes: allele 0 must win.
        let alleles = vec![0, 1, 0, 1];
        let emission = ingest_record(&alleles, 2).unwrap();
        assert_eq!(emission.major_allele(), Some(0));
    }

    #[test]
    fn picks_byte_array_past_low_maf_threshold() {
        // n_haplotypes=4, minor_total=2 >= threshold (1 + 4/200 = 1.02), so
        // this falls through to ByteArray rather than LowMafMultiallelic.
        let alleles = vec![0, 1, 2, 0];
        let emission = ingest_record(&alleles, 3).unwrap();
        assert_eq!(emission.major_allele(), None);
        for (h, &a) in alleles.iter().enumerate() {
            assert_eq!(emission.allele(h).unwrap(), a);
        }
    }

    #[test]
    fn rejects_fewer_than_two_alleles() {
        assert!(matches!(ingest_record(&[0, 0], 1), Err(EmissionError::TooFewAlleles(1))));
    }

    #[test]
    fn rejects_out_of_range_allele() {
        assert!(matches!(ingest_record(&[0, 2], 2), Err(EmissionError::AlleleOutOfRange(2, 2))));
    }
}
