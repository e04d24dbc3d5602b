use super::{check_haplotype, Emission};
use crate::error::EmissionError;

/// `n_alleles == 2`: store only the minor allele's sorted haplotype
/// indices; every other haplotype carries the major allele implicitly.
#[derive(Debug, Clone)]
pub struct LowMafDiallelicEmission {
    minor_allele: usize,
    minor_haps: Vec<usize>,
    n_haplotypes: usize,
}

impl LowMafDiallelicEmission {
    /// # Errors
    /// [`EmissionError::HaplotypeOutOfRange`] if any entry in `minor_haps`
    /// is `>= n_haplotypes`.
    pub fn new(minor_allele: usize, mut minor_haps: Vec<usize>, n_haplotypes: usize) -> Result<Self, EmissionError> {
        for &h in &minor_haps {
            check_haplotype(h, n_haplotypes)?;
        }
        minor_haps.sort_unstable();
        minor_haps.dedup();
        Ok(Self { minor_allele, minor_haps, n_haplotypes })
    }

    fn major_allele_value(&self) -> usize {
        1 - self.minor_allele
    }
}

impl Emission for LowMafDiallelicEmission {
    fn n_alleles(&self) -> usize {
        2
    }

    fn n_haplotypes(&self) -> usize {
        self.n_haplotypes
    }

    fn allele(&self, hap: usize) -> Result<usize, EmissionError> {
        check_haplotype(hap, self.n_haplotypes())?;
        if self.minor_haps.binary_search(&hap).is_ok() {
            Ok(self.minor_allele)
        } else {
            Ok(self.major_allele_value())
        }
    }

    fn major_allele(&self) -> Option<usize> {
        Some(self.major_allele_value())
    }

    fn allele_count(&self, allele: usize) -> Option<usize> {
        if allele == self.minor_allele {
            Some(self.minor_haps.len())
        } else if allele == self.major_allele_value() {
            Some(self.n_haplotypes - self.minor_haps.len())
        } else {
            None
        }
    }

    fn hap_index(&self, allele: usize, copy: usize) -> Option<usize> {
        if allele == self.minor_allele {
            self.minor_haps.get(copy).copied()
        } else {
            None
        }
    }
}

/// `n_alleles > 2`: one sorted haplotype-index array per non-major allele;
/// the major allele's haplotypes are implicit (whatever's left over).
#[derive(Debug, Clone)]
pub struct LowMafMultiallelicEmission {
    major_allele: usize,
    n_alleles: usize,
    n_haplotypes: usize,
    // (allele, sorted haplotype indices), one entry per non-major allele.
    non_major: Vec<(usize, Vec<usize>)>,
}

impl LowMafMultiallelicEmission {
    /// # Errors
    /// [`EmissionError::HaplotypeOutOfRange`] if any haplotype index is out
    /// of range. [`EmissionError::NoUniqueMajorAllele`] if `major_allele`
    /// also appears as a key in `non_major`.
    pub fn new(
        major_allele: usize,
        n_alleles: usize,
        n_haplotypes: usize,
        mut non_major: Vec<(usize, Vec<usize>)>,
    ) -> Result<Self, EmissionError> {
        if non_major.iter().any(|(a, _)| *a == major_allele) {
            return Err(EmissionError::NoUniqueMajorAllele);
        }
        for (_, haps) in &mut non_major {
            for &h in haps.iter() {
                check_haplotype(h, n_haplotypes)?;
            }
            haps.sort_unstable();
            haps.dedup();
        }
        Ok(Self { major_allele, n_alleles, n_haplotypes, non_major })
    }
}

impl Emission for LowMafMultiallelicEmission {
    fn n_alleles(&self) -> usize {
        self.n_alleles
    }

    fn n_haplotypes(&self) -> usize {
        self.n_haplotypes
    }

    fn allele(&self, hap: usize) -> Result<usize, EmissionError> {
        check_haplotype(hap, self.n_haplotypes())?;
        for (allele, haps) in &self.non_major {
            if haps.binary_search(&hap).is_ok() {
                return Ok(*allele);
            }
        }
        Ok(self.major_allele)
    }

    fn major_allele(&self) -> Option<usize> {
        Some(self.major_allele)
    }

    fn allele_count(&self, allele: usize) -> Option<usize> {
        if allele == self.major_allele {
            let covered: usize = self.non_major.iter().map(|(_, haps)| haps.len()).sum();
            return Some(self.n_haplotypes - covered);
        }
        self.non_major
            .iter()
            .find(|(a, _)| *a == allele)
            .map(|(_, haps)| haps.len())
    }

    fn hap_index(&self, allele: usize, copy: usize) -> Option<usize> {
        self.non_major
            .iter()
            .find(|(a, _)| *a == allele)
            .and_then(|(_, haps)| haps.get(copy).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diallelic_allele_matches_major_minor_split() {
        let e = LowMafDiallelicEmission::new(1, vec![3, 1], 6).unwrap();
        assert_eq!(e.allele(1).unwrap(), 1);
        assert_eq!(e.allele(3).unwrap(), 1);
        assert_eq!(e.allele(0).unwrap(), 0);
        assert_eq!(e.allele_count(1), Some(2));
        assert_eq!(e.allele_count(0), Some(4));
    }

    #[test]
    fn multiallelic_falls_back_to_major() {
        let e = LowMafMultiallelicEmission::new(0, 3, 8, vec![(1, vec![2]), (2, vec![5, 6])]).unwrap();
        assert_eq!(e.allele(2).unwrap(), 1);
        assert_eq!(e.allele(5).unwrap(), 2);
        assert_eq!(e.allele(0).unwrap(), 0);
        assert_eq!(e.allele_count(0), Some(5));
    }

    #[test]
    fn multiallelic_rejects_major_in_non_major_list() {
        assert!(LowMafMultiallelicEmission::new(0, 3, 8, vec![(0, vec![1])]).is_err());
    }
}
