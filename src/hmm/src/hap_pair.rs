/// A sampled haplotype pair for one sample: one allele index per marker on
/// each of its two haplotypes, identified by the sample's global index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapPair {
    pub sample_index: u32,
    pub hap1: Vec<u32>,
    pub hap2: Vec<u32>,
}

impl HapPair {
    #[must_use]
    pub fn new(sample_index: u32, hap1: Vec<u32>, hap2: Vec<u32>) -> Self {
        Self { sample_index, hap1, hap2 }
    }

    /// Re-expose forward marker order after sampling was run against a
    /// marker-reversed DAG.
    #[must_use]
    pub fn into_forward_order(self) -> Self {
        Self { sample_index: self.sample_index, hap1: self.hap1.into_iter().rev().collect(), hap2: self.hap2.into_iter().rev().collect() }
    }
}

/// A sampled single haplotype, for the haploid driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapSingle {
    pub sample_index: u32,
    pub alleles: Vec<u32>,
}

impl HapSingle {
    #[must_use]
    pub fn new(sample_index: u32, alleles: Vec<u32>) -> Self {
        Self { sample_index, alleles }
    }

    #[must_use]
    pub fn into_forward_order(self) -> Self {
        Self { sample_index: self.sample_index, alleles: self.alleles.into_iter().rev().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_order_reverses_both_haplotypes() {
        let pair = HapPair::new(3, vec![0, 1, 2], vec![1, 1, 0]);
        let forward = pair.into_forward_order();
        assert_eq!(forward.hap1, vec![2, 1, 0]);
        assert_eq!(forward.hap2, vec![0, 1, 1]);
    }
}
