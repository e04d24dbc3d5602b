/// Which [`super::Emission`] implementor a reference ingester should pick
/// for a freshly-parsed record, before the sequence compressor gets a
/// chance to re-encode it as `SeqCoded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    ByteArray,
    BitSet,
    LowMafDiallelic,
    LowMafMultiallelic,
}

/// Deterministic encoding choice for a record with `n_alleles` alleles over
/// `n_haplotypes` haplotypes, where `minor_total` is the combined haplotype
/// count of every non-major allele.
///
/// Mirrors the ingester's selection rule: LowMaf encodings win whenever the
/// combined minor-allele coverage stays under `1 + n_haplotypes/200`; past
/// that threshold, `ByteArray` is used up to 127 alleles, `BitSet` beyond.
#[must_use]
pub fn select_encoding(n_alleles: usize, n_haplotypes: usize, minor_total: usize) -> Encoding {
    let threshold = 1.0 + (n_haplotypes as f64) / 200.0;
    if (minor_total as f64) < threshold {
        if n_alleles == 2 {
            return Encoding::LowMafDiallelic;
        }
        return Encoding::LowMafMultiallelic;
    }
    if n_alleles <= 127 {
        Encoding::ByteArray
    } else {
        Encoding::BitSet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_low_maf_diallelic_under_threshold() {
        assert_eq!(select_encoding(2, 200, 1), Encoding::LowMafDiallelic);
    }

    #[test]
    fn picks_byte_array_at_threshold_boundary() {
        // threshold = 1 + 200/200 = 2.0; minor_total == 2 is NOT < 2.0.
        assert_eq!(select_encoding(2, 200, 2), Encoding::ByteArray);
    }

    #[test]
    fn picks_low_maf_multiallelic_under_threshold() {
        assert_eq!(select_encoding(3, 200, 1), Encoding::LowMafMultiallelic);
    }

    #[test]
    fn picks_bitset_past_byte_array_capacity() {
        assert_eq!(select_encoding(200, 10, 10), Encoding::BitSet);
    }
}
