use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::coordinate::ChromId;
use crate::marker::Marker;

#[derive(Error, Debug)]
pub enum MarkerOrderError {
    #[error("marker {1} at index {0} is out of position order relative to its predecessor")]
    OutOfOrder(usize, u32),

    #[error("chromosome {0} is not contiguous: it reappears at index {1} after another chromosome")]
    NonContiguousChrom(u32, usize),

    #[error("duplicate marker at index {0}")]
    Duplicate(usize),
}

/// `ceil(log2(n))` bits needed to index `n` distinct values, `n >= 1`.
#[must_use]
pub fn bits_for_alleles(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// An ordered, immutable, validated sequence of distinct [`Marker`]s.
///
/// Construction precomputes three prefix sums of length `n + 1`
/// (`sum_alleles`, `sum_genotypes`, `sum_haplotype_bits`) so that
/// downstream encodings can compute per-marker byte/bit offsets in O(1).
#[derive(Debug)]
pub struct Markers {
    markers: Vec<Marker>,
    sum_alleles: Vec<usize>,
    sum_genotypes: Vec<usize>,
    sum_haplotype_bits: Vec<usize>,
    reversed: OnceCell<Markers>,
}

impl Markers {
    /// Validate ordering/contiguity/uniqueness and precompute prefix sums.
    ///
    /// # Errors
    /// Returns [`MarkerOrderError`] if markers on one chromosome are not
    /// contiguous, if positions regress within a chromosome, or if two
    /// markers compare equal.
    pub fn new(markers: Vec<Marker>) -> Result<Self, MarkerOrderError> {
        validate_order(&markers)?;

        let n = markers.len();
        let mut sum_alleles = Vec::with_capacity(n + 1);
        let mut sum_genotypes = Vec::with_capacity(n + 1);
        let mut sum_haplotype_bits = Vec::with_capacity(n + 1);
        sum_alleles.push(0);
        sum_genotypes.push(0);
        sum_haplotype_bits.push(0);
        for m in &markers {
            sum_alleles.push(sum_alleles.last().unwrap() + m.n_alleles());
            sum_genotypes.push(sum_genotypes.last().unwrap() + m.n_genotypes());
            sum_haplotype_bits.push(sum_haplotype_bits.last().unwrap() + bits_for_alleles(m.n_alleles()));
        }

        Ok(Self {
            markers,
            sum_alleles,
            sum_genotypes,
            sum_haplotype_bits,
            reversed: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn sum_alleles(&self, index: usize) -> usize {
        self.sum_alleles[index]
    }

    #[must_use]
    pub fn sum_genotypes(&self, index: usize) -> usize {
        self.sum_genotypes[index]
    }

    #[must_use]
    pub fn sum_haplotype_bits(&self, index: usize) -> usize {
        self.sum_haplotype_bits[index]
    }

    /// A fresh [`Markers`] over the half-open slice `[lo, hi)`.
    ///
    /// # Errors
    /// Propagates [`MarkerOrderError`] in the vanishingly unlikely case that
    /// re-validating the (already-valid) sub-slice fails; present only
    /// because construction always re-derives prefix sums through `new`.
    pub fn restrict(&self, lo: usize, hi: usize) -> Result<Self, MarkerOrderError> {
        Self::new(self.markers[lo..hi].to_vec())
    }

    /// A lazily-materialized view with markers in reverse order (each
    /// marker's own allele list is untouched), sharing no mutable state
    /// with the forward view once built.
    pub fn reversed(&self) -> &Markers {
        self.reversed.get_or_init(|| {
            let mut reversed: Vec<Marker> = self.markers.iter().rev().cloned().collect();
            reversed.shrink_to_fit();
            // The reversed view deliberately skips `Markers::new`'s ordering
            // validation: the forward view is already known valid, and
            // reverse order is expected to violate the non-decreasing
            // position invariant by construction.
            Markers::new_unchecked(reversed)
        })
    }

    fn new_unchecked(markers: Vec<Marker>) -> Self {
        let n = markers.len();
        let mut sum_alleles = Vec::with_capacity(n + 1);
        let mut sum_genotypes = Vec::with_capacity(n + 1);
        let mut sum_haplotype_bits = Vec::with_capacity(n + 1);
        sum_alleles.push(0);
        sum_genotypes.push(0);
        sum_haplotype_bits.push(0);
        for m in &markers {
            sum_alleles.push(sum_alleles.last().unwrap() + m.n_alleles());
            sum_genotypes.push(sum_genotypes.last().unwrap() + m.n_genotypes());
            sum_haplotype_bits.push(sum_haplotype_bits.last().unwrap() + bits_for_alleles(m.n_alleles()));
        }
        Self {
            markers,
            sum_alleles,
            sum_genotypes,
            sum_haplotype_bits,
            reversed: OnceCell::new(),
        }
    }
}

fn validate_order(markers: &[Marker]) -> Result<(), MarkerOrderError> {
    let mut seen_chroms: Vec<ChromId> = Vec::new();
    for (i, m) in markers.iter().enumerate() {
        if i > 0 {
            let prev = &markers[i - 1];
            if m.chrom() == prev.chrom() {
                if m.pos() < prev.pos() {
                    return Err(MarkerOrderError::OutOfOrder(i, m.pos().0));
                }
                if m == prev {
                    return Err(MarkerOrderError::Duplicate(i));
                }
            } else if seen_chroms.contains(&m.chrom()) {
                return Err(MarkerOrderError::NonContiguousChrom(m.chrom().0, i));
            }
        }
        if !seen_chroms.contains(&m.chrom()) {
            seen_chroms.push(m.chrom());
        }
    }
    Ok(())
}
