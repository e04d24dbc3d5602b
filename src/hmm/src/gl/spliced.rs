use marker::Marker;

use super::Gl;
use crate::error::HmmError;

/// A fixed, already-phased haplotype-pair prefix: `alleles[m][s] == (a1, a2)`
/// called at marker `m` for sample `s`.
pub struct HapPrefix {
    markers: Vec<Marker>,
    alleles: Vec<Vec<(usize, usize)>>,
}

impl HapPrefix {
    #[must_use]
    pub fn new(markers: Vec<Marker>, alleles: Vec<Vec<(usize, usize)>>) -> Self {
        Self { markers, alleles }
    }

    #[must_use]
    pub fn n_markers(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.alleles.first().map_or(0, Vec::len)
    }
}

/// Splices a phased haplotype-pair prefix onto the front of `base`: for
/// `m < prefix.n_markers()`, the emission is a hard indicator on the
/// prefix's called genotype; for `m >= prefix.n_markers()` it delegates to
/// `base` at the same marker index (`base` is expected to cover the full
/// marker range, the prefix included, so construction checks the two agree).
pub struct SplicedGl<G> {
    prefix: HapPrefix,
    base: G,
}

impl<G: Gl> SplicedGl<G> {
    /// # Errors
    /// [`HmmError::SplicedPrefixMismatch`] if `base`'s initial markers
    /// differ from the prefix's; [`HmmError::SplicedSampleMismatch`] if
    /// sample counts differ.
    pub fn new(prefix: HapPrefix, base: G) -> Result<Self, HmmError> {
        if prefix.n_samples() != base.n_samples() {
            return Err(HmmError::SplicedSampleMismatch { prefix: prefix.n_samples(), base: base.n_samples() });
        }
        for (m, marker) in prefix.markers.iter().enumerate() {
            if base.marker(m) != marker {
                return Err(HmmError::SplicedPrefixMismatch);
            }
        }
        Ok(Self { prefix, base })
    }
}

impl<G: Gl> Gl for SplicedGl<G> {
    fn n_markers(&self) -> usize {
        self.base.n_markers()
    }

    fn n_samples(&self) -> usize {
        self.base.n_samples()
    }

    fn marker(&self, m: usize) -> &Marker {
        self.base.marker(m)
    }

    fn gl(&self, marker: usize, sample: usize, a1: usize, a2: usize) -> f64 {
        if marker < self.prefix.n_markers() {
            let (c1, c2) = self.prefix.alleles[marker][sample];
            return if a1 == c1 && a2 == c2 { 1.0 } else { 0.0 };
        }
        self.base.gl(marker, sample, a1, a2)
    }

    fn is_phased(&self, sample: usize) -> bool {
        let _ = sample;
        true
    }

    fn allele1(&self, marker: usize, sample: usize) -> i32 {
        if marker < self.prefix.n_markers() {
            self.prefix.alleles[marker][sample].0 as i32
        } else {
            self.base.allele1(marker, sample)
        }
    }

    fn allele2(&self, marker: usize, sample: usize) -> i32 {
        if marker < self.prefix.n_markers() {
            self.prefix.alleles[marker][sample].1 as i32
        } else {
            self.base.allele2(marker, sample)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::fixture::FixtureGl;

    #[test]
    fn prefix_overrides_base_and_suffix_delegates() {
        let base = FixtureGl::with_called(4, 1, (0, 1), true);
        let prefix_markers = (0..2).map(|m| base.marker(m).clone()).collect();
        let prefix = HapPrefix::new(prefix_markers, vec![vec![(1, 1)], vec![(1, 1)]]);

        let spliced = SplicedGl::new(prefix, base).unwrap();
        assert_eq!(spliced.gl(0, 0, 1, 1), 1.0);
        assert_eq!(spliced.gl(0, 0, 0, 1), 0.0);
        assert_eq!(spliced.gl(2, 0, 0, 1), 1.0);
        assert_eq!(spliced.gl(2, 0, 1, 1), 0.0);
    }

    #[test]
    fn rejects_mismatched_prefix_markers() {
        let base = FixtureGl::with_called(4, 1, (0, 1), true);
        let other = FixtureGl::with_called(4, 1, (0, 1), true);
        let bad_prefix_markers = vec![other.marker(1).clone()];
        let prefix = HapPrefix::new(bad_prefix_markers, vec![vec![(0, 0)]]);
        assert!(matches!(SplicedGl::new(prefix, base), Err(HmmError::SplicedPrefixMismatch)));
    }
}
