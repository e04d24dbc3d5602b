//! Test-only `Gl` fixture shared across this module's wrapper tests.
#![cfg(test)]

use marker::{Allele, ChromTable, Marker, Nucleotide, Position};

use super::Gl;

/// A minimal phased `Gl` over diallelic markers whose genotype likelihood
/// is `1.0` for a configurable called genotype and `0.0` elsewhere.
pub(crate) struct FixtureGl {
    markers: Vec<Marker>,
    n_samples: usize,
    called: (i32, i32),
    phased: bool,
}

impl FixtureGl {
    pub(crate) fn homref(n_markers: usize, n_samples: usize) -> Self {
        Self::with_called(n_markers, n_samples, (0, 0), true)
    }

    pub(crate) fn with_called(n_markers: usize, n_samples: usize, called: (i32, i32), phased: bool) -> Self {
        let mut chroms = ChromTable::new();
        let chrom = chroms.intern("1").unwrap();
        let markers = (0..n_markers)
            .map(|i| {
                Marker::new(
                    chrom,
                    Position((i as u32 + 1) * 100),
                    vec![],
                    vec![Allele::Snv(Nucleotide::A), Allele::Snv(Nucleotide::G)].into(),
                    -1,
                )
                .unwrap()
            })
            .collect();
        Self { markers, n_samples, called, phased }
    }
}

impl Gl for FixtureGl {
    fn n_markers(&self) -> usize {
        self.markers.len()
    }

    fn n_samples(&self) -> usize {
        self.n_samples
    }

    fn marker(&self, m: usize) -> &Marker {
        &self.markers[m]
    }

    fn gl(&self, _marker: usize, _sample: usize, a1: usize, a2: usize) -> f64 {
        let (c1, c2) = self.called;
        if c1 < 0 || c2 < 0 {
            return 1.0;
        }
        if a1 as i32 == c1 && a2 as i32 == c2 {
            1.0
        } else {
            0.0
        }
    }

    fn is_phased(&self, _sample: usize) -> bool {
        self.phased
    }

    fn allele1(&self, _marker: usize, _sample: usize) -> i32 {
        self.called.0
    }

    fn allele2(&self, _marker: usize, _sample: usize) -> i32 {
        self.called.1
    }
}
