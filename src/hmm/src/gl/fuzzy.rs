use marker::Marker;

use super::Gl;

/// Injects independent per-allele error `eps` into a phased, fully-called
/// base genotype: `f = 1 - eps`; the joint probability of the observed
/// pair given the called pair factors into `ff` (both alleles correct),
/// `ef` (one correct), and `ee` (neither).
///
/// `FuzzyGl::new(base, 0.0)` is the identity on phased, non-missing input:
/// `f == 1`, so only the exact called pair keeps non-zero mass.
pub struct FuzzyGl<G> {
    base: G,
    eps: f64,
}

impl<G: Gl> FuzzyGl<G> {
    /// # Panics
    /// If `eps` is not in `[0, 1)`.
    #[must_use]
    pub fn new(base: G, eps: f64) -> Self {
        assert!((0.0..1.0).contains(&eps), "fuzzy GL error rate must be in [0, 1)");
        Self { base, eps }
    }

    fn factor(&self, matches: bool) -> f64 {
        if matches {
            1.0 - self.eps
        } else {
            self.eps
        }
    }
}

impl<G: Gl> Gl for FuzzyGl<G> {
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
        let obs1 = self.base.allele1(marker, sample);
        let obs2 = self.base.allele2(marker, sample);
        if obs1 < 0 || obs2 < 0 {
            return self.base.gl(marker, sample, a1, a2);
        }
        let (obs1, obs2) = (obs1 as usize, obs2 as usize);

        if self.base.is_phased(sample) {
            return self.factor(obs1 == a1) * self.factor(obs2 == a2);
        }

        if obs1 == obs2 {
            return self.factor(obs1 == a1) * self.factor(obs2 == a2);
        }
        self.factor(obs1 == a1) * self.factor(obs2 == a2) + self.factor(obs2 == a1) * self.factor(obs1 == a2)
    }

    fn is_phased(&self, sample: usize) -> bool {
        self.base.is_phased(sample)
    }

    fn allele1(&self, marker: usize, sample: usize) -> i32 {
        self.base.allele1(marker, sample)
    }

    fn allele2(&self, marker: usize, sample: usize) -> i32 {
        self.base.allele2(marker, sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::fixture::FixtureGl;

    #[test]
    fn zero_epsilon_is_identity_on_phased_calls() {
        let base = FixtureGl::with_called(1, 1, (0, 1), true);
        let fuzzy = FuzzyGl::new(FixtureGl::with_called(1, 1, (0, 1), true), 0.0);
        for a1 in 0..2 {
            for a2 in 0..2 {
                assert_eq!(fuzzy.gl(0, 0, a1, a2), base.gl(0, 0, a1, a2));
            }
        }
    }

    #[test]
    fn positive_epsilon_spreads_mass() {
        let fuzzy = FuzzyGl::new(FixtureGl::with_called(1, 1, (0, 1), true), 0.1);
        assert!((fuzzy.gl(0, 0, 0, 1) - 0.81).abs() < 1e-12);
        assert!((fuzzy.gl(0, 0, 1, 0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn missing_call_falls_through_to_base() {
        let base = FixtureGl::with_called(1, 1, (-1, -1), true);
        let fuzzy = FuzzyGl::new(FixtureGl::with_called(1, 1, (-1, -1), true), 0.1);
        assert_eq!(fuzzy.gl(0, 0, 0, 1), base.gl(0, 0, 0, 1));
    }
}
