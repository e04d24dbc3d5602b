use crate::dag::Dag;
use crate::error::HmmError;
use crate::gl::Al;
use crate::hap_level::HapBaumLevel;
use crate::hap_pair::HapSingle;
use crate::level_core::checkpoint_capacity;
use crate::node_table::HapNodes;

struct Checkpoint {
    marker: usize,
    nodes: HapNodes,
}

/// Drives the haploid Baum forward/backward/sampling recursion for one
/// reference haplotype, used by the phased-reference imputation path.
pub struct HapBaum<'a> {
    dag: &'a dyn Dag,
    al: &'a dyn Al,
    hap: usize,
    sample_index: u32,
    reversed_markers: bool,
    rng: fastrand::Rng,
}

impl<'a> HapBaum<'a> {
    #[must_use]
    pub fn new(dag: &'a dyn Dag, al: &'a dyn Al, hap: usize, sample_index: u32, reversed_markers: bool, seed: u64) -> Self {
        Self { dag, al, hap, sample_index, reversed_markers, rng: fastrand::Rng::with_seed(seed) }
    }

    fn seed_root(&self) -> HapNodes {
        let mut nodes = HapNodes::new();
        nodes.sum_update([self.dag.start_node()], 1.0).expect("1.0 is a valid seed value");
        nodes
    }

    fn forward_pass(&self) -> Result<(Vec<Checkpoint>, HapBaumLevel), HmmError> {
        let n_markers = self.dag.n_markers();
        let cap = checkpoint_capacity(n_markers);
        let mut slots: Vec<Option<Checkpoint>> = (0..cap).map(|_| None).collect();

        let mut window_index = 0usize;
        let mut array_index = 0usize;
        let mut current = self.seed_root();
        let mut last_level = None;

        for m in 0..n_markers {
            slots[array_index] = Some(Checkpoint { marker: m, nodes: current.clone() });
            let (level, child) = HapBaumLevel::forward(&current, self.dag, self.al, m, self.hap)?;
            current = child;
            if m + 1 == n_markers {
                last_level = Some(level);
            }
            array_index += 1;
            if array_index == cap {
                window_index += 1;
                array_index = window_index;
            }
        }

        let checkpoints: Vec<Checkpoint> = slots.into_iter().flatten().collect();
        Ok((checkpoints, last_level.expect("n_markers > 0 guaranteed by caller")))
    }

    fn level_at(&self, checkpoints: &[Checkpoint], marker: usize) -> Result<HapBaumLevel, HmmError> {
        let ckpt = checkpoints.iter().filter(|c| c.marker <= marker).max_by_key(|c| c.marker).expect("marker 0 is always checkpointed");

        let mut nodes = ckpt.nodes.clone();
        let mut level = None;
        for mm in ckpt.marker..=marker {
            let (lvl, child) = HapBaumLevel::forward(&nodes, self.dag, self.al, mm, self.hap)?;
            if mm == marker {
                level = Some(lvl);
                break;
            }
            nodes = child;
        }
        Ok(level.expect("loop always reaches `marker`"))
    }

    /// Sample `n_copies` haplotypes, optionally accumulating allele
    /// posteriors into `posterior` (one slice per marker).
    ///
    /// # Errors
    /// Propagates [`HmmError`] from the underlying level engine.
    pub fn run(&mut self, n_copies: usize, mut posterior: Option<&mut [Vec<f64>]>) -> Result<Vec<HapSingle>, HmmError> {
        let n_markers = self.dag.n_markers();
        assert!(n_markers > 0, "a DAG must cover at least one marker");

        let (checkpoints, last_level) = self.forward_pass()?;

        if let Some(posterior) = posterior.as_deref_mut() {
            self.accumulate_posteriors(&checkpoints, &last_level, posterior)?;
        }

        let mut haps = Vec::with_capacity(n_copies);
        for _ in 0..n_copies {
            haps.push(self.sample_one(&checkpoints, &last_level)?);
        }
        Ok(haps)
    }

    fn accumulate_posteriors(&self, checkpoints: &[Checkpoint], last_level: &HapBaumLevel, posterior: &mut [Vec<f64>]) -> Result<(), HmmError> {
        let n_markers = self.dag.n_markers();
        let mut next_nodes = last_level.seed_final_backward();

        for m in (0..n_markers).rev() {
            let mut level = self.level_at(checkpoints, m)?;
            let mut local = std::mem::take(&mut posterior[m]);
            next_nodes = level.backward(&next_nodes, &mut local)?;
            posterior[m] = local;
        }
        Ok(())
    }

    fn sample_one(&mut self, checkpoints: &[Checkpoint], last_level: &HapBaumLevel) -> Result<HapSingle, HmmError> {
        let n_markers = self.dag.n_markers();
        let mut alleles = vec![0u32; n_markers];

        let u = self.rng.f64();
        let mut running = 0.0;
        let mut chosen = None;
        for state in last_level.live_states() {
            running += state.fwd;
            if running >= u {
                chosen = Some(state);
                break;
            }
        }
        let state = chosen.unwrap_or_else(|| last_level.live_states().last().expect("at least one live state"));
        alleles[n_markers - 1] = u32::from(state.symbol);
        let mut target_parent = state.child;
        let mut threshold = last_level.fwd_sum() * state.fwd / (state.ep * state.tp);

        for m in (0..n_markers.saturating_sub(1)).rev() {
            let level = self.level_at(checkpoints, m)?;
            let u = if threshold > 0.0 { self.rng.f64() * threshold } else { 0.0 };
            let mut running = 0.0;
            let mut selected = None;
            for candidate in level.live_states() {
                if candidate.child != target_parent {
                    continue;
                }
                running += candidate.fwd;
                if running >= u {
                    selected = Some(candidate);
                    break;
                }
            }
            let selected = selected.or_else(|| level.live_states().filter(|c| c.child == target_parent).last()).ok_or(HmmError::NoLiveStates(m))?;

            alleles[m] = u32::from(selected.symbol);
            target_parent = selected.parent;
            threshold = level.fwd_sum() * selected.fwd / (selected.ep * selected.tp);
        }

        let hap = HapSingle::new(self.sample_index, alleles);
        Ok(if self.reversed_markers { hap.into_forward_order() } else { hap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::FlatDag;
    use marker::Marker;

    struct FixtureAl {
        markers: Vec<Marker>,
        n_hap: usize,
        favored: usize,
    }

    impl Al for FixtureAl {
        fn n_markers(&self) -> usize {
            self.markers.len()
        }
        fn n_haplotypes(&self) -> usize {
            self.n_hap
        }
        fn marker(&self, m: usize) -> &Marker {
            &self.markers[m]
        }
        fn al(&self, _marker: usize, _hap: usize, allele: usize) -> f64 {
            if allele == self.favored {
                1.0
            } else {
                0.0
            }
        }
    }

    fn fixture(n_markers: usize) -> FixtureAl {
        let mut chroms = marker::ChromTable::new();
        let chrom = chroms.intern("1").unwrap();
        let markers = (0..n_markers)
            .map(|i| {
                Marker::new(
                    chrom,
                    marker::Position((i as u32 + 1) * 100),
                    vec![],
                    vec![marker::Allele::Snv(marker::Nucleotide::A), marker::Allele::Snv(marker::Nucleotide::G)].into(),
                    -1,
                )
                .unwrap()
            })
            .collect();
        FixtureAl { markers, n_hap: 2, favored: 0 }
    }

    #[test]
    fn favored_allele_sample_is_deterministic_and_all_zero() {
        let dag = FlatDag::uniform_self_loop(3, 2);
        let al = fixture(3);
        let mut baum = HapBaum::new(&dag, &al, 0, 6, false, 13);
        let haps = baum.run(3, None).unwrap();
        for hap in &haps {
            assert_eq!(hap.alleles, vec![0, 0, 0]);
        }
    }

    #[test]
    fn determinism_same_seed_same_samples() {
        let dag = FlatDag::uniform_self_loop(4, 2);
        let al = fixture(4);
        let mut a = HapBaum::new(&dag, &al, 0, 0, false, 55);
        let mut b = HapBaum::new(&dag, &al, 0, 0, false, 55);
        assert_eq!(a.run(2, None).unwrap(), b.run(2, None).unwrap());
    }
}
