use crate::dag::Dag;
use crate::duo_level::{DuoBaumLevel, DuoSamples};
use crate::error::HmmError;
use crate::gl::Gl;
use crate::hap_pair::HapPair;
use crate::level_core::checkpoint_capacity;
use crate::node_table::DuoNodes;

struct Checkpoint {
    marker: usize,
    nodes: DuoNodes,
}

/// Drives the parent-offspring duo Baum forward/backward/sampling
/// recursion, producing a haplotype pair for the offspring.
pub struct DuoBaum<'a> {
    dag: &'a dyn Dag,
    gl: &'a dyn Gl,
    samples: DuoSamples,
    sample_index: u32,
    reversed_markers: bool,
    rng: fastrand::Rng,
}

impl<'a> DuoBaum<'a> {
    #[must_use]
    pub fn new(dag: &'a dyn Dag, gl: &'a dyn Gl, samples: DuoSamples, sample_index: u32, reversed_markers: bool, seed: u64) -> Self {
        Self { dag, gl, samples, sample_index, reversed_markers, rng: fastrand::Rng::with_seed(seed) }
    }

    fn seed_root(&self) -> DuoNodes {
        let start = self.dag.start_node();
        let mut nodes = DuoNodes::new();
        nodes.sum_update([start, start, start], 1.0).expect("1.0 is a valid seed value");
        nodes
    }

    fn forward_pass(&self) -> Result<(Vec<Checkpoint>, DuoBaumLevel), HmmError> {
        let n_markers = self.dag.n_markers();
        let cap = checkpoint_capacity(n_markers);
        let mut slots: Vec<Option<Checkpoint>> = (0..cap).map(|_| None).collect();

        let mut window_index = 0usize;
        let mut array_index = 0usize;
        let mut current = self.seed_root();
        let mut last_level = None;

        for m in 0..n_markers {
            slots[array_index] = Some(Checkpoint { marker: m, nodes: current.clone() });
            let (level, child) = DuoBaumLevel::forward(&current, self.dag, self.gl, m, self.samples)?;
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

    fn level_at(&self, checkpoints: &[Checkpoint], marker: usize) -> Result<DuoBaumLevel, HmmError> {
        let ckpt = checkpoints.iter().filter(|c| c.marker <= marker).max_by_key(|c| c.marker).expect("marker 0 is always checkpointed");

        let mut nodes = ckpt.nodes.clone();
        let mut level = None;
        for mm in ckpt.marker..=marker {
            let (lvl, child) = DuoBaumLevel::forward(&nodes, self.dag, self.gl, mm, self.samples)?;
            if mm == marker {
                level = Some(lvl);
                break;
            }
            nodes = child;
        }
        Ok(level.expect("loop always reaches `marker`"))
    }

    /// Sample `n_copies` offspring haplotype pairs, optionally accumulating
    /// genotype posteriors into `posterior` (one slice per marker).
    ///
    /// # Errors
    /// Propagates [`HmmError`] from the underlying level engine.
    pub fn run(&mut self, n_copies: usize, mut posterior: Option<&mut [Vec<f64>]>) -> Result<Vec<HapPair>, HmmError> {
        let n_markers = self.dag.n_markers();
        assert!(n_markers > 0, "a DAG must cover at least one marker");

        let (checkpoints, last_level) = self.forward_pass()?;

        if let Some(posterior) = posterior.as_deref_mut() {
            self.accumulate_posteriors(&checkpoints, &last_level, posterior)?;
        }

        let mut pairs = Vec::with_capacity(n_copies);
        for _ in 0..n_copies {
            pairs.push(self.sample_one(&checkpoints, &last_level)?);
        }
        Ok(pairs)
    }

    fn accumulate_posteriors(&self, checkpoints: &[Checkpoint], last_level: &DuoBaumLevel, posterior: &mut [Vec<f64>]) -> Result<(), HmmError> {
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

    fn sample_one(&mut self, checkpoints: &[Checkpoint], last_level: &DuoBaumLevel) -> Result<HapPair, HmmError> {
        let n_markers = self.dag.n_markers();
        let mut hap1 = vec![0u32; n_markers];
        let mut hap2 = vec![0u32; n_markers];

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
        hap1[n_markers - 1] = u32::from(state.symbols[0]);
        hap2[n_markers - 1] = u32::from(state.symbols[2]);
        let mut target_parent = state.child_tuple;
        let mut threshold = last_level.fwd_sum() * state.fwd / (state.ep * state.tp);

        for m in (0..n_markers.saturating_sub(1)).rev() {
            let level = self.level_at(checkpoints, m)?;
            let u = if threshold > 0.0 { self.rng.f64() * threshold } else { 0.0 };
            let mut running = 0.0;
            let mut selected = None;
            for candidate in level.live_states() {
                if candidate.child_tuple != target_parent {
                    continue;
                }
                running += candidate.fwd;
                if running >= u {
                    selected = Some(candidate);
                    break;
                }
            }
            let selected = selected
                .or_else(|| level.live_states().filter(|c| c.child_tuple == target_parent).last())
                .ok_or(HmmError::NoLiveStates(m))?;

            hap1[m] = u32::from(selected.symbols[0]);
            hap2[m] = u32::from(selected.symbols[2]);
            target_parent = selected.parent_tuple;
            threshold = level.fwd_sum() * selected.fwd / (selected.ep * selected.tp);
        }

        let pair = HapPair::new(self.sample_index, hap1, hap2);
        Ok(if self.reversed_markers { pair.into_forward_order() } else { pair })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::FlatDag;
    use crate::gl::fixture::FixtureGl;

    #[test]
    fn homref_sample_produces_homref_offspring_haplotypes() {
        let dag = FlatDag::uniform_self_loop(3, 2);
        let gl = FixtureGl::homref(3, 2);
        let samples = DuoSamples { parent: 0, child: 1 };
        let mut baum = DuoBaum::new(&dag, &gl, samples, 9, false, 11);
        let pairs = baum.run(3, None).unwrap();
        assert_eq!(pairs.len(), 3);
        for pair in &pairs {
            assert_eq!(pair.hap1, vec![0, 0, 0]);
            assert_eq!(pair.hap2, vec![0, 0, 0]);
        }
    }

    #[test]
    fn determinism_same_seed_same_samples() {
        let dag = FlatDag::uniform_self_loop(4, 2);
        let gl = FixtureGl::with_called(4, 2, (-1, -1), true);
        let samples = DuoSamples { parent: 0, child: 1 };
        let mut a = DuoBaum::new(&dag, &gl, samples, 0, false, 7);
        let mut b = DuoBaum::new(&dag, &gl, samples, 0, false, 7);
        assert_eq!(a.run(2, None).unwrap(), b.run(2, None).unwrap());
    }
}
