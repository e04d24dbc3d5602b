use crate::dag::Dag;
use crate::error::HmmError;
use crate::gl::Gl;
use crate::hap_pair::HapPair;
use crate::level_core::checkpoint_capacity;
use crate::node_table::SingleNodes;
use crate::single_level::SingleBaumLevel;

struct Checkpoint {
    marker: usize,
    nodes: SingleNodes,
}

/// Drives the singleton Baum forward/backward/sampling recursion for one
/// unrelated diploid sample, using a triangular checkpoint buffer so peak
/// memory stays at `O(sqrt(n_markers))` forward levels rather than `O(n_markers)`.
pub struct SingleBaum<'a> {
    dag: &'a dyn Dag,
    gl: &'a dyn Gl,
    sample: usize,
    sample_index: u32,
    reversed_markers: bool,
    rng: fastrand::Rng,
    underflow_clamps: usize,
}

impl<'a> SingleBaum<'a> {
    #[must_use]
    pub fn new(dag: &'a dyn Dag, gl: &'a dyn Gl, sample: usize, sample_index: u32, reversed_markers: bool, seed: u64) -> Self {
        Self { dag, gl, sample, sample_index, reversed_markers, rng: fastrand::Rng::with_seed(seed), underflow_clamps: 0 }
    }

    /// Number of times the `MIN_VALUE` underflow clamp has fired across
    /// every `run` call so far on this driver.
    #[must_use]
    pub fn underflow_clamps(&self) -> usize {
        self.underflow_clamps
    }

    fn seed_root(&self) -> SingleNodes {
        let mut nodes = SingleNodes::new();
        nodes.sum_update([self.dag.start_node(), self.dag.start_node()], 1.0).expect("1.0 is a valid seed value");
        nodes
    }

    /// Run the forward pass over every marker, retaining only a triangular
    /// checkpoint buffer of parent-node tables, plus the final level (kept
    /// in full to seed the backward pass without a recompute).
    fn forward_pass(&self) -> Result<(Vec<Checkpoint>, SingleBaumLevel, usize), HmmError> {
        let n_markers = self.dag.n_markers();
        let cap = checkpoint_capacity(n_markers);
        let mut slots: Vec<Option<Checkpoint>> = (0..cap).map(|_| None).collect();

        let mut window_index = 0usize;
        let mut array_index = 0usize;
        let mut current = self.seed_root();
        let mut last_level = None;
        let mut clamped_count = 0;

        for m in 0..n_markers {
            slots[array_index] = Some(Checkpoint { marker: m, nodes: current.clone() });
            let (level, child) = SingleBaumLevel::forward(&current, self.dag, self.gl, m, self.sample)?;
            clamped_count += level.clamped_count();
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
        Ok((checkpoints, last_level.expect("n_markers > 0 guaranteed by caller"), clamped_count))
    }

    /// Recompute the full level at `marker`, replaying forward from the
    /// nearest checkpoint at or before it.
    fn level_at(&self, checkpoints: &[Checkpoint], marker: usize) -> Result<SingleBaumLevel, HmmError> {
        let ckpt = checkpoints
            .iter()
            .filter(|c| c.marker <= marker)
            .max_by_key(|c| c.marker)
            .expect("marker 0 is always checkpointed");

        let mut nodes = ckpt.nodes.clone();
        let mut level = None;
        for mm in ckpt.marker..=marker {
            let (lvl, child) = SingleBaumLevel::forward(&nodes, self.dag, self.gl, mm, self.sample)?;
            if mm == marker {
                level = Some(lvl);
                break;
            }
            nodes = child;
        }
        Ok(level.expect("loop always reaches `marker`"))
    }

    /// Sample `n_copies` haplotype pairs, optionally accumulating genotype
    /// posteriors into `posterior` (one `n_genotypes(m)`-long slice per
    /// marker, laid out by the caller using `Markers`' cumulative-genotype
    /// prefix sums — pass `None` to skip posterior accumulation).
    ///
    /// # Errors
    /// Propagates [`HmmError`] from the underlying level engine (e.g. if
    /// some marker has no live states at all).
    pub fn run(&mut self, n_copies: usize, mut posterior: Option<&mut [Vec<f64>]>) -> Result<Vec<HapPair>, HmmError> {
        let n_markers = self.dag.n_markers();
        assert!(n_markers > 0, "a DAG must cover at least one marker");

        let (checkpoints, last_level, clamped_count) = self.forward_pass()?;
        self.underflow_clamps += clamped_count;

        if let Some(posterior) = posterior.as_deref_mut() {
            self.accumulate_posteriors(&checkpoints, &last_level, posterior)?;
        }

        let mut pairs = Vec::with_capacity(n_copies);
        for _ in 0..n_copies {
            pairs.push(self.sample_one(&checkpoints, &last_level)?);
        }
        Ok(pairs)
    }

    fn accumulate_posteriors(&self, checkpoints: &[Checkpoint], last_level: &SingleBaumLevel, posterior: &mut [Vec<f64>]) -> Result<(), HmmError> {
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

    fn sample_one(&mut self, checkpoints: &[Checkpoint], last_level: &SingleBaumLevel) -> Result<HapPair, HmmError> {
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
        hap2[n_markers - 1] = u32::from(state.symbols[1]);
        let mut target_parent = state.parent;
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

            hap1[m] = u32::from(selected.symbols[0]);
            hap2[m] = u32::from(selected.symbols[1]);
            target_parent = selected.parent;
            threshold = level.fwd_sum() * selected.fwd / (selected.ep * selected.tp);
        }

        let pair = HapPair::new(self.sample_index, hap1, hap2);
        Ok(if self.reversed_markers { pair.into_forward_order() } else { pair })
    }
}
