use crate::dag::Dag;
use crate::error::HmmError;
use crate::gl::Gl;
use crate::level_core::{clamp_underflow, genotype_index, grown_capacity};
use crate::node_table::SingleNodes;

struct State {
    parent: [u32; 2],
    child: [u32; 2],
    symbols: [u8; 2],
    tp: f64,
    ep: f64,
    fwd: f64,
    bwd: f64,
}

/// A read-only view of one live state, for driver-side sampling.
#[derive(Clone, Copy)]
pub struct LiveState {
    pub parent: [u32; 2],
    pub child: [u32; 2],
    pub symbols: [u8; 2],
    pub tp: f64,
    pub ep: f64,
    pub fwd: f64,
}

/// One marker level of the singleton (unrelated diploid sample) Baum
/// recursion: a pair of DAG edges, one per haplotype.
pub struct SingleBaumLevel {
    states: Vec<State>,
    marker: usize,
    sample: usize,
    fwd_sum: f64,
    bwd_sum: f64,
    clamped_count: usize,
}

impl SingleBaumLevel {
    #[must_use]
    pub fn marker(&self) -> usize {
        self.marker
    }

    #[must_use]
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn sample(&self) -> usize {
        self.sample
    }

    #[must_use]
    pub fn fwd_sum(&self) -> f64 {
        self.fwd_sum
    }

    /// Count of states whose forward value hit the [`crate::level_core::MIN_VALUE`]
    /// underflow floor during this level's forward step.
    #[must_use]
    pub fn clamped_count(&self) -> usize {
        self.clamped_count
    }

    /// Sum of normalized forward values across all live states; `1.0`
    /// whenever at least one state is live, `0.0` if the level is empty.
    #[must_use]
    pub fn fwd_total(&self) -> f64 {
        self.states.iter().map(|s| s.fwd).sum()
    }

    /// Sum of normalized backward values across all live states, valid
    /// after [`Self::backward`] has run; `1.0` whenever `backward`
    /// succeeded.
    #[must_use]
    pub fn bwd_total(&self) -> f64 {
        self.states.iter().map(|s| s.bwd).sum()
    }

    /// Iterate all live states for driver-side sampling, in forward order.
    pub fn live_states(&self) -> impl Iterator<Item = LiveState> + '_ {
        self.states.iter().map(|s| LiveState { parent: s.parent, child: s.child, symbols: s.symbols, tp: s.tp, ep: s.ep, fwd: s.fwd })
    }

    /// Run the forward step from `parent_nodes` (the previous level's
    /// child-node table, or a singleton `{[start, start]: 1.0}` table at
    /// marker 0) and return the populated level plus the child-node table
    /// to feed the next level's forward step.
    ///
    /// # Errors
    /// [`HmmError::NoLiveStates`] if no candidate edge tuple has a
    /// strictly positive emission.
    pub fn forward(
        parent_nodes: &SingleNodes,
        dag: &dyn Dag,
        gl: &dyn Gl,
        marker: usize,
        sample: usize,
    ) -> Result<(Self, SingleNodes), HmmError> {
        let mut states = Vec::with_capacity(grown_capacity(0, parent_nodes.len()));
        let mut fwd_sum = 0.0;
        let mut clamped_count = 0;

        for (parent, parent_value) in parent_nodes.enumerate() {
            let edges1 = dag.out_edges(marker, parent[0]);
            let edges2 = dag.out_edges(marker, parent[1]);
            for e1 in edges1 {
                for e2 in edges2 {
                    let ep = gl.gl(marker, sample, e1.symbol as usize, e2.symbol as usize);
                    if ep <= 0.0 {
                        continue;
                    }
                    let tp = e1.prob * e2.prob;
                    let raw = parent_value * ep * tp;
                    let fwd = clamp_underflow(raw, parent_value);
                    if fwd != raw {
                        clamped_count += 1;
                    }
                    fwd_sum += fwd;
                    if states.len() == states.capacity() {
                        states.reserve(grown_capacity(states.capacity(), states.len() + 1) - states.capacity());
                    }
                    states.push(State {
                        parent,
                        child: [e1.child, e2.child],
                        symbols: [e1.symbol, e2.symbol],
                        tp,
                        ep,
                        fwd,
                        bwd: 0.0,
                    });
                }
            }
        }

        if states.is_empty() {
            return Err(HmmError::NoLiveStates(marker));
        }

        let mut child_nodes = SingleNodes::new();
        for state in &mut states {
            state.fwd /= fwd_sum;
            child_nodes.sum_update(state.child, state.fwd)?;
        }

        Ok((Self { states, marker, sample, fwd_sum, bwd_sum: 0.0, clamped_count }, child_nodes))
    }

    /// Seed the backward pass at the final level: every live state's
    /// child tuple starts with backward value `1.0`.
    #[must_use]
    pub fn seed_final_backward(&self) -> SingleNodes {
        let mut nodes = SingleNodes::new();
        for state in &self.states {
            nodes.max_update(state.child, 1.0).expect("1.0 is a valid node-table value");
        }
        nodes
    }

    /// Run the backward step given `next_nodes` (the already-propagated
    /// backward values keyed by this level's child tuples), accumulating
    /// normalized `fwd*bwd` mass into `posterior` (indexed by
    /// [`genotype_index`]) and returning the node table to propagate to
    /// the previous level.
    ///
    /// # Errors
    /// [`HmmError::PosteriorLengthMismatch`] if `posterior.len()` isn't the
    /// marker's genotype count; [`HmmError::NoLiveStates`] if `bwd_sum`
    /// comes out non-positive (every child tuple had zero backward mass).
    pub fn backward(&mut self, next_nodes: &SingleNodes, posterior: &mut [f64]) -> Result<SingleNodes, HmmError> {
        let mut bwd_sum = 0.0;
        for state in &mut self.states {
            state.bwd = next_nodes.value(&state.child);
            bwd_sum += state.bwd;
        }
        if bwd_sum <= 0.0 {
            return Err(HmmError::NoLiveStates(self.marker));
        }
        self.bwd_sum = bwd_sum;

        let mut gt_sum = 0.0;
        for state in &mut self.states {
            state.bwd /= bwd_sum;
            let bin = genotype_index(state.symbols[0] as usize, state.symbols[1] as usize);
            if bin >= posterior.len() {
                return Err(HmmError::PosteriorLengthMismatch { expected: bin + 1, actual: posterior.len() });
            }
            let state_prob = state.fwd * state.bwd;
            posterior[bin] += state_prob;
            gt_sum += state_prob;
        }

        let mut parent_nodes = SingleNodes::new();
        for state in &self.states {
            let raw = state.bwd * state.tp * state.ep;
            let prop = clamp_underflow(raw, state.bwd);
            parent_nodes.sum_update(state.parent, prop)?;
        }

        if gt_sum > 0.0 {
            for p in posterior.iter_mut() {
                *p /= gt_sum;
            }
        }

        Ok(parent_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::FlatDag;
    use crate::gl::fixture::FixtureGl;
    use crate::node_table::SingleNodes;

    fn seed_root() -> SingleNodes {
        let mut nodes = SingleNodes::new();
        nodes.sum_update([0, 0], 1.0).unwrap();
        nodes
    }

    #[test]
    fn forward_normalizes_to_one() {
        let dag = FlatDag::uniform_self_loop(1, 2);
        let gl = FixtureGl::homref(1, 1);
        let (level, _child) = SingleBaumLevel::forward(&seed_root(), &dag, &gl, 0, 0).unwrap();
        assert!((level.fwd_total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn homref_calls_concentrate_posterior_on_genotype_zero() {
        let dag = FlatDag::uniform_self_loop(1, 2);
        let gl = FixtureGl::homref(1, 1);
        let (mut level, child) = SingleBaumLevel::forward(&seed_root(), &dag, &gl, 0, 0).unwrap();
        let bwd_seed = level.seed_final_backward();
        assert_eq!(bwd_seed.len(), child.len());
        let mut posterior = vec![0.0; 3];
        level.backward(&bwd_seed, &mut posterior).unwrap();
        assert!(posterior[0] >= 1.0 - 1e-9);
        assert!(posterior[1] <= 1e-9);
        assert!(posterior[2] <= 1e-9);
        assert!((level.bwd_total() - 1.0).abs() < 1e-12);
    }
}
