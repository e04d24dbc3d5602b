use crate::dag::Dag;
use crate::error::HmmError;
use crate::gl::Gl;
use crate::level_core::{clamp_underflow, genotype_index, grown_capacity};
use crate::node_table::TrioNodes;

/// The three samples bound to a trio level: father, mother, child.
#[derive(Clone, Copy)]
pub struct TrioSamples {
    pub father: usize,
    pub mother: usize,
    pub child: usize,
}

struct State {
    parent_tuple: [u32; 4],
    child_tuple: [u32; 4],
    symbols: [u8; 4],
    tp: f64,
    ep: f64,
    fwd: f64,
    bwd: f64,
}

#[derive(Clone, Copy)]
pub struct LiveState {
    pub parent_tuple: [u32; 4],
    pub child_tuple: [u32; 4],
    pub symbols: [u8; 4],
    pub tp: f64,
    pub ep: f64,
    pub fwd: f64,
}

/// One marker level of the parent-parent-offspring trio Baum recursion.
///
/// Edge tuple `(A1, A2, B1, B2)`: `A1`/`A2` are the father's haplotypes,
/// `B1`/`B2` the mother's; the offspring inherits `(A1, B1)`. The father's
/// emission uses `(A1, A2)`, the mother's `(B1, B2)`, the offspring's
/// `(A1, B1)`. Posterior mass is accumulated on the offspring's genotype.
pub struct TrioBaumLevel {
    states: Vec<State>,
    marker: usize,
    samples: TrioSamples,
    fwd_sum: f64,
    bwd_sum: f64,
}

impl TrioBaumLevel {
    #[must_use]
    pub fn marker(&self) -> usize {
        self.marker
    }

    #[must_use]
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn fwd_total(&self) -> f64 {
        self.states.iter().map(|s| s.fwd).sum()
    }

    /// The pre-normalization forward sum, used to recover a state's raw
    /// (un-normalized) forward mass for threshold-based sampling.
    #[must_use]
    pub fn fwd_sum(&self) -> f64 {
        self.fwd_sum
    }

    pub fn live_states(&self) -> impl Iterator<Item = LiveState> + '_ {
        self.states
            .iter()
            .map(|s| LiveState { parent_tuple: s.parent_tuple, child_tuple: s.child_tuple, symbols: s.symbols, tp: s.tp, ep: s.ep, fwd: s.fwd })
    }

    /// # Errors
    /// [`HmmError::NoLiveStates`] if no candidate edge tuple has strictly
    /// positive emission.
    pub fn forward(
        parent_nodes: &TrioNodes,
        dag: &dyn Dag,
        gl: &dyn Gl,
        marker: usize,
        samples: TrioSamples,
    ) -> Result<(Self, TrioNodes), HmmError> {
        let mut states = Vec::with_capacity(grown_capacity(0, parent_nodes.len()));
        let mut fwd_sum = 0.0;

        for (parent_tuple, parent_value) in parent_nodes.enumerate() {
            let a1_edges = dag.out_edges(marker, parent_tuple[0]);
            let a2_edges = dag.out_edges(marker, parent_tuple[1]);
            let b1_edges = dag.out_edges(marker, parent_tuple[2]);
            let b2_edges = dag.out_edges(marker, parent_tuple[3]);

            for a1 in a1_edges {
                for a2 in a2_edges {
                    let father_gl = gl.gl(marker, samples.father, a1.symbol as usize, a2.symbol as usize);
                    if father_gl <= 0.0 {
                        continue;
                    }
                    for b1 in b1_edges {
                        let child_gl = gl.gl(marker, samples.child, a1.symbol as usize, b1.symbol as usize);
                        if child_gl <= 0.0 {
                            continue;
                        }
                        for b2 in b2_edges {
                            let mother_gl = gl.gl(marker, samples.mother, b1.symbol as usize, b2.symbol as usize);
                            if mother_gl <= 0.0 {
                                continue;
                            }
                            let ep = father_gl * mother_gl * child_gl;
                            let tp = a1.prob * a2.prob * b1.prob * b2.prob;
                            let raw = parent_value * ep * tp;
                            let fwd = clamp_underflow(raw, parent_value);
                            fwd_sum += fwd;
                            if states.len() == states.capacity() {
                                states.reserve(grown_capacity(states.capacity(), states.len() + 1) - states.capacity());
                            }
                            states.push(State {
                                parent_tuple,
                                child_tuple: [a1.child, a2.child, b1.child, b2.child],
                                symbols: [a1.symbol, a2.symbol, b1.symbol, b2.symbol],
                                tp,
                                ep,
                                fwd,
                                bwd: 0.0,
                            });
                        }
                    }
                }
            }
        }

        if states.is_empty() {
            return Err(HmmError::NoLiveStates(marker));
        }

        let mut child_nodes = TrioNodes::new();
        for state in &mut states {
            state.fwd /= fwd_sum;
            child_nodes.sum_update(state.child_tuple, state.fwd)?;
        }

        Ok((Self { states, marker, samples, fwd_sum, bwd_sum: 0.0 }, child_nodes))
    }

    #[must_use]
    pub fn seed_final_backward(&self) -> TrioNodes {
        let mut nodes = TrioNodes::new();
        for state in &self.states {
            nodes.max_update(state.child_tuple, 1.0).expect("1.0 is valid");
        }
        nodes
    }

    /// # Errors
    /// See [`crate::single_level::SingleBaumLevel::backward`].
    pub fn backward(&mut self, next_nodes: &TrioNodes, posterior: &mut [f64]) -> Result<TrioNodes, HmmError> {
        let mut bwd_sum = 0.0;
        for state in &mut self.states {
            state.bwd = next_nodes.value(&state.child_tuple);
            bwd_sum += state.bwd;
        }
        if bwd_sum <= 0.0 {
            return Err(HmmError::NoLiveStates(self.marker));
        }
        self.bwd_sum = bwd_sum;

        let mut gt_sum = 0.0;
        for state in &mut self.states {
            state.bwd /= bwd_sum;
            // Posterior on the offspring's called genotype: (A1, B1).
            let bin = genotype_index(state.symbols[0] as usize, state.symbols[2] as usize);
            if bin >= posterior.len() {
                return Err(HmmError::PosteriorLengthMismatch { expected: bin + 1, actual: posterior.len() });
            }
            let state_prob = state.fwd * state.bwd;
            posterior[bin] += state_prob;
            gt_sum += state_prob;
        }

        let mut parent_nodes = TrioNodes::new();
        for state in &self.states {
            let raw = state.bwd * state.tp * state.ep;
            let prop = clamp_underflow(raw, state.bwd);
            parent_nodes.sum_update(state.parent_tuple, prop)?;
        }

        if gt_sum > 0.0 {
            for p in posterior.iter_mut() {
                *p /= gt_sum;
            }
        }

        let _ = self.samples;
        Ok(parent_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::FlatDag;
    use crate::gl::fixture::FixtureGl;

    fn seed_root() -> TrioNodes {
        let mut nodes = TrioNodes::new();
        nodes.sum_update([0, 0, 0, 0], 1.0).unwrap();
        nodes
    }

    #[test]
    fn forward_normalizes_to_one() {
        let dag = FlatDag::uniform_self_loop(1, 2);
        let gl = FixtureGl::homref(1, 3);
        let samples = TrioSamples { father: 0, mother: 1, child: 2 };
        let (level, _child) = TrioBaumLevel::forward(&seed_root(), &dag, &gl, 0, samples).unwrap();
        assert!((level.fwd_total() - 1.0).abs() < 1e-12);
    }
}
