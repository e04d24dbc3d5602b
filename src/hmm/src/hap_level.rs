use crate::dag::Dag;
use crate::error::HmmError;
use crate::gl::Al;
use crate::level_core::clamp_underflow;
use crate::node_table::HapNodes;

struct State {
    parent: [u32; 1],
    child: [u32; 1],
    symbol: u8,
    tp: f64,
    ep: f64,
    fwd: f64,
    bwd: f64,
}

#[derive(Clone, Copy)]
pub struct LiveState {
    pub parent: [u32; 1],
    pub child: [u32; 1],
    pub symbol: u8,
    pub tp: f64,
    pub ep: f64,
    pub fwd: f64,
}

/// One marker level of the haploid Baum recursion: a single DAG edge per
/// state, emission from an [`Al`] allele-likelihood source.
pub struct HapBaumLevel {
    states: Vec<State>,
    marker: usize,
    hap: usize,
    fwd_sum: f64,
    bwd_sum: f64,
}

impl HapBaumLevel {
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
        self.states.iter().map(|s| LiveState { parent: s.parent, child: s.child, symbol: s.symbol, tp: s.tp, ep: s.ep, fwd: s.fwd })
    }

    /// # Errors
    /// [`HmmError::NoLiveStates`] if no out-edge has strictly positive
    /// emission.
    pub fn forward(parent_nodes: &HapNodes, dag: &dyn Dag, al: &dyn Al, marker: usize, hap: usize) -> Result<(Self, HapNodes), HmmError> {
        let mut states = Vec::new();
        let mut fwd_sum = 0.0;

        for (parent, parent_value) in parent_nodes.enumerate() {
            for edge in dag.out_edges(marker, parent[0]) {
                let ep = al.al(marker, hap, edge.symbol as usize);
                if ep <= 0.0 {
                    continue;
                }
                let tp = edge.prob;
                let raw = parent_value * ep * tp;
                let fwd = clamp_underflow(raw, parent_value);
                fwd_sum += fwd;
                states.push(State { parent, child: [edge.child], symbol: edge.symbol, tp, ep, fwd, bwd: 0.0 });
            }
        }

        if states.is_empty() {
            return Err(HmmError::NoLiveStates(marker));
        }

        let mut child_nodes = HapNodes::new();
        for state in &mut states {
            state.fwd /= fwd_sum;
            child_nodes.sum_update(state.child, state.fwd)?;
        }

        Ok((Self { states, marker, hap, fwd_sum, bwd_sum: 0.0 }, child_nodes))
    }

    #[must_use]
    pub fn seed_final_backward(&self) -> HapNodes {
        let mut nodes = HapNodes::new();
        for state in &self.states {
            nodes.max_update(state.child, 1.0).expect("1.0 is valid");
        }
        nodes
    }

    /// # Errors
    /// See [`crate::single_level::SingleBaumLevel::backward`].
    pub fn backward(&mut self, next_nodes: &HapNodes, posterior: &mut [f64]) -> Result<HapNodes, HmmError> {
        let mut bwd_sum = 0.0;
        for state in &mut self.states {
            state.bwd = next_nodes.value(&state.child);
            bwd_sum += state.bwd;
        }
        if bwd_sum <= 0.0 {
            return Err(HmmError::NoLiveStates(self.marker));
        }
        self.bwd_sum = bwd_sum;

        let mut allele_sum = 0.0;
        for state in &mut self.states {
            state.bwd /= bwd_sum;
            let bin = state.symbol as usize;
            if bin >= posterior.len() {
                return Err(HmmError::PosteriorLengthMismatch { expected: bin + 1, actual: posterior.len() });
            }
            let state_prob = state.fwd * state.bwd;
            posterior[bin] += state_prob;
            allele_sum += state_prob;
        }

        let mut parent_nodes = HapNodes::new();
        for state in &self.states {
            let raw = state.bwd * state.tp * state.ep;
            let prop = clamp_underflow(raw, state.bwd);
            parent_nodes.sum_update(state.parent, prop)?;
        }

        if allele_sum > 0.0 {
            for p in posterior.iter_mut() {
                *p /= allele_sum;
            }
        }

        let _ = self.hap;
        Ok(parent_nodes)
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

    fn fixture() -> FixtureAl {
        let mut chroms = marker::ChromTable::new();
        let chrom = chroms.intern("1").unwrap();
        let m = Marker::new(
            chrom,
            marker::Position(100),
            vec![],
            vec![marker::Allele::Snv(marker::Nucleotide::A), marker::Allele::Snv(marker::Nucleotide::G)].into(),
            -1,
        )
        .unwrap();
        FixtureAl { markers: vec![m], n_hap: 2, favored: 0 }
    }

    fn seed_root() -> HapNodes {
        let mut nodes = HapNodes::new();
        nodes.sum_update([0], 1.0).unwrap();
        nodes
    }

    #[test]
    fn favored_allele_gets_all_posterior_mass() {
        let dag = FlatDag::uniform_self_loop(1, 2);
        let al = fixture();
        let (mut level, child) = HapBaumLevel::forward(&seed_root(), &dag, &al, 0, 0).unwrap();
        let seed = level.seed_final_backward();
        assert_eq!(seed.len(), child.len());
        let mut posterior = vec![0.0; 2];
        level.backward(&seed, &mut posterior).unwrap();
        assert!(posterior[0] >= 1.0 - 1e-9);
        assert!(posterior[1] <= 1e-9);
    }
}
