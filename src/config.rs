use serde::{Deserialize, Serialize};

/// Sliding-window tunables: how many markers a window targets and how
/// many trailing markers of the previous window it retains, per
/// [`window::VcfWindow::advance`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowConfig {
    pub target_size: usize,
    pub overlap: usize,
}

/// BREF I/O tunables: the BGZF worker-thread count passed through to
/// [`bref::read_bref_gz`]/[`bref::write_bref_gz`] (`0` lets the
/// compressor choose).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BrefConfig {
    pub threads: usize,
}

/// Baum-driver tunables: the PRNG seed, how many haplotype copies to
/// sample per call, and whether to pay for genotype-posterior
/// accumulation alongside sampling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaumConfig {
    pub seed: u64,
    pub n_copies: usize,
    pub collect_posteriors: bool,
}

impl Default for BaumConfig {
    fn default() -> Self {
        Self { seed: 0, n_copies: 1, collect_posteriors: true }
    }
}
