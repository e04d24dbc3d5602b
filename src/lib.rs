//! Statistical phasing and genotype imputation core: sequence-coded
//! reference panels, sliding marker windows, a leveled-DAG HMM, and the
//! BREF binary panel codec.
//!
//! No CLI lives here; a thin external driver parses arguments and
//! constructs this crate's inputs, per the core/driver split in the
//! external-interfaces design.

pub mod config;
pub mod logging;

pub use bref;
pub use hmm;
pub use marker;
pub use refpanel;
pub use window;

pub use config::{BaumConfig, BrefConfig, WindowConfig};
