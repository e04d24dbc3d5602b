//! Leveled-DAG hidden Markov model: forward-backward and stochastic
//! traceback sampling over a reference haplotype DAG, for singleton,
//! duo, trio, and haploid sample configurations.

pub mod dag;
pub mod duo_baum;
pub mod duo_level;
pub mod error;
pub mod gl;
pub mod hap_baum;
pub mod hap_level;
pub mod hap_pair;
pub mod level_core;
pub mod node_table;
pub mod posterior;
pub mod single_baum;
pub mod single_level;
pub mod trio_baum;
pub mod trio_level;

pub use dag::{Dag, Edge, FlatDag};
pub use duo_baum::DuoBaum;
pub use duo_level::{DuoBaumLevel, DuoSamples};
pub use error::HmmError;
pub use gl::{Al, Gl};
pub use hap_baum::HapBaum;
pub use hap_level::HapBaumLevel;
pub use hap_pair::{HapPair, HapSingle};
pub use node_table::{DuoNodes, HapNodes, NodeTable, SingleNodes, TrioNodes};
pub use posterior::GenotypeValues;
pub use single_baum::SingleBaum;
pub use single_level::SingleBaumLevel;
pub use trio_baum::TrioBaum;
pub use trio_level::{TrioBaumLevel, TrioSamples};
