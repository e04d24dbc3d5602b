pub mod coordinate;
pub use coordinate::{ChromId, ChromTable, ChromTableError, Position};

pub mod allele;
pub use allele::{Allele, AlleleParseError, Nucleotide};

mod marker;
pub use marker::{Marker, MarkerFormatError};

mod markers;
pub use markers::{bits_for_alleles, MarkerOrderError, Markers};
