mod byte_array;
mod bitset;
mod ingest;
mod low_maf;
mod seq_coded;
mod selection;

pub use byte_array::ByteArrayEmission;
pub use bitset::BitSetEmission;
pub use ingest::ingest_record;
pub use low_maf::{LowMafDiallelicEmission, LowMafMultiallelicEmission};
pub use seq_coded::SeqCodedEmission;
pub use selection::{select_encoding, Encoding};

use crate::error::EmissionError;

/// Shared read interface over the five reference-panel storage encodings.
///
/// `allele(hap)` is the primitive every other accessor is defined in terms
/// of. Implementations only need `n_alleles`, `n_haplotypes` and `allele`;
/// the sample-indexed and minor-index accessors have default
/// implementations wired through those three.
pub trait Emission {
    fn n_alleles(&self) -> usize;

    fn n_haplotypes(&self) -> usize;

    /// # Errors
    /// [`EmissionError::HaplotypeOutOfRange`] if `hap >= n_haplotypes()`.
    fn allele(&self, hap: usize) -> Result<usize, EmissionError>;

    /// # Errors
    /// Propagates [`Emission::allele`].
    fn allele1(&self, sample: usize) -> Result<usize, EmissionError> {
        self.allele(2 * sample)
    }

    /// # Errors
    /// Propagates [`Emission::allele`].
    fn allele2(&self, sample: usize) -> Result<usize, EmissionError> {
        self.allele(2 * sample + 1)
    }

    fn is_phased(&self, _sample: usize) -> bool {
        true
    }

    fn is_ref_data(&self) -> bool {
        true
    }

    /// `None` for encodings that don't track a distinguished major allele.
    fn major_allele(&self) -> Option<usize> {
        None
    }

    /// Number of haplotypes carrying `allele`, when the encoding tracks it.
    fn allele_count(&self, _allele: usize) -> Option<usize> {
        None
    }

    /// The `copy`-th (0-based) haplotype index carrying `allele`, in sorted
    /// order, when the encoding tracks it.
    fn hap_index(&self, _allele: usize, _copy: usize) -> Option<usize> {
        None
    }
}

pub(crate) fn check_haplotype(hap: usize, n_haplotypes: usize) -> Result<(), EmissionError> {
    if hap >= n_haplotypes {
        return Err(EmissionError::HaplotypeOutOfRange(hap, n_haplotypes));
    }
    Ok(())
}
