pub mod error;
pub use error::EmissionError;

pub mod emission;
pub use emission::{
    ingest_record, select_encoding, BitSetEmission, ByteArrayEmission, Emission, Encoding, LowMafDiallelicEmission,
    LowMafMultiallelicEmission, SeqCodedEmission,
};

pub mod compressor;
pub use compressor::{FlushedMarker, FlushedRun, SequenceCompressor, DEFAULT_MAX_NSEQ};
