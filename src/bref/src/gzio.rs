use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use gzp::deflate::Bgzf;
use gzp::par::compress::ParCompressBuilder;
use gzp::par::decompress::ParDecompressBuilder;

use crate::codec::{decode_file, encode_file};
use crate::error::BrefError;
use crate::frame::BrefFile;

/// Write `file` to `path` as a BGZF (RFC 1952)-wrapped BREF stream,
/// compressing across `threads` worker threads (`0` lets `gzp` choose).
///
/// # Errors
/// Propagates I/O errors from creating `path` or from the underlying
/// parallel compressor.
pub fn write_bref_gz(path: &Path, file: &BrefFile, threads: usize) -> Result<(), BrefError> {
    let sink = BufWriter::new(File::create(path)?);
    let mut writer = ParCompressBuilder::<Bgzf>::new().num_threads(threads).from_writer(sink);
    encode_file(&mut writer, file)?;
    writer
        .finish()
        .map_err(|e| BrefError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
    Ok(())
}

/// Read a BGZF-wrapped BREF stream from `path`, decompressing across
/// `threads` worker threads (`0` lets `gzp` choose).
///
/// # Errors
/// Propagates I/O errors from opening `path`, plus any [`BrefError`] raised
/// while parsing the decompressed framing.
pub fn read_bref_gz(path: &Path, threads: usize) -> Result<BrefFile, BrefError> {
    let source = File::open(path)?;
    let mut reader = BufReader::new(ParDecompressBuilder::<Bgzf>::new().maybe_num_threads(threads).maybe_par_from_reader(source));
    decode_file(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{AlleleRepr, Block, Coding, Record};
    use marker::{Allele, Nucleotide};

    #[test]
    fn round_trips_through_a_temp_file() {
        let file = BrefFile {
            version: "beagle-core-0.1".to_string(),
            sample_ids: vec!["NA001".to_string()],
            blocks: vec![Block {
                chrom: "22".to_string(),
                n_seq: 1,
                hap_to_seq: vec![0, 0],
                records: vec![Record {
                    pos: 100,
                    ids: vec![],
                    alleles: AlleleRepr::Permuted {
                        perm_index: crate::permutation::encode_allele_permutation(&[
                            Allele::Snv(Nucleotide::A),
                            Allele::Snv(Nucleotide::G),
                        ])
                        .unwrap()
                        .0,
                        n_alleles: 2,
                    },
                    coding: Coding::SeqCoded { seq_to_allele: vec![0] },
                }],
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.bref.gz");
        write_bref_gz(&path, &file, 1).unwrap();
        let decoded = read_bref_gz(&path, 1).unwrap();
        assert_eq!(decoded.sample_ids, file.sample_ids);
        assert_eq!(decoded.blocks[0].records[0].pos, 100);
    }
}
