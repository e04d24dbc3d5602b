use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use marker::Allele;

use crate::error::{BrefError, MAGIC};
use crate::frame::{AlleleRepr, Block, BrefFile, Coding, MinorEntry, Record};
use crate::permutation::{decode_allele_permutation, encode_allele_permutation, pack_allele_code, unpack_allele_code};

const EOF_MARKER: i32 = 0;

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<(), BrefError> {
    w.write_i32::<LittleEndian>(s.len() as i32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(r: &mut R) -> Result<String, BrefError> {
    let len = r.read_i32::<LittleEndian>()?;
    let mut buf = vec![0u8; len.max(0) as usize];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn write_biased<W: Write>(w: &mut W, value: i32) -> Result<(), BrefError> {
    w.write_i8((value - 128) as i8)?;
    Ok(())
}

fn read_biased<R: Read>(r: &mut R) -> Result<i32, BrefError> {
    Ok(i32::from(r.read_i8()?) + 128)
}

fn n_alleles_of(alleles: &AlleleRepr) -> usize {
    match alleles {
        AlleleRepr::Explicit { alleles, .. } => alleles.len(),
        AlleleRepr::Permuted { n_alleles, .. } => *n_alleles as usize,
    }
}

/// Serialize `file` as a BREF byte stream onto `writer` (not gzip-wrapped;
/// callers stream this through a `gzp` writer for the on-disk `.bref`
/// format).
///
/// # Errors
/// Propagates any I/O error from `writer`.
pub fn encode_file<W: Write>(writer: &mut W, file: &BrefFile) -> Result<(), BrefError> {
    writer.write_i32::<LittleEndian>(MAGIC)?;
    write_str(writer, &file.version)?;
    writer.write_i32::<LittleEndian>(file.sample_ids.len() as i32)?;
    for id in &file.sample_ids {
        write_str(writer, id)?;
    }
    for block in &file.blocks {
        encode_block(writer, block)?;
    }
    writer.write_i32::<LittleEndian>(EOF_MARKER)?;
    Ok(())
}

fn encode_block<W: Write>(writer: &mut W, block: &Block) -> Result<(), BrefError> {
    writer.write_i32::<LittleEndian>(block.records.len() as i32)?;
    write_str(writer, &block.chrom)?;
    write_biased(writer, i32::from(block.n_seq))?;
    for &hap in &block.hap_to_seq {
        write_biased(writer, i32::from(hap))?;
    }
    for record in &block.records {
        encode_record(writer, record)?;
    }
    Ok(())
}

fn encode_record<W: Write>(writer: &mut W, record: &Record) -> Result<(), BrefError> {
    writer.write_i32::<LittleEndian>(record.pos)?;
    write_biased(writer, record.ids.len() as i32)?;
    for id in &record.ids {
        write_str(writer, id)?;
    }

    match &record.alleles {
        AlleleRepr::Explicit { alleles, end } => {
            writer.write_i8(-1)?;
            writer.write_i32::<LittleEndian>(alleles.len() as i32)?;
            for allele in alleles {
                write_str(writer, &allele.to_string())?;
            }
            writer.write_i32::<LittleEndian>(*end)?;
        }
        AlleleRepr::Permuted { perm_index, n_alleles } => {
            writer.write_i8(pack_allele_code(*perm_index, *n_alleles))?;
        }
    }

    match &record.coding {
        Coding::SeqCoded { seq_to_allele } => {
            writer.write_i8(0)?;
            let n_alleles = n_alleles_of(&record.alleles);
            if n_alleles <= 256 {
                for &a in seq_to_allele {
                    write_biased(writer, a as i32)?;
                }
            } else {
                for &a in seq_to_allele {
                    writer.write_i32::<LittleEndian>(a as i32)?;
                }
            }
        }
        Coding::MinorIndex { entries } => {
            writer.write_i8(1)?;
            for entry in entries {
                writer.write_i32::<LittleEndian>(entry.cnt)?;
                if entry.cnt != -1 {
                    for &h in &entry.haps {
                        writer.write_i32::<LittleEndian>(h)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Parse a BREF byte stream from `reader` (already gzip-decompressed).
///
/// # Errors
/// [`BrefError::BadMagic`] if the leading magic number doesn't match;
/// [`BrefError::BadCodingFlag`]/[`BrefError::EmptyBlock`] on malformed
/// framing; I/O and UTF-8 errors propagate as-is.
pub fn decode_file<R: Read>(reader: &mut R) -> Result<BrefFile, BrefError> {
    let magic = reader.read_i32::<LittleEndian>()?;
    if magic != MAGIC {
        return Err(BrefError::BadMagic(magic));
    }
    let version = read_str(reader)?;
    let n_samples = reader.read_i32::<LittleEndian>()?;
    let mut sample_ids = Vec::with_capacity(n_samples.max(0) as usize);
    for _ in 0..n_samples {
        sample_ids.push(read_str(reader)?);
    }

    let mut blocks = Vec::new();
    loop {
        let n_records = reader.read_i32::<LittleEndian>()?;
        if n_records == EOF_MARKER {
            break;
        }
        if n_records <= 0 {
            return Err(BrefError::EmptyBlock(n_records));
        }
        blocks.push(decode_block(reader, n_records as usize, sample_ids.len())?);
    }

    Ok(BrefFile { version, sample_ids, blocks })
}

fn decode_block<R: Read>(reader: &mut R, n_records: usize, n_samples: usize) -> Result<Block, BrefError> {
    let chrom = read_str(reader)?;
    let n_seq_raw = read_biased(reader)?;
    if !(1..=255).contains(&n_seq_raw) {
        return Err(BrefError::BadNSeq(n_seq_raw));
    }
    let n_seq = n_seq_raw as u8;

    let mut hap_to_seq = Vec::with_capacity(2 * n_samples);
    for _ in 0..2 * n_samples {
        hap_to_seq.push(read_biased(reader)? as u8);
    }

    let mut records = Vec::with_capacity(n_records);
    for _ in 0..n_records {
        records.push(decode_record(reader, n_seq)?);
    }

    Ok(Block { chrom, n_seq, hap_to_seq, records })
}

fn decode_record<R: Read>(reader: &mut R, n_seq: u8) -> Result<Record, BrefError> {
    let pos = reader.read_i32::<LittleEndian>()?;
    let n_ids = read_biased(reader)?;
    let mut ids = Vec::with_capacity(n_ids as usize);
    for _ in 0..n_ids {
        ids.push(read_str(reader)?);
    }

    let allele_code = reader.read_i8()?;
    let (alleles, n_alleles) = if allele_code == -1 {
        let n_alleles = reader.read_i32::<LittleEndian>()?;
        let mut parsed = Vec::with_capacity(n_alleles.max(0) as usize);
        for _ in 0..n_alleles {
            let token = read_str(reader)?;
            parsed.push(Allele::parse(&token).map_err(|_| BrefError::BadAlleleCode(allele_code))?);
        }
        let end = reader.read_i32::<LittleEndian>()?;
        (AlleleRepr::Explicit { alleles: parsed, end }, n_alleles as usize)
    } else {
        let (perm_index, n_alleles) = unpack_allele_code(allele_code);
        (AlleleRepr::Permuted { perm_index, n_alleles }, n_alleles as usize)
    };

    let coding_flag = reader.read_i8()?;
    let coding = match coding_flag {
        0 => {
            let mut seq_to_allele = Vec::with_capacity(n_seq as usize);
            if n_alleles <= 256 {
                for _ in 0..n_seq {
                    seq_to_allele.push(read_biased(reader)? as u32);
                }
            } else {
                for _ in 0..n_seq {
                    seq_to_allele.push(reader.read_i32::<LittleEndian>()? as u32);
                }
            }
            Coding::SeqCoded { seq_to_allele }
        }
        1 => {
            let mut entries = Vec::with_capacity(n_alleles);
            for _ in 0..n_alleles {
                let cnt = reader.read_i32::<LittleEndian>()?;
                let haps = if cnt == -1 {
                    Vec::new()
                } else {
                    let mut haps = Vec::with_capacity(cnt.max(0) as usize);
                    for _ in 0..cnt {
                        haps.push(reader.read_i32::<LittleEndian>()?);
                    }
                    haps
                };
                entries.push(MinorEntry { cnt, haps });
            }
            Coding::MinorIndex { entries }
        }
        other => return Err(BrefError::BadCodingFlag(other)),
    };

    Ok(Record { pos, ids, alleles, coding })
}
