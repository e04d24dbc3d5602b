use marker::Allele;

/// A fully-parsed (or not-yet-serialized) BREF file.
pub struct BrefFile {
    pub version: String,
    pub sample_ids: Vec<String>,
    pub blocks: Vec<Block>,
}

/// One chromosome-bound run of records sharing a `hap_to_seq` map.
pub struct Block {
    pub chrom: String,
    /// Number of distinct active sequences, in `[1, 255]`.
    pub n_seq: u8,
    /// Length `2 * n_samples`; each entry is a sequence id in `[0, n_seq)`.
    pub hap_to_seq: Vec<u8>,
    pub records: Vec<Record>,
}

pub struct Record {
    pub pos: i32,
    /// At most 255 ids.
    pub ids: Vec<String>,
    pub alleles: AlleleRepr,
    pub coding: Coding,
}

/// How a record's allele list is framed on the wire.
pub enum AlleleRepr {
    /// `allele_code == -1`: arbitrary allele list, any symbol set.
    Explicit { alleles: Vec<Allele>, end: i32 },
    /// A pure-SNV, `<=4`-allele record packed as an `(A,C,G,T)`
    /// permutation index.
    Permuted { perm_index: u8, n_alleles: u8 },
}

/// How a record's per-haplotype allele assignment is framed on the wire.
pub enum Coding {
    /// `coding_flag == 0`: one allele per active sequence.
    SeqCoded { seq_to_allele: Vec<u32> },
    /// `coding_flag == 1`: one entry per allele, `cnt == -1` marking the
    /// implicit major.
    MinorIndex { entries: Vec<MinorEntry> },
}

pub struct MinorEntry {
    pub cnt: i32,
    pub haps: Vec<i32>,
}
