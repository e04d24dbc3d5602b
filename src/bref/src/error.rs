use thiserror::Error;

pub const MAGIC: i32 = 223_579_146;

#[derive(Error, Debug)]
pub enum BrefError {
    #[error("bad magic number {0}, expected {MAGIC}")]
    BadMagic(i32),

    #[error("block declares n_records = {0}, expected > 0")]
    EmptyBlock(i32),

    #[error("n_seq byte {0} decodes out of the valid [1,255] range")]
    BadNSeq(i32),

    #[error("unknown coding_flag {0}, expected 0 (sequence-coded) or 1 (minor-index)")]
    BadCodingFlag(i8),

    #[error("record allele_code {0} is not a valid SNV permutation/length encoding")]
    BadAlleleCode(i8),

    #[error("I/O error while reading/writing a BREF stream")]
    Io(#[from] std::io::Error),

    #[error("string field is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
