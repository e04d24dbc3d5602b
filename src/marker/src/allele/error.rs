use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlleleParseError {
    #[error("{0:?} is not a valid SNV nucleotide (expected one of A, C, G, T, N)")]
    InvalidNucleotide(char),

    #[error("Symbolic allele {0:?} must be enclosed in angle brackets and free of whitespace/comma")]
    InvalidSymbolic(String),

    #[error("Empty allele token")]
    Empty,

    #[error("{0:?} is not a valid allele: expected a single SNV base, a `<...>` symbolic token, or `*`")]
    InvalidToken(String),
}
