use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChromTableError {
    #[error("Chromosome name {0:?} contains whitespace or a ':' character")]
    InvalidName(String),

    #[error("Chromosome id {0:?} is not registered in this table")]
    UnknownId(u32),
}
