pub mod error;
pub use error::{BrefError, MAGIC};

mod permutation;
pub use permutation::{decode_allele_permutation, encode_allele_permutation, pack_allele_code, unpack_allele_code};

pub mod frame;
pub use frame::{AlleleRepr, Block, BrefFile, Coding, MinorEntry, Record};

mod codec;
pub use codec::{decode_file, encode_file};

pub mod pipeline;
pub use pipeline::{spawn_line_reader, StopFlag};

mod gzio;
pub use gzio::{read_bref_gz, write_bref_gz};
