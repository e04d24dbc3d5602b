mod error;
pub use error::AlleleParseError;

use std::{fmt, sync::Arc};

/// A single-character SNV nucleotide, normalized to uppercase on ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    N,
}

impl Nucleotide {
    /// Reverse-complement: A<->T, C<->G, N is its own complement.
    #[must_use]
    pub fn complement(self) -> Self {
        match self {
            Self::A => Self::T,
            Self::T => Self::A,
            Self::C => Self::G,
            Self::G => Self::C,
            Self::N => Self::N,
        }
    }
}

impl TryFrom<char> for Nucleotide {
    type Error = AlleleParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'C' => Ok(Self::C),
            'G' => Ok(Self::G),
            'T' => Ok(Self::T),
            'N' => Ok(Self::N),
            other => Err(AlleleParseError::InvalidNucleotide(other)),
        }
    }
}

impl From<Nucleotide> for char {
    fn from(value: Nucleotide) -> Self {
        match value {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
            Nucleotide::N => 'N',
        }
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// A single allele token as it appears in a marker's allele list.
///
/// Index 0 in a [`crate::Marker`]'s allele list is always the reference
/// allele; this type only describes the *value*, not its positional role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Allele {
    /// A single-nucleotide variant: one of {A, C, G, T, N}.
    Snv(Nucleotide),
    /// A symbolic alt allele, e.g. `<DEL>`, `<INS:ME>`. Stored without the
    /// enclosing angle brackets.
    Symbolic(Arc<str>),
    /// The missing-allele token `*` (an overlapping deletion, in VCF terms).
    Missing,
}

impl Allele {
    /// Parse a single REF/ALT token (already uppercased).
    ///
    /// # Errors
    /// Returns [`AlleleParseError`] if the token is empty, not a single
    /// recognized nucleotide, and not a well-formed `<...>` symbolic token.
    pub fn parse(token: &str) -> Result<Self, AlleleParseError> {
        if token.is_empty() {
            return Err(AlleleParseError::Empty);
        }
        if token == "*" {
            return Ok(Self::Missing);
        }
        if let Some(inner) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            if inner.is_empty() || inner.chars().any(|c| c.is_whitespace() || c == ',') {
                return Err(AlleleParseError::InvalidSymbolic(token.to_string()));
            }
            return Ok(Self::Symbolic(Arc::from(inner)));
        }
        if token.len() == 1 {
            return Ok(Self::Snv(Nucleotide::try_from(
                token.chars().next().expect("checked len == 1"),
            )?));
        }
        Err(AlleleParseError::InvalidToken(token.to_string()))
    }

    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// Reverse-complement this allele. Symbolic alleles and the missing
    /// token are identity under strand flip.
    #[must_use]
    pub fn strand_flip(&self) -> Self {
        match self {
            Self::Snv(n) => Self::Snv(n.complement()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snv(n) => write!(f, "{n}"),
            Self::Symbolic(s) => write!(f, "<{s}>"),
            Self::Missing => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_snv_is_case_insensitive_at_nucleotide_level() {
        assert_eq!(Allele::parse("A").unwrap(), Allele::Snv(Nucleotide::A));
        assert_eq!(
            Nucleotide::try_from('a').unwrap(),
            Nucleotide::A
        );
    }

    #[test]
    fn parse_symbolic() {
        let allele = Allele::parse("<DEL>").unwrap();
        assert_eq!(allele, Allele::Symbolic(Arc::from("DEL")));
        assert!(allele.is_symbolic());
    }

    #[test]
    fn parse_missing() {
        assert_eq!(Allele::parse("*").unwrap(), Allele::Missing);
    }

    #[test]
    fn rejects_malformed_symbolic() {
        assert!(Allele::parse("<DEL ETE>").is_err());
        assert!(Allele::parse("<>").is_err());
    }

    #[test]
    fn rejects_unbracketed_multichar_token() {
        let err = Allele::parse("AT").unwrap_err();
        assert!(matches!(err, AlleleParseError::InvalidToken(t) if t == "AT"));
    }

    #[test]
    fn strand_flip_is_involution_on_non_symbolic() {
        for token in ["A", "C", "G", "T", "N", "*"] {
            let allele = Allele::parse(token).unwrap();
            assert_eq!(allele.strand_flip().strand_flip(), allele);
        }
    }

    #[test]
    fn strand_flip_pairs() {
        assert_eq!(Allele::parse("A").unwrap().strand_flip(), Allele::parse("T").unwrap());
        assert_eq!(Allele::parse("C").unwrap().strand_flip(), Allele::parse("G").unwrap());
        assert_eq!(Allele::parse("N").unwrap().strand_flip(), Allele::parse("N").unwrap());
    }

    #[test]
    fn strand_flip_is_identity_on_symbolic() {
        let allele = Allele::parse("<DEL>").unwrap();
        assert_eq!(allele.strand_flip(), allele);
    }
}
