use std::{cmp::Ordering, hash::Hash, sync::Arc};

use thiserror::Error;

use crate::allele::{Allele, AlleleParseError};
use crate::coordinate::{ChromId, ChromTable, ChromTableError, Position};

#[derive(Error, Debug)]
pub enum MarkerFormatError {
    #[error("CHROM field is missing, empty, or contains whitespace/':' : {0:?}")]
    BadChrom(String),

    #[error(transparent)]
    Chrom(#[from] ChromTableError),

    #[error("POS field {0:?} is not a non-negative integer")]
    BadPosition(String),

    #[error(transparent)]
    Allele(#[from] AlleleParseError),

    #[error("expected at least 2 distinct alleles, got {0}")]
    TooFewAlleles(usize),

    #[error("duplicate allele {0} in allele list")]
    DuplicateAllele(Allele),

    #[error("INFO END={0} is before POS={1}")]
    EndBeforePosition(i64, u32),

    #[error("INFO END={0:?} is not a valid integer")]
    BadEnd(String),

    #[error("record has fewer than 5 tab-separated fields: {0:?}")]
    Truncated(String),
}

/// A single variant site.
///
/// Markers are immutable once built: every field is private behind
/// accessors, and the only way to obtain a new one from an existing marker
/// is [`Marker::strand_flip`], which allocates a fresh value.
#[derive(Debug, Clone)]
pub struct Marker {
    chrom: ChromId,
    pos: Position,
    ids: Vec<Arc<str>>,
    alleles: Arc<[Allele]>,
    end: i64,
}

impl Marker {
    /// Build a marker directly from already-validated parts.
    ///
    /// # Errors
    /// Returns [`MarkerFormatError::TooFewAlleles`] or
    /// [`MarkerFormatError::DuplicateAllele`] if `alleles` is malformed, or
    /// [`MarkerFormatError::EndBeforePosition`] if `end >= 0 && end < pos`.
    pub fn new(
        chrom: ChromId,
        pos: Position,
        ids: Vec<Arc<str>>,
        alleles: Arc<[Allele]>,
        end: i64,
    ) -> Result<Self, MarkerFormatError> {
        if alleles.len() < 2 {
            return Err(MarkerFormatError::TooFewAlleles(alleles.len()));
        }
        for (i, a) in alleles.iter().enumerate() {
            if alleles[..i].contains(a) {
                return Err(MarkerFormatError::DuplicateAllele(a.clone()));
            }
        }
        if end >= 0 && (end as u32) < pos.0 {
            return Err(MarkerFormatError::EndBeforePosition(end, pos.0));
        }
        Ok(Self { chrom, pos, ids, alleles, end })
    }

    /// Parse one VCF-like tab-separated data line into a [`Marker`], interning
    /// CHROM into `chroms`.
    ///
    /// Columns CHROM, POS, ID, REF, ALT, QUAL, FILTER, INFO are consulted in
    /// that order (QUAL and FILTER are skipped over, unvalidated); genotype
    /// columns are not this type's concern.
    ///
    /// # Errors
    /// Returns [`MarkerFormatError`] on any malformed field.
    pub fn parse_vcf_record(line: &str, chroms: &mut ChromTable) -> Result<Self, MarkerFormatError> {
        let mut fields = line.split('\t');
        let chrom_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let pos_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let id_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let ref_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let alt_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let _qual_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let _filter_field = fields.next().ok_or_else(|| MarkerFormatError::Truncated(line.to_string()))?;
        let info_field = fields.next().unwrap_or("");

        if chrom_field.is_empty() || chrom_field.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(MarkerFormatError::BadChrom(chrom_field.to_string()));
        }
        let chrom = chroms.intern(chrom_field)?;

        let pos: u32 = pos_field
            .parse()
            .map_err(|_| MarkerFormatError::BadPosition(pos_field.to_string()))?;

        let ids = if id_field == "." || id_field.is_empty() {
            Vec::new()
        } else {
            id_field.split(';').map(Arc::from).collect()
        };

        let mut alleles = Vec::with_capacity(2);
        alleles.push(Allele::parse(ref_field)?);
        for alt in alt_field.split(',') {
            alleles.push(Allele::parse(alt)?);
        }

        let end = parse_end(info_field, pos)?;

        Self::new(chrom, Position(pos), ids, Arc::from(alleles), end)
    }

    #[must_use]
    pub fn chrom(&self) -> ChromId {
        self.chrom
    }

    #[must_use]
    pub fn pos(&self) -> Position {
        self.pos
    }

    #[must_use]
    pub fn ids(&self) -> &[Arc<str>] {
        &self.ids
    }

    #[must_use]
    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    /// `-1` when absent, otherwise `>= pos`.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.end
    }

    #[must_use]
    pub fn n_alleles(&self) -> usize {
        self.alleles.len()
    }

    /// Number of unordered genotypes: `n * (n + 1) / 2`.
    #[must_use]
    pub fn n_genotypes(&self) -> usize {
        let n = self.n_alleles();
        n * (n + 1) / 2
    }

    /// Reverse-complement every non-symbolic allele (A<->T, C<->G, N<->N,
    /// `*`<->`*`); symbolic alleles pass through unchanged.
    #[must_use]
    pub fn strand_flip(&self) -> Self {
        let flipped: Vec<Allele> = self.alleles.iter().map(Allele::strand_flip).collect();
        Self {
            chrom: self.chrom,
            pos: self.pos,
            ids: self.ids.clone(),
            alleles: Arc::from(flipped),
            end: self.end,
        }
    }
}

fn parse_end(info: &str, pos: u32) -> Result<i64, MarkerFormatError> {
    if info.is_empty() || info == "." {
        return Ok(-1);
    }
    for entry in info.split(';') {
        if let Some(value) = entry.strip_prefix("END=") {
            let end: i64 = value.parse().map_err(|_| MarkerFormatError::BadEnd(value.to_string()))?;
            if end < i64::from(pos) {
                return Err(MarkerFormatError::EndBeforePosition(end, pos));
            }
            return Ok(end);
        }
    }
    Ok(-1)
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.chrom == other.chrom
            && self.pos == other.pos
            && self.alleles == other.alleles
            && self.end == other.end
    }
}

impl Eq for Marker {}

impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Marker {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.chrom, self.pos, &self.alleles, self.end).cmp(&(
            other.chrom,
            other.pos,
            &other.alleles,
            other.end,
        ))
    }
}

impl Hash for Marker {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.chrom.hash(state);
        self.pos.hash(state);
        self.alleles.hash(state);
        self.end.hash(state);
    }
}
