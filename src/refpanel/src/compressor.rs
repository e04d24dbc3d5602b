use ahash::AHashMap;

use crate::emission::{Emission, SeqCodedEmission};
use crate::error::EmissionError;

/// Default cap on the number of distinct active sequences a
/// [`SequenceCompressor`] run may hold, matching the BREF SeqCoded
/// encoding's own limit.
pub const DEFAULT_MAX_NSEQ: usize = 255;

enum JournalEntry {
    AppendedTo(usize),
    CreatedSeq,
    Reassigned(usize, usize),
}

/// Accumulates a chromosome-bound run of markers, collapsing haplotypes
/// that remain allele-identical across the run onto a shared sequence id.
///
/// `add` either extends the run (returning `Ok(true)`) or, if the active
/// sequence count would exceed `max_nseq`, rolls the attempt back and
/// returns `Ok(false)`: the caller must [`SequenceCompressor::flush`] the
/// markers buffered so far, [`SequenceCompressor::clear`], and retry the
/// same marker on the fresh run.
pub struct SequenceCompressor {
    hap_to_seq: Vec<usize>,
    sequences: Vec<Vec<usize>>,
    n_alleles_per_marker: Vec<usize>,
    max_nseq: usize,
    n_hap: usize,
}

/// One buffered marker's `seq -> allele` map, paired with its alphabet
/// size, ready to be viewed as a [`SeqCodedEmission`] against the run's
/// shared `hap_to_seq`.
pub struct FlushedMarker {
    pub seq_to_allele: Vec<usize>,
    pub n_alleles: usize,
}

/// The result of [`SequenceCompressor::flush`]: a shared `hap_to_seq` and
/// one [`FlushedMarker`] per buffered marker, in original order.
pub struct FlushedRun {
    pub hap_to_seq: Vec<usize>,
    pub markers: Vec<FlushedMarker>,
}

impl FlushedRun {
    #[must_use]
    pub fn emission(&self, marker_index: usize) -> Option<SeqCodedEmission<'_>> {
        let marker = self.markers.get(marker_index)?;
        Some(SeqCodedEmission::new(&self.hap_to_seq, &marker.seq_to_allele, marker.n_alleles))
    }
}

impl SequenceCompressor {
    #[must_use]
    pub fn new(n_hap: usize, max_nseq: usize) -> Self {
        let mut compressor = Self {
            hap_to_seq: Vec::new(),
            sequences: Vec::new(),
            n_alleles_per_marker: Vec::new(),
            max_nseq,
            n_hap,
        };
        compressor.clear();
        compressor
    }

    /// Reset to the start of a fresh run: every haplotype shares one empty
    /// sequence.
    pub fn clear(&mut self) {
        self.hap_to_seq = vec![0; self.n_hap];
        self.sequences = vec![Vec::new()];
        self.n_alleles_per_marker.clear();
    }

    #[must_use]
    pub fn n_buffered_markers(&self) -> usize {
        self.n_alleles_per_marker.len()
    }

    #[must_use]
    pub fn n_active_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Attempt to extend the run with one more marker's emission.
    ///
    /// # Errors
    /// Propagates any [`EmissionError`] raised while reading `emission`'s
    /// alleles.
    pub fn add(&mut self, emission: &dyn Emission) -> Result<bool, EmissionError> {
        let old_len = self.sequences[0].len();
        let mut journal: Vec<JournalEntry> = Vec::new();
        // Per-source-sequence list of (allele, dest_seq) pairs observed so
        // far at this marker, keyed by the sequence id each haplotype
        // started this marker at.
        let mut observed: AHashMap<usize, Vec<(usize, usize)>> = AHashMap::new();
        let mut aborted = false;

        for hap in 0..self.hap_to_seq.len() {
            let s = self.hap_to_seq[hap];
            let a = match emission.allele(hap) {
                Ok(a) => a,
                Err(err) => {
                    self.rollback(journal, old_len);
                    return Err(err);
                }
            };
            let entry = observed.entry(s).or_default();
            if entry.is_empty() {
                entry.push((a, s));
                self.sequences[s].push(a);
                journal.push(JournalEntry::AppendedTo(s));
                continue;
            }
            if let Some(&(_, dest)) = entry.iter().find(|(existing, _)| *existing == a) {
                if dest != s {
                    journal.push(JournalEntry::Reassigned(hap, s));
                    self.hap_to_seq[hap] = dest;
                }
                continue;
            }
            if self.sequences.len() >= self.max_nseq {
                aborted = true;
                break;
            }
            let mut new_seq = self.sequences[s][..old_len].to_vec();
            new_seq.push(a);
            let new_id = self.sequences.len();
            self.sequences.push(new_seq);
            journal.push(JournalEntry::CreatedSeq);
            entry.push((a, new_id));
            journal.push(JournalEntry::Reassigned(hap, s));
            self.hap_to_seq[hap] = new_id;
        }

        if aborted {
            self.rollback(journal, old_len);
            return Ok(false);
        }

        self.n_alleles_per_marker.push(emission.n_alleles());
        Ok(true)
    }

    fn rollback(&mut self, journal: Vec<JournalEntry>, old_len: usize) {
        for entry in journal.into_iter().rev() {
            match entry {
                JournalEntry::AppendedTo(seq) => {
                    self.sequences[seq].truncate(old_len);
                }
                JournalEntry::CreatedSeq => {
                    self.sequences.pop();
                }
                JournalEntry::Reassigned(hap, old_seq) => {
                    self.hap_to_seq[hap] = old_seq;
                }
            }
        }
    }

    /// Emit every buffered marker as a `SeqCoded` view sharing this run's
    /// `hap_to_seq`. Does not clear the compressor; callers should follow
    /// with [`SequenceCompressor::clear`].
    #[must_use]
    pub fn flush(&self) -> FlushedRun {
        let n_markers = self.n_alleles_per_marker.len();
        let mut markers = Vec::with_capacity(n_markers);
        for i in 0..n_markers {
            let seq_to_allele = self.sequences.iter().map(|seq| seq[i]).collect();
            markers.push(FlushedMarker { seq_to_allele, n_alleles: self.n_alleles_per_marker[i] });
        }
        FlushedRun { hap_to_seq: self.hap_to_seq.clone(), markers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::ByteArrayEmission;

    fn emission(alleles: &[u8]) -> ByteArrayEmission {
        ByteArrayEmission::new(alleles.to_vec(), 2).unwrap()
    }

    #[test]
    fn collapses_identical_allele_histories_onto_shared_sequences() {
        let mut c = SequenceCompressor::new(6, DEFAULT_MAX_NSEQ);
        // Matches the canonical scenario: haps [0,2,4] share (0,1,0),
        // haps [1,3,5] share (1,0,1).
        assert!(c.add(&emission(&[0, 1, 0, 1, 0, 1])).unwrap());
        assert!(c.add(&emission(&[1, 0, 1, 0, 1, 0])).unwrap());
        assert!(c.add(&emission(&[0, 1, 0, 1, 0, 1])).unwrap());

        let run = c.flush();
        assert_eq!(run.hap_to_seq[0], run.hap_to_seq[2]);
        assert_eq!(run.hap_to_seq[2], run.hap_to_seq[4]);
        assert_eq!(run.hap_to_seq[1], run.hap_to_seq[3]);
        assert_eq!(run.hap_to_seq[3], run.hap_to_seq[5]);
        assert_ne!(run.hap_to_seq[0], run.hap_to_seq[1]);
        assert_eq!(c.n_active_sequences(), 2);
    }

    #[test]
    fn rollback_on_capacity_exhaustion_preserves_prior_state() {
        let mut c = SequenceCompressor::new(4, 2);
        assert!(c.add(&emission(&[0, 0, 1, 1])).unwrap());
        let active_before = c.n_active_sequences();
        let buffered_before = c.n_buffered_markers();
        // Forces a third distinct sequence (0,1,0,1 diverges all four ways
        // while only 2 sequences are allowed), so this add must roll back.
        let ok = c.add(&emission(&[0, 1, 0, 1])).unwrap();
        assert!(!ok);
        assert_eq!(c.n_active_sequences(), active_before);
        assert_eq!(c.n_buffered_markers(), buffered_before);
    }

    #[test]
    fn flush_then_clear_allows_fresh_run() {
        let mut c = SequenceCompressor::new(4, 2);
        c.add(&emission(&[0, 0, 1, 1])).unwrap();
        let run = c.flush();
        assert_eq!(run.markers.len(), 1);
        let view = run.emission(0).unwrap();
        assert_eq!(view.allele(0).unwrap(), 0);
        assert_eq!(view.allele(2).unwrap(), 1);

        c.clear();
        assert_eq!(c.n_buffered_markers(), 0);
        assert_eq!(c.n_active_sequences(), 1);
    }
}
