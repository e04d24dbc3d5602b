use std::iter::Peekable;

use crate::error::WindowError;
use crate::record::WindowRecord;

/// A free-running window over a source iterator of [`WindowRecord`]s.
///
/// `advance` retains the final `overlap` records of the current window,
/// then pulls further records until `target_size` is reached or the
/// chromosome changes, then drains any trailing records sharing the last
/// accepted marker's position so no position straddles a window boundary.
pub struct VcfWindow<R, I: Iterator<Item = R>> {
    buffer: Vec<R>,
    source: Peekable<I>,
}

impl<R: WindowRecord, I: Iterator<Item = R>> VcfWindow<R, I> {
    pub fn new(source: I) -> Self {
        Self { buffer: Vec::new(), source: source.peekable() }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.buffer
    }

    /// True iff the peeked-ahead source record is absent, or on a
    /// different chromosome than the current window's first marker.
    #[must_use]
    pub fn last_window_on_chrom(&mut self) -> bool {
        let Some(first) = self.buffer.first() else { return true };
        let chrom = first.marker().chrom();
        match self.source.peek() {
            None => true,
            Some(next) => next.marker().chrom() != chrom,
        }
    }

    /// # Errors
    /// [`WindowError::InvalidOverlap`] if `overlap >= target_size`;
    /// [`WindowError::OverlapExceedsSize`] if `overlap > self.size()`.
    pub fn advance(&mut self, overlap: usize, target_size: usize) -> Result<(), WindowError> {
        if overlap >= target_size {
            return Err(WindowError::InvalidOverlap { overlap, target_size });
        }
        if overlap > self.buffer.len() {
            return Err(WindowError::OverlapExceedsSize { overlap, size: self.buffer.len() });
        }

        let retain_from = self.buffer.len() - overlap;
        let mut next_buffer: Vec<R> = self.buffer.split_off(retain_from);
        let mut chrom = next_buffer.first().map(|r| r.marker().chrom());

        while next_buffer.len() < target_size {
            let Some(peeked) = self.source.peek() else { break };
            let c = peeked.marker().chrom();
            match chrom {
                Some(expected) if c != expected => break,
                None => chrom = Some(c),
                _ => {}
            }
            next_buffer.push(self.source.next().expect("peek just confirmed Some"));
        }

        if let Some(last) = next_buffer.last() {
            let last_chrom = last.marker().chrom();
            let last_pos = last.marker().pos();
            loop {
                match self.source.peek() {
                    Some(peeked) if peeked.marker().chrom() == last_chrom && peeked.marker().pos() == last_pos => {
                        next_buffer.push(self.source.next().expect("peek just confirmed Some"));
                    }
                    _ => break,
                }
            }
        }

        self.buffer = next_buffer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker::{ChromTable, Marker};

    #[derive(Debug, Clone)]
    struct Rec(Marker);

    impl WindowRecord for Rec {
        fn marker(&self) -> &Marker {
            &self.0
        }
    }

    fn records(lines: &[&str]) -> Vec<Rec> {
        let mut chroms = ChromTable::new();
        lines
            .iter()
            .map(|l| Rec(Marker::parse_vcf_record(l, &mut chroms).unwrap()))
            .collect()
    }

    #[test]
    fn advance_stops_at_target_size() {
        let source = records(&[
            "1\t100\t.\tA\tG\t.\t.\t.",
            "1\t200\t.\tA\tG\t.\t.\t.",
            "1\t300\t.\tA\tG\t.\t.\t.",
            "1\t400\t.\tA\tG\t.\t.\t.",
        ]);
        let mut window = VcfWindow::new(source.into_iter());
        window.advance(0, 2).unwrap();
        assert_eq!(window.size(), 2);
        assert_eq!(window.records()[0].marker().pos().0, 100);
        assert_eq!(window.records()[1].marker().pos().0, 200);
    }

    #[test]
    fn advance_retains_overlap_and_stops_at_chrom_change() {
        let source = records(&[
            "1\t100\t.\tA\tG\t.\t.\t.",
            "1\t200\t.\tA\tG\t.\t.\t.",
            "2\t50\t.\tA\tG\t.\t.\t.",
        ]);
        let mut window = VcfWindow::new(source.into_iter());
        window.advance(0, 2).unwrap();
        window.advance(1, 3).unwrap();
        assert_eq!(window.size(), 2); // overlap(1) + only one same-chrom record left
        assert_eq!(window.records()[0].marker().pos().0, 200);
    }

    #[test]
    fn never_splits_a_shared_position() {
        let source = records(&[
            "1\t100\t.\tA\tG\t.\t.\t.",
            "1\t100\t.\tA\tT\t.\t.\t.",
            "1\t200\t.\tA\tG\t.\t.\t.",
        ]);
        let mut window = VcfWindow::new(source.into_iter());
        window.advance(0, 1).unwrap();
        assert_eq!(window.size(), 2);
    }

    #[test]
    fn last_window_on_chrom_detects_boundary() {
        let source = records(&["1\t100\t.\tA\tG\t.\t.\t.", "2\t50\t.\tA\tG\t.\t.\t."]);
        let mut window = VcfWindow::new(source.into_iter());
        window.advance(0, 1).unwrap();
        assert!(window.last_window_on_chrom());
    }

    #[test]
    fn rejects_overlap_not_less_than_target() {
        let mut window = VcfWindow::new(records(&["1\t100\t.\tA\tG\t.\t.\t."]).into_iter());
        assert!(window.advance(2, 2).is_err());
    }
}
