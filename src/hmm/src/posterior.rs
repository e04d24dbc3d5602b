use parking_lot::Mutex;

use crate::error::HmmError;

/// Shared posterior accumulator: one mutex-guarded row per sample, so
/// concurrent `add` calls from independent sample workers never contend
/// on each other's rows.
pub struct GenotypeValues {
    rows: Vec<Mutex<Vec<f64>>>,
}

impl GenotypeValues {
    /// Build an accumulator with `n_samples` rows, each `row_len` long
    /// and zero-initialized (typically `markers.sum_genotypes(markers.len())`
    /// or the allele-prefix equivalent for haploid output).
    #[must_use]
    pub fn new(n_samples: usize, row_len: usize) -> Self {
        Self { rows: (0..n_samples).map(|_| Mutex::new(vec![0.0; row_len])).collect() }
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Accumulate `probs` into `sample_index`'s row at `offset`.
    ///
    /// # Errors
    /// [`HmmError::SampleOutOfRange`] if `sample_index` is out of bounds;
    /// [`HmmError::PosteriorLengthMismatch`] if `offset + probs.len()`
    /// overruns the row.
    pub fn add(&self, sample_index: usize, offset: usize, probs: &[f64]) -> Result<(), HmmError> {
        let row = self.rows.get(sample_index).ok_or(HmmError::SampleOutOfRange(sample_index))?;
        let mut row = row.lock();
        let end = offset + probs.len();
        if end > row.len() {
            return Err(HmmError::PosteriorLengthMismatch { expected: row.len(), actual: end });
        }
        row[offset..end].iter_mut().zip(probs).for_each(|(dst, src)| *dst += src);
        Ok(())
    }

    /// Snapshot `sample_index`'s row.
    #[must_use]
    pub fn row(&self, sample_index: usize) -> Vec<f64> {
        self.rows[sample_index].lock().clone()
    }
}
