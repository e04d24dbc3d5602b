/// The underflow floor applied to forward/backward products: `100 * DBL_MIN`.
pub const MIN_VALUE: f64 = 100.0 * f64::MIN_POSITIVE;

/// Clamp `value` to [`MIN_VALUE`] when it underflowed from a strictly
/// positive parent, so a vanishingly small but live state stays samplable.
#[must_use]
pub fn clamp_underflow(value: f64, parent_value: f64) -> f64 {
    if value < MIN_VALUE && parent_value > 0.0 {
        MIN_VALUE
    } else {
        value
    }
}

/// Unordered-genotype bin index for a `{a1, a2}` pair: `hi*(hi+1)/2 + lo`
/// with `lo <= hi`. Matches `Marker::n_genotypes`'s `n*(n+1)/2` count.
#[must_use]
pub fn genotype_index(a1: usize, a2: usize) -> usize {
    let (lo, hi) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
    hi * (hi + 1) / 2 + lo
}

/// State-array growth rule: `max(min_needed, cap*3/2 + 1)`.
#[must_use]
pub fn grown_capacity(cap: usize, min_needed: usize) -> usize {
    min_needed.max(cap.saturating_mul(3) / 2 + 1)
}

/// Triangular checkpoint buffer size: `ceil(sqrt(1 + 8*n_markers)/2) + 1`.
///
/// Chosen so the forward pass can retire earlier checkpoint slots at a
/// rate that keeps the buffer at `O(sqrt(n_markers))` while the backward
/// pass recomputes at most `O(sqrt(n_markers))` forward levels per query.
#[must_use]
pub fn checkpoint_capacity(n_markers: usize) -> usize {
    let n = n_markers as f64;
    (((1.0 + 8.0 * n).sqrt() / 2.0).ceil() as usize).max(1) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_only_applies_to_positive_parents() {
        assert_eq!(clamp_underflow(0.0, 0.0), 0.0);
        assert_eq!(clamp_underflow(1e-310, 1.0), MIN_VALUE);
        assert_eq!(clamp_underflow(1.0, 1.0), 1.0);
    }

    #[test]
    fn genotype_index_is_symmetric_and_packed() {
        assert_eq!(genotype_index(0, 0), 0);
        assert_eq!(genotype_index(0, 1), 1);
        assert_eq!(genotype_index(1, 0), 1);
        assert_eq!(genotype_index(1, 1), 2);
        assert_eq!(genotype_index(0, 2), 3);
        assert_eq!(genotype_index(2, 2), 5);
    }

    #[test]
    fn capacity_grows_by_one_and_a_half() {
        assert_eq!(grown_capacity(10, 0), 16);
        assert_eq!(grown_capacity(10, 100), 100);
    }

    #[test]
    fn checkpoint_capacity_grows_sublinearly() {
        let small = checkpoint_capacity(10);
        let large = checkpoint_capacity(10_000);
        assert!(small < large);
        assert!((large as f64) < 200.0);
    }
}
