use marker::{Allele, Nucleotide};

const BASES: [Nucleotide; 4] = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T];

fn factorial(n: usize) -> usize {
    (1..=n).product::<usize>().max(1)
}

/// The `perm_index`-th (0-based, lexicographic) permutation of `(A,C,G,T)`.
fn permutation_at(mut index: usize) -> [Nucleotide; 4] {
    let mut pool: Vec<Nucleotide> = BASES.to_vec();
    let mut out = [Nucleotide::A; 4];
    for (slot, remaining) in out.iter_mut().zip((1..=4).rev()) {
        let f = factorial(remaining - 1);
        let pick = index / f;
        index %= f;
        *slot = pool.remove(pick);
    }
    out
}

/// Lexicographic index of a full permutation of `(A,C,G,T)`.
fn index_of_permutation(perm: &[Nucleotide; 4]) -> usize {
    let mut pool: Vec<Nucleotide> = BASES.to_vec();
    let mut index = 0;
    for (slot, remaining) in perm.iter().zip((1..=4).rev()) {
        let f = factorial(remaining - 1);
        let pos = pool.iter().position(|n| n == slot).expect("perm is a permutation of BASES");
        index += pos * f;
        pool.remove(pos);
    }
    index
}

/// If `alleles` is a distinct, `N`-free, `<=4`-long run of SNVs, returns
/// `(perm_index, n_alleles)` for a canonical full `(A,C,G,T)` permutation
/// whose prefix equals `alleles` in order. Unused trailing bases are
/// appended in their natural `A,C,G,T` order, giving the lexicographically
/// smallest permutation with that prefix.
#[must_use]
pub fn encode_allele_permutation(alleles: &[Allele]) -> Option<(u8, u8)> {
    if alleles.is_empty() || alleles.len() > 4 {
        return None;
    }
    let mut prefix = Vec::with_capacity(alleles.len());
    for allele in alleles {
        match allele {
            Allele::Snv(n) if *n != Nucleotide::N => prefix.push(*n),
            _ => return None,
        }
    }
    if (1..prefix.len()).any(|i| prefix[..i].contains(&prefix[i])) {
        return None;
    }
    let mut full = prefix.clone();
    for base in BASES {
        if !full.contains(&base) {
            full.push(base);
        }
    }
    let perm: [Nucleotide; 4] = full.try_into().expect("padded to exactly 4 bases");
    let perm_index = index_of_permutation(&perm);
    Some((perm_index as u8, alleles.len() as u8))
}

/// Recover the `n_alleles`-long allele list encoded by `perm_index`.
#[must_use]
pub fn decode_allele_permutation(perm_index: u8, n_alleles: u8) -> Vec<Allele> {
    let perm = permutation_at(perm_index as usize);
    perm[..n_alleles as usize].iter().map(|n| Allele::Snv(*n)).collect()
}

/// Packs `(perm_index, n_alleles)` into the single signed byte BREF stores
/// it as: `(perm_index << 2) | (n_alleles - 1)`.
#[must_use]
pub fn pack_allele_code(perm_index: u8, n_alleles: u8) -> i8 {
    (((perm_index as u32) << 2) | u32::from(n_alleles - 1)) as i8
}

#[must_use]
pub fn unpack_allele_code(code: i8) -> (u8, u8) {
    let bits = code as u8;
    let perm_index = bits >> 2;
    let n_alleles = (bits & 0b11) + 1;
    (perm_index, n_alleles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_permutation_index() {
        for perm_index in 0u8..24 {
            let perm = permutation_at(perm_index as usize);
            assert_eq!(index_of_permutation(&perm), perm_index as usize);
        }
    }

    #[test]
    fn encode_decode_diallelic_roundtrip() {
        let alleles = vec![Allele::Snv(Nucleotide::A), Allele::Snv(Nucleotide::G)];
        let (perm_index, n_alleles) = encode_allele_permutation(&alleles).unwrap();
        let decoded = decode_allele_permutation(perm_index, n_alleles);
        assert_eq!(decoded, alleles);
    }

    #[test]
    fn pack_unpack_allele_code_roundtrip() {
        for perm_index in 0u8..24 {
            for n_alleles in 1u8..=4 {
                let code = pack_allele_code(perm_index, n_alleles);
                assert_eq!(unpack_allele_code(code), (perm_index, n_alleles));
            }
        }
    }

    #[test]
    fn rejects_non_snv_alleles() {
        let alleles = vec![Allele::Snv(Nucleotide::A), Allele::parse("<DEL>").unwrap()];
        assert!(encode_allele_permutation(&alleles).is_none());
    }

    #[test]
    fn rejects_more_than_four_alleles() {
        let alleles: Vec<Allele> = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T, Nucleotide::A]
            .iter()
            .map(|n| Allele::Snv(*n))
            .collect();
        assert!(encode_allele_permutation(&alleles).is_none());
    }
}
