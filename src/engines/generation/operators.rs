use crate::error::{MotifError, Result};
use crate::types::{Sequence, Token};
use rand::seq::SliceRandom;
use rand::Rng;

/// Random sequence of `size` tokens drawn uniformly, with replacement, from the alphabet
pub fn random_individual<R: Rng>(alphabet: &[Token], size: usize, rng: &mut R) -> Result<Sequence> {
    if alphabet.is_empty() {
        return Err(MotifError::EmptyAlphabet);
    }
    Ok((0..size)
        .filter_map(|_| alphabet.choose(rng).cloned())
        .collect())
}

/// Two-point crossover: swap the segment between two cut points.
/// The first cut is in `1..=size`, the second is distinct from it; sequences
/// shorter than 2 are left untouched.
pub fn cx_two_point<R: Rng>(a: &mut Sequence, b: &mut Sequence, rng: &mut R) {
    let size = a.len().min(b.len());
    if size < 2 {
        return;
    }

    let mut point1 = rng.gen_range(1..=size);
    let mut point2 = rng.gen_range(1..size);
    if point2 >= point1 {
        point2 += 1;
    } else {
        std::mem::swap(&mut point1, &mut point2);
    }

    a[point1..point2].swap_with_slice(&mut b[point1..point2]);
}

/// Shuffle-index mutation: each position, with probability `indpb`, swaps
/// with another uniformly chosen position.
pub fn mut_shuffle_indexes<R: Rng>(sequence: &mut Sequence, indpb: f64, rng: &mut R) {
    let size = sequence.len();
    if size < 2 {
        return;
    }

    for i in 0..size {
        if rng.gen::<f64>() < indpb {
            let mut swap = rng.gen_range(0..size - 1);
            if swap >= i {
                swap += 1;
            }
            sequence.swap(i, swap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sequence_of;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn counts(seq: &[Token]) -> BTreeMap<&str, usize> {
        let mut map = BTreeMap::new();
        for t in seq {
            *map.entry(t.as_str()).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_random_individual_uses_alphabet() {
        let alphabet = sequence_of(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(3);
        let ind = random_individual(&alphabet, 50, &mut rng).unwrap();
        assert_eq!(ind.len(), 50);
        assert!(ind.iter().all(|t| alphabet.contains(t)));
    }

    #[test]
    fn test_random_individual_empty_alphabet() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            random_individual(&[], 5, &mut rng),
            Err(MotifError::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_two_point_crossover_swaps_one_segment() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..50 {
            let mut a = sequence_of(&["a"; 10]);
            let mut b = sequence_of(&["b"; 10]);
            cx_two_point(&mut a, &mut b, &mut rng);

            assert_eq!(a.len(), 10);
            assert_eq!(b.len(), 10);
            // Position 0 is never swapped
            assert_eq!(a[0], "a");
            // Swapped positions are contiguous and mirrored
            let swapped: Vec<usize> = (0..10).filter(|&i| a[i] == "b").collect();
            assert!(!swapped.is_empty());
            assert_eq!(swapped.last().unwrap() - swapped[0] + 1, swapped.len());
            assert!(swapped.iter().all(|&i| b[i] == "a"));
        }
    }

    #[test]
    fn test_crossover_short_sequences_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = sequence_of(&["a"]);
        let mut b = sequence_of(&["b"]);
        cx_two_point(&mut a, &mut b, &mut rng);
        assert_eq!(a, sequence_of(&["a"]));
        assert_eq!(b, sequence_of(&["b"]));
    }

    #[test]
    fn test_shuffle_mutation_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(8);
        let original = sequence_of(&["a", "b", "c", "d", "e", "a", "b"]);
        let mut mutated = original.clone();
        mut_shuffle_indexes(&mut mutated, 1.0, &mut rng);
        assert_eq!(counts(&mutated), counts(&original));
    }

    #[test]
    fn test_shuffle_mutation_zero_probability() {
        let mut rng = StdRng::seed_from_u64(8);
        let original = sequence_of(&["a", "b", "c"]);
        let mut mutated = original.clone();
        mut_shuffle_indexes(&mut mutated, 0.0, &mut rng);
        assert_eq!(mutated, original);
    }
}
