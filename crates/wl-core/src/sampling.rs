//! Bounded random sampling.

use rand::Rng;

/// Draws up to `limit` elements from `candidates` without replacement.
///
/// The result has exactly `min(limit, candidates.len())` elements in no
/// particular order. Uses a partial Fisher-Yates shuffle, so only `limit`
/// swaps are performed regardless of the candidate count.
///
/// Draws a fresh sample on every call; callers needing a stable subset
/// must keep the result.
pub fn sample<T>(candidates: Vec<T>, limit: usize) -> Vec<T> {
    sample_with(&mut rand::thread_rng(), candidates, limit)
}

/// Like [`sample`], drawing randomness from the given generator.
pub fn sample_with<T, R>(rng: &mut R, mut candidates: Vec<T>, limit: usize) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let len = candidates.len();
    let amount = limit.min(len);

    // Positions [0, i) hold the picks so far.
    for i in 0..amount {
        let j = rng.gen_range(i..len);
        candidates.swap(i, j);
    }

    candidates.truncate(amount);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("user{}#{:04}", i, i)).collect()
    }

    #[test]
    fn test_sample_bounded_by_limit() {
        let candidates = names(45);
        let pool: HashSet<String> = candidates.iter().cloned().collect();

        let picked = sample(candidates, 30);
        assert_eq!(picked.len(), 30);

        let unique: HashSet<&String> = picked.iter().collect();
        assert_eq!(unique.len(), 30, "sampling must not repeat elements");
        assert!(picked.iter().all(|name| pool.contains(name)));
    }

    #[test]
    fn test_sample_fewer_candidates_than_limit() {
        let candidates = names(4);
        let mut picked = sample(candidates.clone(), 30);
        picked.sort();
        let mut expected = candidates;
        expected.sort();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_sample_edge_sizes() {
        assert!(sample(Vec::<u32>::new(), 30).is_empty());
        assert!(sample(vec![1, 2, 3], 0).is_empty());
    }

    #[test]
    fn test_sample_with_seeded_rng_is_reproducible() {
        let first = sample_with(&mut StdRng::seed_from_u64(7), names(100), 10);
        let second = sample_with(&mut StdRng::seed_from_u64(7), names(100), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_reaches_every_candidate() {
        // Each of 5 candidates should show up at least once over many
        // single-element draws.
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(sample_with(&mut rng, vec![0, 1, 2, 3, 4], 1));
        }
        assert_eq!(seen.len(), 5);
    }
}
