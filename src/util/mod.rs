use rand::prelude::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

pub mod hex;

/// Deterministic random key-value pairs of 8 bytes each.
pub fn data(count: usize, seed: u64) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (
                rng.next_u64().to_be_bytes().to_vec(),
                rng.next_u64().to_be_bytes().to_vec(),
            )
        })
        .collect()
}

pub fn shuffle<T>(mut data: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    data.shuffle(&mut rng);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data() {
        let data = data(10, 42);
        assert_eq!(data.len(), 10);
        assert!(data.iter().all(|(k, v)| k.len() == 8 && v.len() == 8));
        assert_eq!(super::data(10, 42), data);
    }

    #[test]
    fn test_shuffle() {
        let mut shuffled = shuffle((0..100).collect::<Vec<_>>(), 42);
        assert_eq!(shuffled, shuffle((0..100).collect::<Vec<_>>(), 42));
        shuffled.sort_unstable();
        assert_eq!(shuffled, (0..100).collect::<Vec<_>>());
    }
}
