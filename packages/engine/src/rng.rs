//! Seeded random source
//!
//! Every randomized choice in the engine goes through [`SeededRng`]. The
//! seed string is hashed with SHA-256 into a ChaCha8 key, so the output
//! stream depends only on the seed, never on time, platform or call site.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::error::{EngineError, EngineResult};

/// Field separator for stable hashes.
const UNIT_SEPARATOR: u8 = 0x1f;

/// Hex characters kept in derived plan ids.
const ID_HEX_LEN: usize = 16;

pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn from_seed_str(seed: &str) -> EngineResult<Self> {
        if seed.is_empty() {
            return Err(EngineError::EmptySeed);
        }
        let digest = Sha256::digest(seed.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Ok(Self {
            inner: ChaCha8Rng::from_seed(key),
        })
    }

    /// Uniform draw in [0, 1).
    pub fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Stable SHA-256 over separated parts.
pub fn stable_hash(parts: &[&str]) -> String {
    let mut digest = Sha256::new();
    for part in parts {
        digest.update(part.as_bytes());
        digest.update([UNIT_SEPARATOR]);
    }
    hex::encode(digest.finalize())
}

/// Deterministic id such as `exam-3f2a9c0d41b7e655`.
pub fn derive_id(prefix: &str, parts: &[&str]) -> String {
    let hash = stable_hash(parts);
    format!("{prefix}-{}", &hash[..ID_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::from_seed_str("exam-001").unwrap();
        let mut b = SeededRng::from_seed_str("exam-001").unwrap();
        for _ in 0..64 {
            assert_eq!(a.next_unit().to_bits(), b.next_unit().to_bits());
        }
    }

    #[test]
    fn test_different_seed_different_sequence() {
        let mut a = SeededRng::from_seed_str("exam-001").unwrap();
        let mut b = SeededRng::from_seed_str("exam-002").unwrap();
        let xs: Vec<u64> = (0..8).map(|_| a.next_unit().to_bits()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.next_unit().to_bits()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_empty_seed_rejected() {
        assert!(matches!(
            SeededRng::from_seed_str(""),
            Err(EngineError::EmptySeed)
        ));
    }

    #[test]
    fn test_unit_range() {
        let mut rng = SeededRng::from_seed_str("range").unwrap();
        for _ in 0..1000 {
            let x = rng.next_unit();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_derive_id_is_stable() {
        let a = derive_id("exam", &["seed", "2026-01-01T00:00:00Z"]);
        let b = derive_id("exam", &["seed", "2026-01-01T00:00:00Z"]);
        assert_eq!(a, b);
        assert!(a.starts_with("exam-"));
        assert_eq!(a.len(), "exam-".len() + ID_HEX_LEN);
        // separator keeps ("ab","c") apart from ("a","bc")
        assert_ne!(stable_hash(&["ab", "c"]), stable_hash(&["a", "bc"]));
    }
}
