//! Seed cache construction.
//!
//! The cache is a deterministic expansion of the epoch seed hash into a
//! chain of 64-byte nodes: node `i` is the permutation of node `i - 1`, and
//! three strengthening passes fold a pseudorandom partner node into every
//! node in sequence. Every cache byte is reachable only by walking the
//! chain from the seed, so cache construction cannot be shortcut.

use crate::common::hash_types::SeedHash;
use crate::error::{PowError, Result};
use crate::keccak::{keccak_f800, KeccakState};
use tracing::info;

/// Bytes per cache node (16 u32 words, the permutation's writable half)
pub const NODE_BYTES: usize = 64;
/// Words per cache node
pub const NODE_WORDS: usize = NODE_BYTES / 4;
/// Sequential strengthening passes over the node array
pub const CACHE_ROUNDS: usize = 3;

/// Read-only seed cache for one epoch.
///
/// Content is a pure function of the seed hash and the size; two caches
/// built independently from the same inputs are identical.
pub struct Cache {
    seed: SeedHash,
    words: Vec<u32>,
}

impl Cache {
    /// Build the cache for `seed`, `size_bytes` large.
    ///
    /// `size_bytes` must be a non-zero multiple of [`NODE_BYTES`]. An
    /// allocation failure is reported as an error rather than a partial
    /// cache; callers treat it as fatal.
    pub fn build(seed: &SeedHash, size_bytes: usize) -> Result<Cache> {
        if size_bytes == 0 || size_bytes % NODE_BYTES != 0 {
            return Err(PowError::InvalidCacheSize {
                size: size_bytes,
                multiple: NODE_BYTES,
            });
        }
        let num_words = size_bytes / 4;
        let mut words: Vec<u32> = Vec::new();
        words
            .try_reserve_exact(num_words)
            .map_err(|_| PowError::Allocation {
                what: "cache",
                size: size_bytes,
            })?;
        words.resize(num_words, 0);

        let nodes = size_bytes / NODE_BYTES;

        // First node: the permuted seed words
        let mut state: KeccakState = [0u32; 25];
        state[..8].copy_from_slice(&seed.words());
        keccak_f800(&mut state);
        words[..NODE_WORDS].copy_from_slice(&state[..NODE_WORDS]);

        // Sequential chain: node i is the permutation of node i - 1
        for i in 1..nodes {
            let mut state: KeccakState = [0u32; 25];
            state[..NODE_WORDS].copy_from_slice(&words[(i - 1) * NODE_WORDS..i * NODE_WORDS]);
            keccak_f800(&mut state);
            words[i * NODE_WORDS..(i + 1) * NODE_WORDS].copy_from_slice(&state[..NODE_WORDS]);
        }

        // Strengthening passes: fold the previous node and a pseudorandom
        // partner into each node, in order
        for _ in 0..CACHE_ROUNDS {
            for i in 0..nodes {
                let prev = (i + nodes - 1) % nodes;
                let partner = (words[i * NODE_WORDS] as usize) % nodes;

                let mut state: KeccakState = [0u32; 25];
                for j in 0..NODE_WORDS {
                    state[j] = words[prev * NODE_WORDS + j] ^ words[partner * NODE_WORDS + j];
                }
                keccak_f800(&mut state);
                words[i * NODE_WORDS..(i + 1) * NODE_WORDS].copy_from_slice(&state[..NODE_WORDS]);
            }
        }

        info!(seed = %seed, size = size_bytes, nodes, "cache built");
        Ok(Cache {
            seed: *seed,
            words,
        })
    }

    /// Seed hash this cache was built from
    pub fn seed(&self) -> &SeedHash {
        &self.seed
    }

    /// Cache length in 32-bit words
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Cache length in bytes
    pub fn size_bytes(&self) -> usize {
        self.words.len() * 4
    }

    /// Read one cache word
    #[inline(always)]
    pub fn word(&self, index: usize) -> u32 {
        self.words[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CACHE_BYTES: usize = 4 * 1024;

    #[test]
    fn test_cache_purity() {
        let seed = SeedHash::from_bytes([3u8; 32]);
        let a = Cache::build(&seed, TEST_CACHE_BYTES).unwrap();
        let b = Cache::build(&seed, TEST_CACHE_BYTES).unwrap();

        assert_eq!(a.num_words(), TEST_CACHE_BYTES / 4);
        assert_eq!(a.words, b.words);
    }

    #[test]
    fn test_cache_depends_on_seed() {
        let a = Cache::build(&SeedHash::from_bytes([3u8; 32]), TEST_CACHE_BYTES).unwrap();
        let b = Cache::build(&SeedHash::from_bytes([4u8; 32]), TEST_CACHE_BYTES).unwrap();
        assert_ne!(a.words, b.words);
    }

    #[test]
    fn test_cache_not_degenerate() {
        let seed = SeedHash::default();
        let cache = Cache::build(&seed, TEST_CACHE_BYTES).unwrap();

        // Even an all-zero seed must expand into non-trivial content
        assert!(cache.words.iter().any(|&w| w != 0));
        let first = cache.word(0);
        assert!(cache.words.iter().any(|&w| w != first));
    }

    #[test]
    fn test_cache_rejects_bad_sizes() {
        let seed = SeedHash::default();
        assert!(matches!(
            Cache::build(&seed, 0),
            Err(PowError::InvalidCacheSize { .. })
        ));
        assert!(Cache::build(&seed, NODE_BYTES + 1).is_err());
        assert!(Cache::build(&seed, NODE_BYTES).is_ok());
    }
}
