//! Sponge construction over Keccak-f800.
//!
//! Used twice per hash: once to absorb the block header and extract the
//! 64-bit mixing seed, once to fold the header, seed and mix digest into
//! the final 32-byte result.

use crate::keccak::{keccak_f800, KeccakState};
use byteorder::{ByteOrder, LittleEndian};

/// Header words absorbed when deriving the mixing seed
pub const SEED_ABSORB_WORDS: usize = 18;
/// Header words absorbed during finalization
pub const FINAL_ABSORB_WORDS: usize = 8;

/// Absorb up to `max_words` little-endian words of `data` into the front of
/// the state. A trailing partial word is zero-padded; bytes beyond the
/// capacity are truncated, never fabricated.
fn absorb(state: &mut KeccakState, data: &[u8], max_words: usize) {
    for (i, chunk) in data.chunks(4).take(max_words).enumerate() {
        if chunk.len() == 4 {
            state[i] = LittleEndian::read_u32(chunk);
        } else {
            let mut padded = [0u8; 4];
            padded[..chunk.len()].copy_from_slice(chunk);
            state[i] = u32::from_le_bytes(padded);
        }
    }
}

/// Derive the per-hash 64-bit seed from the header bytes
pub fn extract_seed(header: &[u8]) -> u64 {
    let mut state: KeccakState = [0u32; 25];
    absorb(&mut state, header, SEED_ABSORB_WORDS);
    keccak_f800(&mut state);
    ((state[0] as u64) << 32) | state[1] as u64
}

/// Fold the header, seed and mix digest into the final 32-byte hash
pub fn finalize(header: &[u8], seed: u64, digest: &[u32; 8]) -> [u8; 32] {
    let mut state: KeccakState = [0u32; 25];
    absorb(&mut state, header, FINAL_ABSORB_WORDS);
    state[8] = seed as u32;
    state[9] = (seed >> 32) as u32;
    state[10..18].copy_from_slice(digest);
    keccak_f800(&mut state);

    let mut out = [0u8; 32];
    for (i, word) in state[..8].iter().enumerate() {
        LittleEndian::write_u32(&mut out[i * 4..i * 4 + 4], *word);
    }
    out
}
