//! FNV1a mixing primitive for KawPow.
//!
//! FNV1a provides better distribution properties than the FNV1 variant used
//! in Ethash. The 32-bit form matches the native GPU word size.

/// FNV1a constants for the 32-bit variant
pub const FNV_PRIME: u32 = 0x0100_0193;
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// Mix a 32-bit word into a running FNV1a accumulator
#[inline(always)]
pub fn fnv1a(h: u32, d: u32) -> u32 {
    (h ^ d).wrapping_mul(FNV_PRIME)
}

/// Fold a word slice into a single accumulator seeded with the offset basis
#[inline]
pub fn fnv1a_fold(words: &[u32]) -> u32 {
    words.iter().fold(FNV_OFFSET_BASIS, |h, &w| fnv1a(h, w))
}
