//! KISS99 random number generator.
//!
//! The simplest generator that passes the TestU01 statistical suite; used
//! throughout KawPow for its minimal instruction count. The state is four
//! 32-bit words (multiply-with-carry pair, xorshift, congruential) advanced
//! one output word per call.

use crate::fnv::{fnv1a, FNV_OFFSET_BASIS};

/// KISS99 generator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kiss99 {
    pub z: u32,
    pub w: u32,
    pub jsr: u32,
    pub jcong: u32,
}

impl Kiss99 {
    /// Seed the generator from a 64-bit value.
    ///
    /// The four state words are derived by chaining `fnv1a` over the low
    /// and high halves of the seed twice; equal seeds always produce equal
    /// output streams on every platform.
    pub fn from_seed(seed: u64) -> Self {
        let z = fnv1a(FNV_OFFSET_BASIS, seed as u32);
        let w = fnv1a(z, (seed >> 32) as u32);
        let jsr = fnv1a(w, seed as u32);
        let jcong = fnv1a(jsr, (seed >> 32) as u32);
        Self { z, w, jsr, jcong }
    }

    /// Seed the generator from a 64-bit value and a lane id, giving every
    /// lane a distinct deterministic stream.
    pub fn for_lane(seed: u64, lane_id: u32) -> Self {
        let z = fnv1a(FNV_OFFSET_BASIS, seed as u32);
        let w = fnv1a(z, (seed >> 32) as u32);
        let jsr = fnv1a(w, lane_id);
        let jcong = fnv1a(jsr, lane_id);
        Self { z, w, jsr, jcong }
    }

    /// Advance the generator by one 32-bit word
    #[inline(always)]
    pub fn next(&mut self) -> u32 {
        self.z = 36969u32.wrapping_mul(self.z & 65535).wrapping_add(self.z >> 16);
        self.w = 18000u32.wrapping_mul(self.w & 65535).wrapping_add(self.w >> 16);
        let mwc = (self.z << 16).wrapping_add(self.w);
        self.jsr ^= self.jsr << 17;
        self.jsr ^= self.jsr >> 13;
        self.jsr ^= self.jsr << 5;
        self.jcong = 69069u32.wrapping_mul(self.jcong).wrapping_add(1234567);
        (mwc ^ self.jcong).wrapping_add(self.jsr)
    }
}
