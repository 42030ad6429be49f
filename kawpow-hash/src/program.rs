//! Per-period random program generation.
//!
//! Once per period (`PERIOD_LENGTH` blocks) a fresh instruction sequence is
//! derived from the epoch seed hash and the period index. Changing the
//! program every few blocks is what denies fixed-function hardware a
//! durable advantage over commodity GPUs.

use crate::common::hash_types::SeedHash;
use crate::epoch;
use crate::fnv::{fnv1a, fnv1a_fold};
use crate::kiss99::Kiss99;
use crate::mix::{CNT_CACHE, CNT_MATH, DAG_LOADS, REGS};

/// Math operation applied between two registers, selected by `sel mod 11`.
///
/// Case order and modulus are consensus-critical: reordering changes every
/// hash and breaks cross-implementation compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Mul,
    MulHi,
    Min,
    Rotl,
    Rotr,
    And,
    Or,
    Xor,
    Clz,
    Popcount,
}

impl MathOp {
    pub fn from_selector(r: u32) -> Self {
        match r % 11 {
            0 => MathOp::Add,
            1 => MathOp::Mul,
            2 => MathOp::MulHi,
            3 => MathOp::Min,
            4 => MathOp::Rotl,
            5 => MathOp::Rotr,
            6 => MathOp::And,
            7 => MathOp::Or,
            8 => MathOp::Xor,
            9 => MathOp::Clz,
            10 => MathOp::Popcount,
            _ => unreachable!(),
        }
    }

    pub fn apply(&self, a: u32, b: u32) -> u32 {
        match self {
            MathOp::Add => a.wrapping_add(b),
            MathOp::Mul => a.wrapping_mul(b),
            MathOp::MulHi => ((a as u64 * b as u64) >> 32) as u32,
            MathOp::Min => a.min(b),
            MathOp::Rotl => a.rotate_left(b & 31),
            MathOp::Rotr => a.rotate_right(b & 31),
            MathOp::And => a & b,
            MathOp::Or => a | b,
            MathOp::Xor => a ^ b,
            // OR with 1 keeps the zero-input count bounded, matching GPU
            // semantics where clz(0) is implementation-defined
            MathOp::Clz => (a | 1).leading_zeros() + (b | 1).leading_zeros(),
            MathOp::Popcount => a.count_ones() + b.count_ones(),
        }
    }
}

/// Merge `b` into accumulator `a`. The selector's low bits pick the variant
/// (`r mod 4`) and its high bits the rotation amount, so no variant ever
/// degenerates into a plain overwrite of the accumulator.
#[inline]
pub fn merge(a: u32, b: u32, r: u32) -> u32 {
    match r % 4 {
        0 => a.wrapping_mul(33).wrapping_add(b),
        1 => (a ^ b).wrapping_mul(33),
        2 => a.rotate_left(((r >> 16) % 31) + 1) ^ b,
        _ => a.rotate_right(((r >> 16) % 31) + 1) ^ b,
    }
}

/// One math slot: `dst = merge(dst, op(src1, src2), sel2)`
#[derive(Debug, Clone, Copy)]
pub struct MathInstr {
    pub src1: usize,
    pub src2: usize,
    pub dst: usize,
    pub op: MathOp,
    pub sel2: u32,
}

/// One cache slot: `dst = merge(dst, cache[fnv1a(regs[src], sel)], sel)`
#[derive(Debug, Clone, Copy)]
pub struct CacheInstr {
    pub src: usize,
    pub dst: usize,
    pub sel: u32,
}

/// One dataset-merge slot: `dst = merge(dst, dag_word, sel)`
#[derive(Debug, Clone, Copy)]
pub struct DagInstr {
    pub dst: usize,
    pub sel: u32,
}

/// The full instruction sequence for one period, executed identically in
/// every round of every hash of that period.
#[derive(Debug, Clone)]
pub struct Program {
    pub math: [MathInstr; CNT_MATH],
    pub cache: [CacheInstr; CNT_CACHE],
    pub dag: [DagInstr; DAG_LOADS],
}

impl Program {
    /// Generate the program for `period_seed`.
    ///
    /// Draw order is consensus-critical: for each slot index `i` up to
    /// `max(CNT_MATH, CNT_CACHE)`, the math tuple (src1, src2, dst, sel1,
    /// sel2) is drawn when `i < CNT_MATH`, then the cache tuple (src, dst,
    /// sel) when `i < CNT_CACHE`. Afterwards one dataset-merge slot per DAG
    /// load: slot 0 always targets register 0 and only its selector is
    /// drawn; later slots draw dst then sel.
    pub fn generate(period_seed: u64) -> Program {
        let mut rnd = Kiss99::from_seed(period_seed);

        let mut math = [MathInstr {
            src1: 0,
            src2: 0,
            dst: 0,
            op: MathOp::Add,
            sel2: 0,
        }; CNT_MATH];
        let mut cache = [CacheInstr {
            src: 0,
            dst: 0,
            sel: 0,
        }; CNT_CACHE];
        let mut dag = [DagInstr { dst: 0, sel: 0 }; DAG_LOADS];

        for i in 0..CNT_MATH.max(CNT_CACHE) {
            if i < CNT_MATH {
                let src1 = rnd.next() as usize % REGS;
                let src2 = rnd.next() as usize % REGS;
                let dst = rnd.next() as usize % REGS;
                let op = MathOp::from_selector(rnd.next());
                let sel2 = rnd.next();
                math[i] = MathInstr {
                    src1,
                    src2,
                    dst,
                    op,
                    sel2,
                };
            }
            if i < CNT_CACHE {
                let src = rnd.next() as usize % REGS;
                let dst = rnd.next() as usize % REGS;
                let sel = rnd.next();
                cache[i] = CacheInstr { src, dst, sel };
            }
        }

        for (k, slot) in dag.iter_mut().enumerate() {
            if k > 0 {
                slot.dst = rnd.next() as usize % REGS;
            }
            slot.sel = rnd.next();
        }

        Program { math, cache, dag }
    }
}

/// 64-bit program seed for the period containing `height`, derived from the
/// epoch seed hash and the period index.
pub fn period_seed(seed: &SeedHash, height: u64) -> u64 {
    let period = epoch::period(height);
    let acc = fnv1a_fold(&seed.words());
    let lo = fnv1a(acc, period as u32);
    let hi = fnv1a(lo, (period >> 32) as u32);
    ((hi as u64) << 32) | lo as u64
}
