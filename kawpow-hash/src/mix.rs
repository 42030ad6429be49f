//! Lane mixer: the hash inner loop, and the full hash pipeline built on it.
//!
//! `LANES` independent register files run through `CNT_DAG` rounds of
//! dataset loads, program math, cache reads and dataset merges, then reduce
//! to a single 8-word digest. Every step is a pure function of the seed,
//! cache, dataset and program, which is what makes CPU reference results
//! and GPU kernel results directly comparable.

use crate::cache::Cache;
use crate::dataset::DagView;
use crate::fnv::{fnv1a, FNV_OFFSET_BASIS};
use crate::kiss99::Kiss99;
use crate::program::{merge, period_seed, Program};
use crate::sponge;

/// Parallel lanes per hash instance
pub const LANES: usize = 16;
/// 32-bit registers per lane
pub const REGS: usize = 32;
/// Dataset words loaded per lane per round
pub const DAG_LOADS: usize = 4;
/// Outer rounds per hash
pub const CNT_DAG: usize = 64;
/// Cache reads per round
pub const CNT_CACHE: usize = 11;
/// Math operations per round
pub const CNT_MATH: usize = 18;

/// Initialize one lane's register file from the hash seed
fn fill_mix(seed: u64, lane_id: u32) -> [u32; REGS] {
    let mut rnd = Kiss99::for_lane(seed, lane_id);
    let mut regs = [0u32; REGS];
    for reg in regs.iter_mut() {
        *reg = rnd.next();
    }
    regs
}

/// Run the mixing loop for `hash_seed` and reduce to the 8-word digest
pub fn mix_digest(hash_seed: u64, program: &Program, cache: &Cache, dag: &DagView<'_>) -> [u32; 8] {
    let mut mix = [[0u32; REGS]; LANES];
    for (lane_id, lane) in mix.iter_mut().enumerate() {
        *lane = fill_mix(hash_seed, lane_id as u32);
    }

    let cache_words = cache.num_words();
    let dag_groups = dag.num_words() / DAG_LOADS;

    for round in 0..CNT_DAG as u32 {
        // (a) dataset loads, addressed by register 0 and the round index
        let mut loaded = [[0u32; DAG_LOADS]; LANES];
        for (lane, words) in mix.iter().zip(loaded.iter_mut()) {
            let group = fnv1a(round, lane[0]) as usize % dag_groups;
            dag.load(group * DAG_LOADS, words);
        }

        // (b) program math
        for instr in &program.math {
            for lane in mix.iter_mut() {
                let value = instr.op.apply(lane[instr.src1], lane[instr.src2]);
                lane[instr.dst] = merge(lane[instr.dst], value, instr.sel2);
            }
        }

        // (c) cache reads
        for instr in &program.cache {
            for lane in mix.iter_mut() {
                let index = fnv1a(lane[instr.src], instr.sel) as usize % cache_words;
                lane[instr.dst] = merge(lane[instr.dst], cache.word(index), instr.sel);
            }
        }

        // (d) dataset merges
        for (k, instr) in program.dag.iter().enumerate() {
            for (lane, words) in mix.iter_mut().zip(loaded.iter()) {
                lane[instr.dst] = merge(lane[instr.dst], words[k], instr.sel);
            }
        }
    }

    // Reduce each lane to one word, then fold the lanes into eight slots
    let mut digest = [FNV_OFFSET_BASIS; 8];
    for (lane_id, lane) in mix.iter().enumerate() {
        let mut lane_digest = FNV_OFFSET_BASIS;
        for &reg in lane.iter() {
            lane_digest = fnv1a(lane_digest, reg);
        }
        digest[lane_id % 8] = fnv1a(digest[lane_id % 8], lane_digest);
    }
    digest
}

/// Full hash pipeline: derive the per-hash seed from the header, generate
/// the period program, run the mixing loop, and squeeze the 32-byte result.
///
/// Pure given `(cache, dag, header, height)`; `height` selects the period
/// whose program drives the mixing loop.
pub fn compute_hash(cache: &Cache, dag: &DagView<'_>, header: &[u8], height: u64) -> [u8; 32] {
    let seed = sponge::extract_seed(header);
    let program = Program::generate(period_seed(cache.seed(), height));
    let digest = mix_digest(seed, &program, cache, dag);
    sponge::finalize(header, seed, &digest)
}
