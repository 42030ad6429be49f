//! KawPow proof-of-work hash core.
//!
//! Memory-hard, GPU-friendly proof of work: a small per-epoch cache is
//! deterministically expanded from a seed hash, the cache is expanded into
//! a large dataset of independently derived items, and each hash runs a
//! period-specific random program over parallel register lanes against that
//! dataset before a Keccak-f800 sponge squeezes the 32-byte result.
//!
//! The [`EpochManager`] registry tracks the main seed hash and the
//! structures built for it; [`compute_hash`] is the pure pipeline over
//! already-resolved structures, used for CPU reference results and
//! GPU cross-checking.

pub mod cache;
pub mod common;
pub mod dataset;
pub mod epoch;
pub mod error;
pub mod fnv;
pub mod keccak;
pub mod kiss99;
pub mod mix;
pub mod params;
pub mod program;
pub mod sponge;

// Re-export main types
pub use cache::Cache;
pub use common::hash_types::SeedHash;
pub use dataset::{item_ranges, DagView, Dataset};
pub use epoch::{epoch, period, seed_height, seed_heights, EpochManager, EPOCH_LENGTH, PERIOD_LENGTH};
pub use error::{PowError, Result};
pub use mix::compute_hash;
pub use params::PowParams;
pub use program::Program;
