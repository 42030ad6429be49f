//! Error types for the KawPow core.

use thiserror::Error;

/// KawPow core error types.
///
/// Allocation failures are fatal to the caller: mining cannot proceed
/// without the full cache/dataset, and a truncated structure would produce
/// wrong, non-interoperable hashes.
#[derive(Error, Debug)]
pub enum PowError {
    #[error("allocation of {size} bytes for the {what} failed")]
    Allocation { what: &'static str, size: usize },

    #[error("invalid cache size {size}: must be a non-zero multiple of {multiple} bytes")]
    InvalidCacheSize { size: usize, multiple: usize },

    #[error("invalid dataset size {size}: must be a non-zero multiple of {multiple} bytes")]
    InvalidDatasetSize { size: usize, multiple: usize },

    #[error("seed hash must be exactly 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    #[error("invalid seed hash hex: {0}")]
    SeedHashHex(#[from] hex::FromHexError),

    #[error("main seed hash is not set or has no cache installed")]
    NotReady,

    #[error("{what} was built for seed {built_for} but the main seed is {main}")]
    SeedMismatch {
        what: &'static str,
        built_for: String,
        main: String,
    },
}

pub type Result<T> = std::result::Result<T, PowError>;
