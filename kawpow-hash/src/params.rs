//! Cache and dataset sizing.

use crate::cache::NODE_BYTES;
use crate::dataset::ITEM_BYTES;
use crate::error::{PowError, Result};

/// Default cache size: 16 MiB
pub const CACHE_BYTES_DEFAULT: usize = 16 * 1024 * 1024;
/// Default dataset size: 1 GiB
pub const DATASET_BYTES_DEFAULT: usize = 1024 * 1024 * 1024;

/// Sizing parameters for one epoch manager instance.
///
/// Hashes produced under different parameter sets are not comparable; all
/// consensus participants must agree on one set. Non-default sizes exist
/// for tests and constrained verification environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowParams {
    /// Cache size in bytes; non-zero multiple of the cache node size
    pub cache_bytes: usize,
    /// Dataset size in bytes; non-zero multiple of the dataset item size
    pub dataset_bytes: usize,
}

impl Default for PowParams {
    fn default() -> Self {
        Self {
            cache_bytes: CACHE_BYTES_DEFAULT,
            dataset_bytes: DATASET_BYTES_DEFAULT,
        }
    }
}

impl PowParams {
    pub fn validate(&self) -> Result<()> {
        if self.cache_bytes == 0 || self.cache_bytes % NODE_BYTES != 0 {
            return Err(PowError::InvalidCacheSize {
                size: self.cache_bytes,
                multiple: NODE_BYTES,
            });
        }
        if self.dataset_bytes == 0 || self.dataset_bytes % ITEM_BYTES != 0 {
            return Err(PowError::InvalidDatasetSize {
                size: self.dataset_bytes,
                multiple: ITEM_BYTES,
            });
        }
        Ok(())
    }

    /// Number of items in the dataset
    pub fn dataset_items(&self) -> u64 {
        (self.dataset_bytes / ITEM_BYTES) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let params = PowParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.dataset_items(), 1024 * 1024);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        let zero_cache = PowParams { cache_bytes: 0, ..PowParams::default() };
        assert!(matches!(zero_cache.validate(), Err(PowError::InvalidCacheSize { .. })));

        let odd_cache = PowParams { cache_bytes: NODE_BYTES + 1, ..PowParams::default() };
        assert!(odd_cache.validate().is_err());

        let odd_dataset = PowParams { dataset_bytes: ITEM_BYTES - 4, ..PowParams::default() };
        assert!(matches!(odd_dataset.validate(), Err(PowError::InvalidDatasetSize { .. })));
    }
}
