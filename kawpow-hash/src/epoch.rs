//! Epoch arithmetic and the process-wide seed registry.
//!
//! One [`EpochManager`] instance owns the main seed hash and the
//! cache/dataset built for it. Readers capture `Arc` handles under short
//! read locks and run the expensive mixing loop lock-free; writers swap
//! wholesale. Critical sections never block on anything but the lock
//! itself.

use crate::cache::Cache;
use crate::common::hash_types::SeedHash;
use crate::dataset::{DagView, Dataset};
use crate::error::{PowError, Result};
use crate::mix;
use crate::params::PowParams;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Blocks per epoch: one cache/dataset pair
pub const EPOCH_LENGTH: u64 = 7500;
/// Blocks per period: one random program
pub const PERIOD_LENGTH: u64 = 3;

/// First block height of the epoch containing `height`
pub fn seed_height(height: u64) -> u64 {
    (height / EPOCH_LENGTH) * EPOCH_LENGTH
}

/// Epoch boundaries around `height`: its seed height and the next one
pub fn seed_heights(height: u64) -> (u64, u64) {
    let seed = seed_height(height);
    (seed, seed + EPOCH_LENGTH)
}

/// Epoch index of `height`
pub fn epoch(height: u64) -> u64 {
    height / EPOCH_LENGTH
}

/// Period index of `height`
pub fn period(height: u64) -> u64 {
    height / PERIOD_LENGTH
}

/// Main seed hash plus the cache built for it, guarded as one unit so a
/// reader can never pair a seed with another seed's cache.
struct MainSlot {
    seed: SeedHash,
    set: bool,
    cache: Option<Arc<Cache>>,
}

/// Process-wide registry of the main seed hash and its structures.
///
/// Exactly one seed hash is "main" at a time; replacing it is atomic from
/// the reader's point of view. Verification against any other seed is
/// served from a private secondary cache in light mode.
pub struct EpochManager {
    params: PowParams,
    main: RwLock<MainSlot>,
    dataset: RwLock<Option<Arc<Dataset>>>,
    secondary: RwLock<Option<(SeedHash, Arc<Cache>)>>,
}

impl EpochManager {
    pub fn new(params: PowParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            main: RwLock::new(MainSlot {
                seed: SeedHash::default(),
                set: false,
                cache: None,
            }),
            dataset: RwLock::new(None),
            secondary: RwLock::new(None),
        })
    }

    pub fn params(&self) -> &PowParams {
        &self.params
    }

    /// Replace the main seed hash.
    ///
    /// Structures installed for a previous seed are dropped in the same
    /// swap, so no reader can observe the new seed paired with stale data.
    /// Setting the current main seed again is a no-op.
    pub fn set_main_seed_hash(&self, seed: &SeedHash) {
        {
            let mut main = self.main.write().unwrap();
            if main.set && main.seed == *seed {
                return;
            }
            main.seed = *seed;
            main.set = true;
            main.cache = None;
        }
        *self.dataset.write().unwrap() = None;
        info!(seed = %seed, "new main seed hash");
    }

    /// True iff a main seed hash has been set and equals `seed`
    pub fn is_main(&self, seed: &SeedHash) -> bool {
        let main = self.main.read().unwrap();
        main.set && main.seed == *seed
    }

    /// Publish a cache built for the current main seed
    pub fn install_cache(&self, cache: Arc<Cache>) -> Result<()> {
        let mut main = self.main.write().unwrap();
        if !main.set {
            return Err(PowError::NotReady);
        }
        if *cache.seed() != main.seed {
            return Err(PowError::SeedMismatch {
                what: "cache",
                built_for: cache.seed().to_hex(),
                main: main.seed.to_hex(),
            });
        }
        main.cache = Some(cache);
        Ok(())
    }

    /// Publish a dataset built for the current main seed
    pub fn install_dataset(&self, dataset: Arc<Dataset>) -> Result<()> {
        {
            let main = self.main.read().unwrap();
            if !main.set {
                return Err(PowError::NotReady);
            }
            if *dataset.seed() != main.seed {
                return Err(PowError::SeedMismatch {
                    what: "dataset",
                    built_for: dataset.seed().to_hex(),
                    main: main.seed.to_hex(),
                });
            }
        }
        *self.dataset.write().unwrap() = Some(dataset);
        Ok(())
    }

    /// Hash `header` at `height` under `seed`.
    ///
    /// The main seed uses the installed cache, plus the installed dataset
    /// when present (light mode otherwise). Any other seed is served from a
    /// private secondary cache in light mode, built on first use. Handles
    /// are captured under short read locks; the mixing loop itself runs
    /// lock-free.
    // TODO: memoize the period program once the mining scheduler hashes
    // many nonces per block through this entry point
    pub fn compute_hash(&self, seed: &SeedHash, header: &[u8], height: u64) -> Result<[u8; 32]> {
        if self.is_main(seed) {
            let cache = self.main.read().unwrap().cache.clone().ok_or(PowError::NotReady)?;
            if cache.seed() != seed {
                // The main seed moved between the check and the capture
                return Err(PowError::NotReady);
            }
            let dataset = self.dataset.read().unwrap().clone();

            let hash = match dataset {
                Some(ref ds) if ds.seed() == seed => {
                    mix::compute_hash(&cache, &DagView::Full(ds), header, height)
                }
                _ => {
                    let dag = DagView::Light {
                        cache: &cache,
                        items: self.params.dataset_items(),
                    };
                    mix::compute_hash(&cache, &dag, header, height)
                }
            };
            return Ok(hash);
        }

        let cache = self.secondary_cache(seed)?;
        let dag = DagView::Light {
            cache: &cache,
            items: self.params.dataset_items(),
        };
        Ok(mix::compute_hash(&cache, &dag, header, height))
    }

    /// Get or build the private cache for a non-main seed
    fn secondary_cache(&self, seed: &SeedHash) -> Result<Arc<Cache>> {
        {
            let slot = self.secondary.read().unwrap();
            if let Some((s, cache)) = slot.as_ref() {
                if s == seed {
                    return Ok(Arc::clone(cache));
                }
            }
        }

        // Build outside any lock; the write below is a pointer swap
        debug!(seed = %seed, "building secondary cache");
        let cache = Arc::new(Cache::build(seed, self.params.cache_bytes)?);

        let mut slot = self.secondary.write().unwrap();
        match slot.as_ref() {
            // Another thread won the race; reuse its cache
            Some((s, existing)) if s == seed => Ok(Arc::clone(existing)),
            _ => {
                *slot = Some((*seed, Arc::clone(&cache)));
                Ok(cache)
            }
        }
    }
}
