//! Dataset (DAG) construction and access.
//!
//! The dataset is the large structure the mixing loop reads from. Each
//! 1 KiB item is a pure function of the cache and its own index, so items
//! can be generated in any order, by any number of workers, with no
//! synchronization.

use crate::cache::Cache;
use crate::common::hash_types::SeedHash;
use crate::error::{PowError, Result};
use crate::fnv::{fnv1a, FNV_OFFSET_BASIS};
use rayon::prelude::*;
use std::ops::Range;
use tracing::info;

/// Bytes per dataset item
pub const ITEM_BYTES: usize = 1024;
/// Words per dataset item
pub const ITEM_WORDS: usize = ITEM_BYTES / 4;
/// Pseudorandom cache windows folded into each item
pub const ITEM_PARENTS: usize = 64;

/// Derive dataset item `index` from the cache into `out` (`ITEM_WORDS`
/// words). This is the single definition of item content; full generation
/// and light verification both go through it.
pub fn build_item(cache: &Cache, index: u64, out: &mut [u32]) {
    debug_assert_eq!(out.len(), ITEM_WORDS);
    let n = cache.num_words();
    let ix = index as u32;

    // Working set: a cache window selected by the item index
    let base = fnv1a(FNV_OFFSET_BASIS, ix) as usize % n;
    for (j, word) in out.iter_mut().enumerate() {
        *word = cache.word((base + j) % n);
    }
    out[0] ^= ix;
    out[1] ^= (index >> 32) as u32;

    // Fold ITEM_PARENTS pseudorandom cache windows into the working set
    for p in 0..ITEM_PARENTS as u32 {
        let parent = fnv1a(ix ^ p, out[p as usize % ITEM_WORDS]) as usize % n;
        for (j, word) in out.iter_mut().enumerate() {
            *word = fnv1a(*word, cache.word((parent + j) % n));
        }
    }
}

/// Split `item_count` items into at most `workers` disjoint contiguous
/// ranges covering every item exactly once. Callers hand each range to one
/// background builder; ranges are write-disjoint by construction.
pub fn item_ranges(item_count: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = workers.max(1) as u64;
    let per_worker = item_count / workers;
    let extra = item_count % workers;

    let mut ranges = Vec::new();
    let mut start = 0;
    for w in 0..workers {
        let len = per_worker + u64::from(w < extra);
        if len == 0 {
            break;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Owned dataset buffer for one epoch. Read-only once built.
pub struct Dataset {
    seed: SeedHash,
    words: Vec<u32>,
}

impl Dataset {
    /// Allocate a zeroed dataset of `size_bytes`; contents are filled by
    /// [`Dataset::init_range`] or [`Dataset::generate`].
    ///
    /// `size_bytes` must be a non-zero multiple of [`ITEM_BYTES`]. An
    /// allocation failure is reported as an error, never as a partial
    /// buffer.
    pub fn new(seed: &SeedHash, size_bytes: usize) -> Result<Dataset> {
        if size_bytes == 0 || size_bytes % ITEM_BYTES != 0 {
            return Err(PowError::InvalidDatasetSize {
                size: size_bytes,
                multiple: ITEM_BYTES,
            });
        }
        let num_words = size_bytes / 4;
        let mut words: Vec<u32> = Vec::new();
        words
            .try_reserve_exact(num_words)
            .map_err(|_| PowError::Allocation {
                what: "dataset",
                size: size_bytes,
            })?;
        words.resize(num_words, 0);
        Ok(Dataset {
            seed: *seed,
            words,
        })
    }

    /// Fill items `[start_item, start_item + item_count)` from the cache.
    ///
    /// The range is clamped to the dataset's remaining capacity and never
    /// written out of bounds; returns the number of items actually written.
    pub fn init_range(&mut self, cache: &Cache, start_item: u64, item_count: u64) -> u64 {
        let items = self.item_count();
        if start_item >= items {
            return 0;
        }
        let count = item_count.min(items - start_item);
        let start = start_item as usize * ITEM_WORDS;
        let end = (start_item + count) as usize * ITEM_WORDS;
        for (k, chunk) in self.words[start..end].chunks_exact_mut(ITEM_WORDS).enumerate() {
            build_item(cache, start_item + k as u64, chunk);
        }
        count
    }

    /// Build a complete dataset from `cache`, generating items in parallel.
    pub fn generate(cache: &Cache, size_bytes: usize) -> Result<Dataset> {
        let mut dataset = Dataset::new(cache.seed(), size_bytes)?;
        info!(
            seed = %cache.seed(),
            size = size_bytes,
            items = dataset.item_count(),
            "generating dataset"
        );
        dataset
            .words
            .par_chunks_exact_mut(ITEM_WORDS)
            .enumerate()
            .for_each(|(i, chunk)| build_item(cache, i as u64, chunk));
        info!("dataset generation complete");
        Ok(dataset)
    }

    /// Seed hash this dataset was built from
    pub fn seed(&self) -> &SeedHash {
        &self.seed
    }

    /// Number of items in the dataset
    pub fn item_count(&self) -> u64 {
        (self.words.len() / ITEM_WORDS) as u64
    }

    /// Dataset length in 32-bit words
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Dataset length in bytes
    pub fn size_bytes(&self) -> usize {
        self.words.len() * 4
    }

    /// Read one dataset word
    #[inline(always)]
    pub fn word(&self, index: usize) -> u32 {
        self.words[index]
    }
}

/// Dataset words as seen by the mixing loop: either the materialized buffer
/// ("full" mode) or items recomputed from the cache on demand ("light"
/// mode, used when verifying against a seed whose dataset was never built).
/// Both views return identical words for identical indices.
pub enum DagView<'a> {
    Full(&'a Dataset),
    Light { cache: &'a Cache, items: u64 },
}

impl DagView<'_> {
    /// Total dataset words visible through this view
    pub fn num_words(&self) -> usize {
        match self {
            DagView::Full(dataset) => dataset.num_words(),
            DagView::Light { items, .. } => *items as usize * ITEM_WORDS,
        }
    }

    /// Read `out.len()` consecutive words starting at `word_index`. The
    /// caller keeps the read inside a single item.
    pub fn load(&self, word_index: usize, out: &mut [u32]) {
        match self {
            DagView::Full(dataset) => {
                for (k, word) in out.iter_mut().enumerate() {
                    *word = dataset.word(word_index + k);
                }
            }
            DagView::Light { cache, .. } => {
                let item = (word_index / ITEM_WORDS) as u64;
                let offset = word_index % ITEM_WORDS;
                let mut scratch = [0u32; ITEM_WORDS];
                build_item(cache, item, &mut scratch);
                out.copy_from_slice(&scratch[offset..offset + out.len()]);
            }
        }
    }
}
