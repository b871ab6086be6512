//! Content-addressed cache of extraction results.
//!
//! Extraction is a pure function of the input bytes, so results are keyed by
//! the SHA-256 digest of the whole file. Two paths holding identical bytes
//! share one entry, and an edited file never hits a stale one.
//!
//! Only successful extractions are stored. A failed extraction is returned to
//! the caller and retried on the next request.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::LayerError;
use crate::extract::{extract_layers_with, ExtractOptions, TiffLayerData};

/// Default number of cached results.
pub const DEFAULT_CACHE_ENTRIES: usize = 64;

/// Lowercase hex SHA-256 of `data`.
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

// =============================================================================
// Layer Cache
// =============================================================================

/// LRU cache of [`TiffLayerData`] keyed by content fingerprint.
///
/// The cache is `Sync` and can be shared between threads behind an `Arc`.
///
/// # Example
///
/// ```no_run
/// use tiff_layers::LayerCache;
///
/// let cache = LayerCache::new(16);
/// let data = std::fs::read("layered.tif").unwrap();
/// let layers = cache.get_or_extract(data).unwrap();
/// println!("{} layers", layers.total_layers);
/// ```
pub struct LayerCache {
    entries: Mutex<LruCache<String, Arc<TiffLayerData>>>,
    options: ExtractOptions,
}

impl LayerCache {
    /// Create a cache holding at most `max_entries` results.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(max_entries: usize) -> Self {
        Self::with_options(max_entries, ExtractOptions::default())
    }

    /// Create a cache that extracts with the given options.
    pub fn with_options(max_entries: usize, options: ExtractOptions) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            options,
        }
    }

    /// Cached result for a fingerprint, if present.
    pub fn get(&self, fingerprint: &str) -> Option<Arc<TiffLayerData>> {
        self.lock().get(fingerprint).cloned()
    }

    /// Return the cached result for `data`, extracting on a miss.
    ///
    /// The lock is not held while extracting, so two threads missing on the
    /// same content may both extract; the later insert wins.
    pub fn get_or_extract(&self, data: impl Into<Bytes>) -> Result<Arc<TiffLayerData>, LayerError> {
        let data = data.into();
        let key = fingerprint(&data);

        if let Some(hit) = self.get(&key) {
            debug!(fingerprint = %key, "Layer cache hit");
            return Ok(hit);
        }

        let extracted = Arc::new(extract_layers_with(data, &self.options)?);
        debug!(
            fingerprint = %key,
            layers = extracted.total_layers,
            "Layer cache miss, stored result"
        );
        self.lock().put(key, Arc::clone(&extracted));

        Ok(extracted)
    }

    /// Whether a result for this fingerprint is cached. Does not touch LRU order.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.lock().contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of cached results.
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<TiffLayerData>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LayerCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ENTRIES)
    }
}

// =============================================================================
// Tests
// =============================================================================
