//! Self-kernel cache
//!
//! Normalizing a pairwise score needs both sequences' summed self-kernels.
//! When many pairs are scored one at a time, the same sequences recur, so the
//! self-kernels are kept in an LRU cache keyed by the raw sequence.

use crate::core::KernelFloat;
use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache of summed self-kernels
pub struct NormCache<T> {
    cache: LruCache<String, T>,
    hits: u64,
    misses: u64,
}

impl<T: KernelFloat> NormCache<T> {
    /// Create a cache holding at most `capacity` sequences
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached self-kernel of `sequence`
    pub fn get(&mut self, sequence: &str) -> Option<T> {
        if let Some(&value) = self.cache.get(sequence) {
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    pub fn put(&mut self, sequence: &str, value: T) {
        self.cache.put(sequence.to_string(), value);
    }

    /// Cached value, or `compute` it and remember the result
    pub fn get_or_insert_with<F>(&mut self, sequence: &str, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self.get(sequence) {
            Some(value) => value,
            None => {
                let value = compute();
                self.put(sequence, value);
                value
            }
        }
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}
