//! High-level API for string kernel computation
//!
//! This module wraps [`SumStringKernel`] in a builder and adds helpers for
//! the common one-shot and pairwise cases.
//!
//! # Quick Start
//!
//! ```rust
//! use rssk::api::StringKernelBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let kernel = StringKernelBuilder::new()
//!     .with_lengths(1, 3)
//!     .with_lambda(0.75)
//!     .compute::<f64, _>(&["CARDRG", "CARDRGY", "GGYFDY"])?;
//!
//! assert_eq!(kernel.rows(), 3);
//! assert_eq!(kernel.get(1, 1), 1.0);
//! # Ok(())
//! # }
//! ```

use crate::cache::{CacheStats, NormCache};
use crate::core::{KernelConfig, KernelError, KernelFloat, KernelMatrix, Result, SymbolEncoding};
use crate::data::Dataset;
use crate::kernel::{gap_weighted_kernel, DpWorkspace, MatchMode, SumStringKernel};

/// Builder for string kernel parameters
#[derive(Debug, Clone, Default)]
pub struct StringKernelBuilder {
    config: KernelConfig,
}

impl StringKernelBuilder {
    /// Start from the default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Sum subsequence lengths `min_kn..=max_kn`
    pub fn with_lengths(mut self, min_kn: usize, max_kn: usize) -> Self {
        self.config.min_kn = min_kn;
        self.config.max_kn = max_kn;
        self
    }

    /// Set the gap decay factor
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.lambda = lambda;
        self
    }

    /// Enable or disable cosine normalization
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    /// Set the alphabet size
    pub fn with_symbol_size(mut self, symbol_size: usize) -> Self {
        self.config.symbol_size = symbol_size;
        self
    }

    /// Set the longest accepted sequence
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.config.max_length = max_length;
        self
    }

    /// Run on a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    pub fn with_encoding(mut self, encoding: SymbolEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn with_matching(mut self, matching: MatchMode) -> Self {
        self.config.matching = matching;
        self
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Build the aggregate kernel without data
    pub fn build<T: KernelFloat>(self) -> Result<SumStringKernel<T>> {
        SumStringKernel::new(self.config)
    }

    /// Compute the kernel matrix of `sequences`
    pub fn compute<T: KernelFloat, S: AsRef<str>>(self, sequences: &[S]) -> Result<KernelMatrix<T>> {
        let mut kernel = self.build::<T>()?;
        kernel.set_data(sequences)?;
        kernel.compute_kernel()?;
        kernel.into_values()
    }

    /// Similarity of two sequences, K[0][1] of their 2×2 kernel
    pub fn similarity<T: KernelFloat>(self, a: &str, b: &str) -> Result<T> {
        let mut kernel = self.build::<T>()?;
        kernel.set_data(&[a, b])?;
        kernel.compute_kernel()?;
        kernel.similarity()
    }

    /// Scorer for many pairs that remembers self-kernels
    pub fn scorer<T: KernelFloat>(self, cache_capacity: usize) -> Result<PairwiseScorer<T>> {
        PairwiseScorer::new(self.config, cache_capacity)
    }
}

/// Scores pairs of sequences one at a time
///
/// Equivalent to computing the 2×2 aggregate kernel of each pair and taking
/// K[0][1], without building the matrix. Self-kernels used for normalization
/// are cached across calls.
pub struct PairwiseScorer<T: KernelFloat> {
    config: KernelConfig,
    norms: NormCache<T>,
    workspace: DpWorkspace<T>,
}

impl<T: KernelFloat> PairwiseScorer<T> {
    pub fn new(config: KernelConfig, cache_capacity: usize) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            norms: NormCache::new(cache_capacity),
            workspace: DpWorkspace::new(),
        })
    }

    /// Similarity of `a` and `b`
    pub fn score(&mut self, a: &str, b: &str) -> Result<T> {
        let mut dataset = Dataset::with_encoding(
            self.config.max_length,
            self.config.symbol_size,
            self.config.encoding,
        );
        dataset.load_strings(&[a, b])?;
        let (s, t) = (dataset.get(0).symbols(), dataset.get(1).symbols());

        let Self {
            config,
            norms,
            workspace,
        } = self;
        let lambda = T::from_f64(config.lambda);
        let mut kernel = |x: &[u32], y: &[u32]| {
            gap_weighted_kernel(
                x,
                y,
                config.min_kn,
                config.max_kn,
                lambda,
                &config.matching,
                workspace,
            )
        };

        let raw = kernel(s, t);
        if !config.normalize {
            return Ok(raw);
        }

        let norm_a = norms.get_or_insert_with(a, || kernel(s, s));
        let norm_b = norms.get_or_insert_with(b, || kernel(t, t));
        for (index, value) in [(0, norm_a), (1, norm_b)] {
            if !(value > T::zero()) || !value.is_finite() {
                return Err(KernelError::DegenerateNorm {
                    index,
                    value: value.to_f64(),
                });
            }
        }
        Ok(raw / (norm_a * norm_b).sqrt())
    }

    /// Statistics of the self-kernel cache
    pub fn cache_stats(&self) -> CacheStats {
        self.norms.stats()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}

/// Convenience functions with default parameters
pub mod quick {
    use super::*;

    /// Normalized kernel over lengths 1..=2 with λ = 0.5
    pub fn kernel_matrix<S: AsRef<str>>(sequences: &[S]) -> Result<KernelMatrix<f64>> {
        StringKernelBuilder::new().compute(sequences)
    }

    /// Normalized similarity of two sequences with default parameters
    pub fn similarity(a: &str, b: &str) -> Result<f64> {
        StringKernelBuilder::new().similarity(a, b)
    }
}
