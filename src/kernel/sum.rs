//! Sum of subsequence kernels over a range of lengths
//!
//! [`SumStringKernel`] owns one [`StringKernel`] per length in
//! `min_kn..=max_kn`, encodes the input once and hands the same `Arc<Dataset>`
//! to every engine. The per-length matrices are summed and, when requested,
//! cosine-normalized with the summed self-kernels.
//!
//! ```rust
//! use rssk::core::KernelConfig;
//! use rssk::kernel::SumStringKernel;
//!
//! # fn main() -> rssk::core::Result<()> {
//! let mut kernel = SumStringKernel::<f64>::new(KernelConfig::with_lengths(1, 3))?;
//! kernel.set_data(&["gattaca", "tacata", "attack"])?;
//! kernel.compute_kernel()?;
//!
//! let values = kernel.values()?;
//! assert_eq!(values.get(0, 0), 1.0);
//! assert_eq!(values.get(0, 1), values.get(1, 0));
//! # Ok(())
//! # }
//! ```

use crate::core::{KernelConfig, KernelError, KernelFloat, KernelMatrix, Result};
use crate::data::{Dataset, EncodedSequence, Symbol};
use crate::kernel::{gap_weighted_kernel, in_pool, DpWorkspace, StringKernel};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::Arc;

/// Aggregate of per-length string kernels
#[derive(Debug)]
pub struct SumStringKernel<T: KernelFloat> {
    config: KernelConfig,
    engines: Vec<StringKernel<T>>,
    data: Option<Arc<Dataset>>,
    kernel: Option<KernelMatrix<T>>,
    norms: Option<Vec<T>>,
}

impl<T: KernelFloat> SumStringKernel<T> {
    /// Validate `config` and create one engine per length
    ///
    /// Engines never normalize on their own; normalization happens once on
    /// the summed matrix.
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.validate()?;
        let engines = (config.min_kn..=config.max_kn)
            .map(|k| StringKernel::new(k, config.lambda, config.matching.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            engines,
            data: None,
            kernel: None,
            norms: None,
        })
    }

    /// Encode `strings` once and share them with every engine
    pub fn set_data<S: AsRef<str>>(&mut self, strings: &[S]) -> Result<()> {
        let mut dataset = Dataset::with_encoding(
            self.config.max_length,
            self.config.symbol_size,
            self.config.encoding,
        );
        dataset.load_strings(strings)?;
        self.bind(Arc::new(dataset))
    }

    /// Use already tokenized sequences
    ///
    /// The configured text encoding does not apply; cross kernels against a
    /// tokenized dataset take tokens too
    /// ([`compute_cross_tokens`](Self::compute_cross_tokens)).
    pub fn set_tokens(&mut self, tokens: &[Vec<Symbol>]) -> Result<()> {
        let mut dataset = Dataset::new(self.config.max_length, self.config.symbol_size);
        dataset.load_tokens(tokens)?;
        self.bind(Arc::new(dataset))
    }

    /// Use a dataset encoded elsewhere, which must share this kernel's bounds
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) -> Result<()> {
        if dataset.is_empty() {
            return Err(KernelError::EmptyDataset);
        }
        if dataset.symbol_size() != self.config.symbol_size
            || dataset.max_length() != self.config.max_length
        {
            return Err(KernelError::InvalidParameter(format!(
                "dataset bounds (symbol_size {}, max_length {}) differ from the kernel's ({}, {})",
                dataset.symbol_size(),
                dataset.max_length(),
                self.config.symbol_size,
                self.config.max_length
            )));
        }
        self.bind(dataset)
    }

    fn bind(&mut self, dataset: Arc<Dataset>) -> Result<()> {
        let short = dataset
            .iter()
            .filter(|s| s.len() < self.config.min_kn)
            .count();
        if short > 0 {
            warn!(
                "{} of {} sequences are shorter than min_kn={} and have zero self-similarity at that length",
                short,
                dataset.len(),
                self.config.min_kn
            );
        }

        for engine in &mut self.engines {
            engine.set_data(Arc::clone(&dataset))?;
        }
        self.data = Some(dataset);
        self.kernel = None;
        self.norms = None;
        Ok(())
    }

    /// Compute every per-length kernel, sum them and normalize
    pub fn compute_kernel(&mut self) -> Result<()> {
        let data = self.data.clone().ok_or(KernelError::DataNotSet)?;
        self.kernel = None;
        self.norms = None;

        let n = data.len();
        let normalize = self.config.normalize;
        let mut kernel = KernelMatrix::square(n)?;

        debug!(
            "Computing lengths {}..={} over {} sequences",
            self.config.min_kn, self.config.max_kn, n
        );
        let engines = &mut self.engines;
        in_pool(self.config.threads, || {
            engines.par_iter_mut().try_for_each(|engine| {
                engine.compute_kernel()?;
                if normalize {
                    engine.compute_norms()?;
                }
                Ok::<(), KernelError>(())
            })
        })??;

        let matrices = self
            .engines
            .iter()
            .map(|engine| engine.values())
            .collect::<Result<Vec<_>>>()?;
        for i in 0..n {
            for j in i..n {
                let value = matrices.iter().map(|m| m.get(i, j)).sum();
                kernel.set_symmetric(i, j, value);
            }
        }

        if normalize {
            let mut total = vec![T::zero(); n];
            for engine in &self.engines {
                let norms = engine.norms().ok_or(KernelError::NotComputed)?;
                for (sum, &norm) in total.iter_mut().zip(norms) {
                    *sum += norm;
                }
            }
            kernel.normalize_symmetric(&total)?;
            self.norms = Some(total);
        }

        info!(
            "Computed {}x{} kernel summing {} length(s)",
            n,
            n,
            self.engines.len()
        );
        self.kernel = Some(kernel);
        Ok(())
    }

    /// Kernel of `queries` (rows) against the bound dataset (columns)
    ///
    /// Summed over the same lengths and, when normalization is enabled,
    /// divided by the square roots of both sides' summed self-kernels.
    pub fn compute_cross_kernel<S: AsRef<str>>(&self, queries: &[S]) -> Result<KernelMatrix<T>> {
        let data = self.data.as_ref().ok_or(KernelError::DataNotSet)?;
        let encoded = data.encode(queries)?;
        self.cross(data, &encoded)
    }

    /// Cross kernel of tokenized queries against the bound dataset
    pub fn compute_cross_tokens(&self, queries: &[Vec<Symbol>]) -> Result<KernelMatrix<T>> {
        let data = self.data.as_ref().ok_or(KernelError::DataNotSet)?;
        let encoded = data.encode_tokens(queries)?;
        self.cross(data, &encoded)
    }

    fn cross(&self, data: &Dataset, encoded: &[EncodedSequence]) -> Result<KernelMatrix<T>> {
        let n = data.len();
        let mut cross = KernelMatrix::zeros(encoded.len(), n)?;

        in_pool(self.config.threads, || {
            cross
                .as_mut_slice()
                .par_chunks_mut(n)
                .zip(encoded.par_iter())
                .for_each_init(DpWorkspace::new, |workspace, (row, query)| {
                    for (cell, s) in row.iter_mut().zip(data.iter()) {
                        *cell = self.summed(query.symbols(), s.symbols(), workspace);
                    }
                });
        })?;

        if self.config.normalize {
            let row_norms = self.self_kernels(encoded)?;
            let col_norms = match &self.norms {
                Some(norms) => norms.clone(),
                None => self.self_kernels(data.sequences())?,
            };
            cross.normalize_cross(&row_norms, &col_norms)?;
        }
        Ok(cross)
    }

    fn summed(&self, s: &[Symbol], t: &[Symbol], workspace: &mut DpWorkspace<T>) -> T {
        gap_weighted_kernel(
            s,
            t,
            self.config.min_kn,
            self.config.max_kn,
            T::from_f64(self.config.lambda),
            &self.config.matching,
            workspace,
        )
    }

    fn self_kernels(&self, sequences: &[EncodedSequence]) -> Result<Vec<T>> {
        in_pool(self.config.threads, || {
            sequences
                .par_iter()
                .map_init(DpWorkspace::new, |workspace, s| {
                    self.summed(s.symbols(), s.symbols(), workspace)
                })
                .collect()
        })
    }

    /// The aggregate matrix
    pub fn values(&self) -> Result<&KernelMatrix<T>> {
        self.kernel.as_ref().ok_or(KernelError::NotComputed)
    }

    /// Consume the kernel, keeping only the aggregate matrix
    pub fn into_values(self) -> Result<KernelMatrix<T>> {
        self.kernel.ok_or(KernelError::NotComputed)
    }

    /// Summed self-kernels, present when normalization was applied
    pub fn norms(&self) -> Option<&[T]> {
        self.norms.as_deref()
    }

    /// Copy the flattened n×n matrix into `buffer`
    pub fn copy_kernel(&self, buffer: &mut [T]) -> Result<()> {
        self.values()?.copy_to(buffer)
    }

    /// K[0][1], the similarity of the first two sequences
    pub fn similarity(&self) -> Result<T> {
        let values = self.values()?;
        if values.rows() < 2 {
            return Err(KernelError::InvalidParameter(format!(
                "similarity needs at least 2 sequences, got {}",
                values.rows()
            )));
        }
        Ok(values.get(0, 1))
    }

    /// Number of lengths aggregated
    pub fn size(&self) -> usize {
        self.engines.len()
    }

    /// Number of sequences bound
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Engine for subsequence length `k`
    pub fn engine(&self, k: usize) -> Option<&StringKernel<T>> {
        k.checked_sub(self.config.min_kn)
            .and_then(|offset| self.engines.get(offset))
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.data.as_ref()
    }
}
