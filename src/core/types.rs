//! Core type definitions for string kernels

use crate::core::{KernelError, KernelFloat, Result};
use crate::kernel::MatchMode;

/// How raw text is mapped onto alphabet indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolEncoding {
    /// Each UTF-8 byte is its own symbol index
    #[default]
    Bytes,
    /// Characters get dense indices in order of first appearance
    Compact,
}

/// Parameters of a (sum of) subsequence string kernel(s)
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Smallest subsequence length summed
    pub min_kn: usize,
    /// Largest subsequence length summed
    pub max_kn: usize,
    /// Cosine-normalize the aggregate kernel
    pub normalize: bool,
    /// Alphabet size, symbols are in [0, symbol_size)
    pub symbol_size: usize,
    /// Longest sequence accepted
    pub max_length: usize,
    /// Gap decay factor, in (0, 1]
    pub lambda: f64,
    /// Size of a dedicated worker pool, `None` uses the global rayon pool
    pub threads: Option<usize>,
    /// Text to symbol mapping
    pub encoding: SymbolEncoding,
    /// Symbol comparison used at the last subsequence position
    pub matching: MatchMode,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            min_kn: 1,
            max_kn: 2,
            normalize: true,
            symbol_size: 255,
            max_length: 1000,
            lambda: 0.5,
            threads: None,
            encoding: SymbolEncoding::Bytes,
            matching: MatchMode::Hard,
        }
    }
}

impl KernelConfig {
    /// Config summing lengths `min_kn..=max_kn` with default everything else
    pub fn with_lengths(min_kn: usize, max_kn: usize) -> Self {
        Self {
            min_kn,
            max_kn,
            ..Self::default()
        }
    }

    /// Set the decay factor
    pub fn lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Enable or disable normalization
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Number of distinct lengths summed
    pub fn n_lengths(&self) -> usize {
        self.max_kn.saturating_sub(self.min_kn) + 1
    }

    /// Check every parameter, before anything is allocated
    pub fn validate(&self) -> Result<()> {
        if self.min_kn == 0 {
            return Err(KernelError::InvalidParameter(
                "min_kn must be at least 1".to_string(),
            ));
        }
        if self.min_kn > self.max_kn {
            return Err(KernelError::InvalidParameter(format!(
                "min_kn ({}) must not exceed max_kn ({})",
                self.min_kn, self.max_kn
            )));
        }
        if self.max_length == 0 {
            return Err(KernelError::InvalidParameter(
                "max_length must be at least 1".to_string(),
            ));
        }
        if self.max_kn > self.max_length {
            return Err(KernelError::InvalidParameter(format!(
                "max_kn ({}) must not exceed max_length ({})",
                self.max_kn, self.max_length
            )));
        }
        if self.symbol_size == 0 {
            return Err(KernelError::InvalidParameter(
                "symbol_size must be at least 1".to_string(),
            ));
        }
        if !self.lambda.is_finite() || self.lambda <= 0.0 || self.lambda > 1.0 {
            return Err(KernelError::InvalidParameter(format!(
                "lambda must be in (0, 1], got {}",
                self.lambda
            )));
        }
        if self.threads == Some(0) {
            return Err(KernelError::InvalidParameter(
                "threads must be at least 1".to_string(),
            ));
        }
        self.matching.validate(self.symbol_size)
    }
}

/// Dense kernel matrix stored row-major in one contiguous buffer
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: KernelFloat> KernelMatrix<T> {
    /// Allocate a zero-filled matrix, reporting allocation failure
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or(KernelError::AllocationFailed { rows, cols })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| KernelError::AllocationFailed { rows, cols })?;
        data.resize(len, T::zero());
        Ok(Self { rows, cols, data })
    }

    /// Allocate a zero-filled n×n matrix
    pub fn square(n: usize) -> Result<Self> {
        Self::zeros(n, n)
    }

    /// Wrap an existing row-major buffer
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or(KernelError::AllocationFailed { rows, cols })?;
        if data.len() != expected {
            return Err(KernelError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Value at (i, j)
    ///
    /// # Panics
    /// Panics if the position is out of bounds
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j] = value;
    }

    /// Set (i, j) and (j, i)
    #[inline]
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: T) {
        self.set(i, j, value);
        self.set(j, i, value);
    }

    /// One row as a slice
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Flat row-major view
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Flat row-major mutable view
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copy the upper triangle of a square matrix onto the lower one
    pub fn mirror_upper(&mut self) {
        debug_assert!(self.is_square());
        let n = self.rows;
        for i in 1..n {
            for j in 0..i {
                self.data[i * n + j] = self.data[j * n + i];
            }
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Main diagonal (up to the shorter dimension)
    pub fn diagonal(&self) -> Vec<T> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    /// Whether K[i][j] and K[j][i] differ by at most `tolerance` everywhere
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.rows).all(|i| {
            (i + 1..self.cols).all(|j| {
                (self.get(i, j).to_f64() - self.get(j, i).to_f64()).abs() <= tolerance
            })
        })
    }

    /// Copy the flattened matrix into a caller-owned buffer of exactly rows×cols
    pub fn copy_to(&self, buffer: &mut [T]) -> Result<()> {
        if buffer.len() != self.data.len() {
            return Err(KernelError::DimensionMismatch {
                expected: self.data.len(),
                actual: buffer.len(),
            });
        }
        buffer.copy_from_slice(&self.data);
        Ok(())
    }

    /// Widen every value to `f64`
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.data.iter().map(|v| v.to_f64()).collect()
    }

    /// Cosine-normalize a square kernel with the given self-kernels
    ///
    /// Off-diagonal entries become K[i][j] / sqrt(norms[i] * norms[j]) and the
    /// diagonal is set to exactly one. The matrix is left untouched on error.
    pub fn normalize_symmetric(&mut self, norms: &[T]) -> Result<()> {
        if !self.is_square() || norms.len() != self.rows {
            return Err(KernelError::DimensionMismatch {
                expected: self.rows,
                actual: norms.len(),
            });
        }
        check_norms(norms)?;

        let n = self.rows;
        for i in 0..n {
            self.set(i, i, T::one());
            for j in i + 1..n {
                let value = self.get(i, j) / (norms[i] * norms[j]).sqrt();
                self.set_symmetric(i, j, value);
            }
        }
        Ok(())
    }

    /// Cosine-normalize a rectangular kernel with row and column self-kernels
    pub fn normalize_cross(&mut self, row_norms: &[T], col_norms: &[T]) -> Result<()> {
        if row_norms.len() != self.rows {
            return Err(KernelError::DimensionMismatch {
                expected: self.rows,
                actual: row_norms.len(),
            });
        }
        if col_norms.len() != self.cols {
            return Err(KernelError::DimensionMismatch {
                expected: self.cols,
                actual: col_norms.len(),
            });
        }
        check_norms(row_norms)?;
        check_norms(col_norms)?;

        for i in 0..self.rows {
            for j in 0..self.cols {
                let value = self.get(i, j) / (row_norms[i] * col_norms[j]).sqrt();
                self.set(i, j, value);
            }
        }
        Ok(())
    }
}

/// Reject zero and non-finite normalization divisors
fn check_norms<T: KernelFloat>(norms: &[T]) -> Result<()> {
    match norms
        .iter()
        .position(|&v| !(v > T::zero()) || !v.is_finite())
    {
        Some(index) => Err(KernelError::DegenerateNorm {
            index,
            value: norms[index].to_f64(),
        }),
        None => Ok(()),
    }
}
