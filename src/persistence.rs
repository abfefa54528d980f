//! Kernel serialization and persistence
//!
//! Computed kernels are saved as JSON together with the parameters that
//! produced them, so the CLI can inspect them later.

use crate::core::{KernelConfig, KernelError, KernelFloat, KernelMatrix, Result, SymbolEncoding};
use crate::kernel::MatchMode;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a computed kernel matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableKernel {
    /// One label per sequence
    pub labels: Vec<String>,
    pub rows: usize,
    pub cols: usize,
    /// Row-major kernel values
    pub values: Vec<f64>,
    /// Parameters the kernel was computed with
    pub params: KernelParams,
    /// Kernel metadata
    pub metadata: KernelMetadata,
}

/// Kernel parameters for reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    pub min_kn: usize,
    pub max_kn: usize,
    pub lambda: f64,
    pub normalize: bool,
    pub symbol_size: usize,
    pub max_length: usize,
    /// "bytes" or "compact"
    pub encoding: String,
    /// "hard" or "soft"
    pub matching: String,
}

/// Metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelMetadata {
    /// Library version used to compute the kernel
    pub library_version: String,
    /// Creation timestamp
    pub created_at: String,
    pub n_sequences: usize,
    /// Element type used during computation
    pub precision: String,
}

impl From<&KernelConfig> for KernelParams {
    fn from(config: &KernelConfig) -> Self {
        Self {
            min_kn: config.min_kn,
            max_kn: config.max_kn,
            lambda: config.lambda,
            normalize: config.normalize,
            symbol_size: config.symbol_size,
            max_length: config.max_length,
            encoding: match config.encoding {
                SymbolEncoding::Bytes => "bytes",
                SymbolEncoding::Compact => "compact",
            }
            .to_string(),
            matching: match config.matching {
                MatchMode::Hard => "hard",
                MatchMode::Soft(_) => "soft",
            }
            .to_string(),
        }
    }
}

impl SerializableKernel {
    /// Capture a computed kernel and the config it came from
    pub fn from_kernel<T: KernelFloat>(
        labels: Vec<String>,
        kernel: &KernelMatrix<T>,
        config: &KernelConfig,
    ) -> Result<Self> {
        if labels.len() != kernel.rows() {
            return Err(KernelError::DimensionMismatch {
                expected: kernel.rows(),
                actual: labels.len(),
            });
        }

        Ok(Self {
            labels,
            rows: kernel.rows(),
            cols: kernel.cols(),
            values: kernel.to_f64_vec(),
            params: KernelParams::from(config),
            metadata: KernelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
                n_sequences: kernel.rows(),
                precision: std::any::type_name::<T>().to_string(),
            },
        })
    }

    /// Save kernel to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(KernelError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load kernel from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        let reader = BufReader::new(file);
        let kernel: Self = serde_json::from_reader(reader)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        if kernel.rows.checked_mul(kernel.cols) != Some(kernel.values.len()) {
            return Err(KernelError::DimensionMismatch {
                expected: kernel.rows.saturating_mul(kernel.cols),
                actual: kernel.values.len(),
            });
        }
        if kernel.labels.len() != kernel.rows {
            return Err(KernelError::DimensionMismatch {
                expected: kernel.rows,
                actual: kernel.labels.len(),
            });
        }
        Ok(kernel)
    }

    /// Rebuild the matrix
    pub fn to_matrix(&self) -> Result<KernelMatrix<f64>> {
        KernelMatrix::from_vec(self.rows, self.cols, self.values.clone())
    }

    /// Print kernel summary
    pub fn print_summary(&self) {
        println!("=== String Kernel Summary ===");
        println!("Sequences: {}", self.metadata.n_sequences);
        println!("Dimensions: {} x {}", self.rows, self.cols);
        println!("Precision: {}", self.metadata.precision);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Kernel Parameters:");
        println!(
            "  Lengths: {}..={}",
            self.params.min_kn, self.params.max_kn
        );
        println!("  Lambda: {}", self.params.lambda);
        println!("  Normalized: {}", self.params.normalize);
        println!("  Symbol Size: {}", self.params.symbol_size);
        println!("  Max Length: {}", self.params.max_length);
        println!("  Encoding: {}", self.params.encoding);
        println!("  Matching: {}", self.params.matching);

        let n = self.rows.min(self.cols);
        if n > 0 {
            let diagonal: Vec<f64> = (0..n).map(|i| self.values[i * self.cols + i]).collect();
            let min = diagonal.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = diagonal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            println!("Diagonal Range: [{min:.6}, {max:.6}]");
        }
    }
}
