//! LibSVM precomputed kernel format
//!
//! Each sample is one line: its label, its 1-based serial number under index
//! 0, then the kernel values against every sample:
//! label 0:serial 1:K(i,1) 2:K(i,2) ...
//!
//! Example:
//! -1 0:1 1:1 2:0.3125
//! -1 0:2 1:0.3125 2:1

use crate::core::{KernelError, KernelFloat, KernelMatrix, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Labels "0", "1", ... used when sequences carry none
pub fn default_labels(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

/// Write a square kernel in LibSVM precomputed format
pub fn write_kernel<W: Write, T: KernelFloat>(
    writer: &mut W,
    labels: &[String],
    kernel: &KernelMatrix<T>,
) -> Result<()> {
    if !kernel.is_square() {
        return Err(KernelError::DimensionMismatch {
            expected: kernel.rows(),
            actual: kernel.cols(),
        });
    }
    if labels.len() != kernel.rows() {
        return Err(KernelError::DimensionMismatch {
            expected: kernel.rows(),
            actual: labels.len(),
        });
    }

    for (i, label) in labels.iter().enumerate() {
        if label.is_empty() || label.contains(char::is_whitespace) {
            return Err(KernelError::InvalidParameter(format!(
                "label {label:?} of sample {i} must be a single non-empty token"
            )));
        }
        write!(writer, "{} 0:{}", label, i + 1)?;
        for (j, value) in kernel.row(i).iter().enumerate() {
            write!(writer, " {}:{}", j + 1, value)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a square kernel to `path` in LibSVM precomputed format
pub fn write_kernel_file<P: AsRef<Path>, T: KernelFloat>(
    path: P,
    labels: &[String],
    kernel: &KernelMatrix<T>,
) -> Result<()> {
    let file = File::create(path).map_err(KernelError::IoError)?;
    let mut writer = BufWriter::new(file);
    write_kernel(&mut writer, labels, kernel)
}

/// A kernel read back from a LibSVM precomputed kernel file
#[derive(Debug, Clone)]
pub struct PrecomputedKernel {
    labels: Vec<String>,
    kernel: KernelMatrix<f64>,
}

impl PrecomputedKernel {
    /// Load from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut labels = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::parse_line(line, rows.len() + 1) {
                Ok((label, values)) => {
                    labels.push(label);
                    rows.push(values);
                }
                Err(e) => {
                    return Err(KernelError::ParseError(format!(
                        "Error parsing line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }

        if rows.is_empty() {
            return Err(KernelError::EmptyDataset);
        }

        let n = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != n) {
            return Err(KernelError::DimensionMismatch {
                expected: n,
                actual: row.len(),
            });
        }
        let kernel = KernelMatrix::from_vec(n, n, rows.into_iter().flatten().collect())?;
        Ok(Self { labels, kernel })
    }

    /// Parse one sample line, expecting serial number `serial`
    fn parse_line(line: &str, serial: usize) -> Result<(String, Vec<f64>)> {
        let mut parts = line.split_whitespace();
        let label = parts
            .next()
            .ok_or_else(|| KernelError::ParseError("Empty line".to_string()))?
            .to_string();

        let mut values = Vec::new();
        for (position, entry) in parts.enumerate() {
            let (index, value) = entry.split_once(':').ok_or_else(|| {
                KernelError::ParseError(format!("Invalid entry format: {entry}"))
            })?;
            let index = index
                .parse::<usize>()
                .map_err(|_| KernelError::ParseError(format!("Invalid index: {index}")))?;
            if index != position {
                return Err(KernelError::ParseError(format!(
                    "Expected index {position}, got {index}"
                )));
            }

            if position == 0 {
                let found = value.parse::<usize>().map_err(|_| {
                    KernelError::ParseError(format!("Invalid serial number: {value}"))
                })?;
                if found != serial {
                    return Err(KernelError::ParseError(format!(
                        "Expected serial number {serial}, got {found}"
                    )));
                }
            } else {
                values.push(value.parse::<f64>().map_err(|_| {
                    KernelError::ParseError(format!("Invalid kernel value: {value}"))
                })?);
            }
        }

        Ok((label, values))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn kernel(&self) -> &KernelMatrix<f64> {
        &self.kernel
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
