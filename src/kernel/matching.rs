//! Symbol matching modes
//!
//! Hard matching only scores identical symbols. Soft matching scores the
//! last symbol of a common subsequence through a substitution matrix (for
//! example an amino acid similarity model), while the inner positions still
//! require identical symbols.

use crate::core::{KernelError, Result};
use crate::data::Symbol;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Symmetric, non-negative symbol similarity table
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionMatrix {
    size: usize,
    weights: Vec<f64>,
}

impl SubstitutionMatrix {
    /// Build from a row-major `size`×`size` table
    pub fn new(size: usize, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != size * size {
            return Err(KernelError::DimensionMismatch {
                expected: size * size,
                actual: weights.len(),
            });
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "substitution weights must be finite and non-negative, got {w}"
            )));
        }
        for a in 0..size {
            for b in a + 1..size {
                if weights[a * size + b] != weights[b * size + a] {
                    return Err(KernelError::InvalidParameter(format!(
                        "substitution matrix is not symmetric at ({a}, {b})"
                    )));
                }
            }
        }
        Ok(Self { size, weights })
    }

    /// Build by evaluating `f` on every symbol pair
    pub fn from_fn<F>(size: usize, f: F) -> Result<Self>
    where
        F: Fn(Symbol, Symbol) -> f64,
    {
        let weights = (0..size)
            .flat_map(|a| (0..size).map(move |b| (a, b)))
            .map(|(a, b)| f(a as Symbol, b as Symbol))
            .collect();
        Self::new(size, weights)
    }

    /// Table equivalent to hard matching
    pub fn identity(size: usize) -> Self {
        let mut weights = vec![0.0; size * size];
        for a in 0..size {
            weights[a * size + a] = 1.0;
        }
        Self { size, weights }
    }

    /// Load a labeled table over byte symbols from a file
    pub fn from_file<P: AsRef<Path>>(path: P, size: usize) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        Self::from_reader(BufReader::new(file), size)
    }

    /// Parse a labeled table over byte symbols
    ///
    /// The first non-comment line lists the column characters, every other
    /// line starts with a row character followed by one weight per column:
    ///
    /// ```text
    /// # purine / pyrimidine
    ///    A   G   C   T
    /// A  1   0.5 0   0
    /// G  0.5 1   0   0
    /// C  0   0   1   0.5
    /// T  0   0   0.5 1
    /// ```
    ///
    /// Symbols the table does not mention only match themselves.
    pub fn from_reader<R: BufRead>(reader: R, size: usize) -> Result<Self> {
        let mut weights = Self::identity(size).weights;
        let mut columns: Option<Vec<Symbol>> = None;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = match &columns {
                None => Self::parse_symbols(line, size).map(|header| columns = Some(header)),
                Some(header) => Self::parse_row(line, header, size, &mut weights),
            };
            parsed.map_err(|e| {
                KernelError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
        }

        if columns.is_none() {
            return Err(KernelError::ParseError(
                "substitution table has no header".to_string(),
            ));
        }
        Self::new(size, weights)
    }

    fn parse_symbol(token: &str, size: usize) -> Result<Symbol> {
        match token.as_bytes() {
            &[byte] if (byte as usize) < size => Ok(Symbol::from(byte)),
            &[byte] => Err(KernelError::ParseError(format!(
                "symbol {token:?} ({byte}) is outside an alphabet of {size}"
            ))),
            _ => Err(KernelError::ParseError(format!(
                "expected a single-byte symbol, got {token:?}"
            ))),
        }
    }

    fn parse_symbols(line: &str, size: usize) -> Result<Vec<Symbol>> {
        line.split_whitespace()
            .map(|token| Self::parse_symbol(token, size))
            .collect()
    }

    fn parse_row(line: &str, header: &[Symbol], size: usize, weights: &mut [f64]) -> Result<()> {
        let mut parts = line.split_whitespace();
        let row = parts
            .next()
            .ok_or_else(|| KernelError::ParseError("Empty line".to_string()))
            .and_then(|token| Self::parse_symbol(token, size))?;

        let values = parts
            .map(|value| {
                value
                    .parse::<f64>()
                    .map_err(|_| KernelError::ParseError(format!("Invalid weight: {value}")))
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.len() != header.len() {
            return Err(KernelError::ParseError(format!(
                "expected {} weights, got {}",
                header.len(),
                values.len()
            )));
        }

        for (&column, value) in header.iter().zip(values) {
            weights[row as usize * size + column as usize] = value;
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Similarity of symbols `a` and `b`
    #[inline]
    pub fn weight(&self, a: Symbol, b: Symbol) -> f64 {
        self.weights[a as usize * self.size + b as usize]
    }
}

/// How the final symbol of a common subsequence is compared
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MatchMode {
    /// Identical symbols only
    #[default]
    Hard,
    /// Weighted by a substitution matrix over the whole alphabet
    Soft(Arc<SubstitutionMatrix>),
}

impl MatchMode {
    pub fn soft(matrix: SubstitutionMatrix) -> Self {
        Self::Soft(Arc::new(matrix))
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Hard)
    }

    /// Check the mode covers an alphabet of `symbol_size` symbols
    pub fn validate(&self, symbol_size: usize) -> Result<()> {
        match self {
            Self::Hard => Ok(()),
            Self::Soft(matrix) if matrix.size() == symbol_size => Ok(()),
            Self::Soft(matrix) => Err(KernelError::DimensionMismatch {
                expected: symbol_size,
                actual: matrix.size(),
            }),
        }
    }

    #[inline]
    pub fn weight(&self, a: Symbol, b: Symbol) -> f64 {
        match self {
            Self::Hard => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Soft(matrix) => matrix.weight(a, b),
        }
    }
}
