//! Error types for string kernel computation

use thiserror::Error;

/// Broad class of a [`KernelError`], used by callers that translate errors
/// into their own reporting convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid parameters or input shape, detected before computing
    Configuration,
    /// A sequence could not be mapped onto the alphabet
    Encoding,
    /// Memory or worker pool could not be obtained
    Resource,
    /// Normalization would divide by a zero or non-finite norm
    NumericDegeneracy,
    /// Operations called out of order
    Usage,
    /// File input/output and formats
    Io,
}

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Sequence {index} has length {length}, maximum is {max_length}")]
    SequenceTooLong {
        index: usize,
        length: usize,
        max_length: usize,
    },

    #[error("Sequence {index} has symbol {symbol} at position {position}, alphabet size is {symbol_size}")]
    SymbolOutOfRange {
        index: usize,
        position: usize,
        symbol: u32,
        symbol_size: usize,
    },

    #[error("Sequence {index} introduces more than {symbol_size} distinct symbols")]
    AlphabetExhausted { index: usize, symbol_size: usize },

    #[error("Cannot allocate a {rows}x{cols} kernel matrix")]
    AllocationFailed { rows: usize, cols: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Cannot normalize: sequence {index} has self-kernel {value}")]
    DegenerateNorm { index: usize, value: f64 },

    #[error("No data set on the kernel")]
    DataNotSet,

    #[error("Kernel not computed")]
    NotComputed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl KernelError {
    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidParameter(_) | Self::EmptyDataset | Self::DimensionMismatch { .. } => {
                ErrorCategory::Configuration
            }
            Self::SequenceTooLong { .. }
            | Self::SymbolOutOfRange { .. }
            | Self::AlphabetExhausted { .. } => ErrorCategory::Encoding,
            Self::AllocationFailed { .. } | Self::ThreadPool(_) => ErrorCategory::Resource,
            Self::DegenerateNorm { .. } => ErrorCategory::NumericDegeneracy,
            Self::DataNotSet | Self::NotComputed => ErrorCategory::Usage,
            Self::IoError(_) | Self::ParseError(_) | Self::SerializationError(_) => {
                ErrorCategory::Io
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
