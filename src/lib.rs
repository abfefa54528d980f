//! Gap-weighted subsequence string kernels
//!
//! Based on "Text Classification using String Kernels" by Lodhi et al.
//!
//! The kernel compares two sequences by the subsequences they share,
//! weighting each occurrence by λ raised to the span it covers. Kernels for a
//! range of subsequence lengths are computed in parallel, summed and
//! optionally cosine-normalized.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod feature_map;
pub mod kernel;
pub mod persistence;

// Re-export main types for convenience
pub use crate::api::{PairwiseScorer, StringKernelBuilder};
pub use crate::cache::{CacheStats, NormCache};
pub use crate::core::error::*;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{Dataset, EncodedSequence, PrecomputedKernel, SequenceFile, SequenceFormat};
pub use crate::feature_map::FeatureMap;
pub use crate::kernel::{MatchMode, StringKernel, SubstitutionMatrix, SumStringKernel};
pub use crate::persistence::SerializableKernel;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
