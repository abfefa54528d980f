//! Sequence data and file formats
//!
//! [`Dataset`] holds encoded sequences; the submodules read sequence files
//! and read or write kernels in LibSVM precomputed format.

pub mod dataset;
pub mod libsvm;
pub mod sequences;

pub use self::dataset::*;
pub use self::libsvm::*;
pub use self::sequences::*;
