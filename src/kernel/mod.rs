//! Subsequence string kernels

pub mod matching;
pub mod subsequence;
pub mod sum;

pub use self::matching::*;
pub use self::subsequence::*;
pub use self::sum::*;

use crate::core::{KernelError, Result};

/// Run `op` on a dedicated pool of `threads` workers, or on the global pool
pub(crate) fn in_pool<R, F>(threads: Option<usize>, op: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| KernelError::ThreadPool(e.to_string()))?;
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}
