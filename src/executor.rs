//! Block/row executor shared by every data-parallel stage.
//!
//! Stages hand the executor a kernel and a disjoint partition of their
//! output; the executor decides whether partitions run in order on the
//! calling thread or on the rayon pool. Kernels are the same functions
//! either way, so both backends produce identical results.

#[cfg(not(feature = "parallel"))]
use std::sync::Once;

/// Execution backend for the per-pixel and per-block stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Process partitions in order on the calling thread.
    #[default]
    Sequential,
    /// Process partitions on the rayon thread pool.
    ///
    /// Without the `parallel` feature this runs sequentially.
    Parallel,
}

#[cfg(not(feature = "parallel"))]
static FALLBACK_NOTICE: Once = Once::new();

impl Backend {
    /// True if work will actually be spread across threads.
    pub fn is_parallel(self) -> bool {
        match self {
            Backend::Sequential => false,
            #[cfg(feature = "parallel")]
            Backend::Parallel => true,
            #[cfg(not(feature = "parallel"))]
            Backend::Parallel => {
                FALLBACK_NOTICE.call_once(|| {
                    log::debug!("built without the `parallel` feature; running sequentially");
                });
                false
            }
        }
    }

    /// Run `f(chunk_index, chunk)` over `data` split into `chunk_len` pieces.
    ///
    /// The last chunk may be shorter. A `chunk_len` of zero is a no-op.
    pub fn for_each_chunk_mut<T, F>(self, data: &mut [T], chunk_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if chunk_len == 0 {
            return;
        }
        if self.is_parallel() {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                data.par_chunks_mut(chunk_len)
                    .enumerate()
                    .for_each(|(i, chunk)| f(i, chunk));
                return;
            }
        }
        data.chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(i, chunk)| f(i, chunk));
    }

    /// Collect `f(i)` for `i in 0..len`, preserving index order.
    pub fn map_indexed<R, F>(self, len: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync + Send,
    {
        if self.is_parallel() {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                return (0..len).into_par_iter().map(f).collect();
            }
        }
        (0..len).map(f).collect()
    }
}
