//! Row-parallel reference matmul.

use log::debug;
use std::thread;

use crate::cpu::reference;
use crate::dims::MatmulDims;
use crate::error::Result;
use crate::kernel::MatmulKernel;

/// Below this many FLOPs a single thread is used.
pub const SINGLE_THREAD_THRESHOLD: u64 = 2_000_000;
/// Minimum rows of C handed to each thread.
pub const MIN_ROWS_PER_THREAD: usize = 16;

/// Splits the rows of C into contiguous bands and runs the reference loop
/// nest on each band in its own scoped thread.
///
/// Each output element is still produced by exactly one accumulator in the
/// reference k order, so results are bit-identical to [`super::ReferenceKernel`].
/// Thread count adapts to matrix size:
/// - < 2M FLOPs: 1 thread
/// - otherwise: one thread per 16 rows, capped at `max_threads`
///
/// Both cut-offs can be lowered with [`RowParallelKernel::with_split`].
#[derive(Debug, Clone)]
pub struct RowParallelKernel {
    max_threads: usize,
    min_flops: u64,
    min_rows_per_thread: usize,
}

impl RowParallelKernel {
    /// Create a kernel using at most `max_threads` threads (minimum 1).
    pub fn new(max_threads: usize) -> Self {
        RowParallelKernel {
            max_threads: max_threads.max(1),
            min_flops: SINGLE_THREAD_THRESHOLD,
            min_rows_per_thread: MIN_ROWS_PER_THREAD,
        }
    }

    /// Override when work is split: problems under `min_flops` stay on one
    /// thread, and each band gets at least `min_rows_per_thread` rows
    /// (minimum 1). `with_split(0, 1)` bands every problem with `m >= 2`.
    pub fn with_split(mut self, min_flops: u64, min_rows_per_thread: usize) -> Self {
        self.min_flops = min_flops;
        self.min_rows_per_thread = min_rows_per_thread.max(1);
        self
    }

    /// Create a kernel sized to the machine's available parallelism.
    pub fn with_available_parallelism() -> Self {
        let threads = thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(threads)
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    fn choose_thread_count(&self, dims: MatmulDims) -> usize {
        if dims.flops() < self.min_flops {
            return 1;
        }
        let threads_by_rows = (dims.m / self.min_rows_per_thread).max(1);
        threads_by_rows.min(self.max_threads)
    }
}

impl Default for RowParallelKernel {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

impl MatmulKernel for RowParallelKernel {
    fn name(&self) -> &str {
        "row-parallel"
    }

    fn matmul_into(&self, a: &[f32], b: &[f32], c: &mut [f32], dims: MatmulDims) -> Result<()> {
        dims.validate(a.len(), b.len(), c.len())?;
        let MatmulDims { m, n, k } = dims;
        if m == 0 || n == 0 {
            return Ok(());
        }

        let threads = self.choose_thread_count(dims);
        if threads == 1 {
            reference::matmul(a, b, c, m, n, k);
            return Ok(());
        }

        let rows_per_band = m.div_ceil(threads);
        debug!(
            "row-parallel matmul {}: {} threads, {} rows per band",
            dims, threads, rows_per_band
        );

        let c = &mut c[..m * n];
        thread::scope(|s| {
            for (band, c_band) in c.chunks_mut(rows_per_band * n).enumerate() {
                let rows = c_band.len() / n;
                let row_start = band * rows_per_band;
                let a_band = &a[row_start * k..(row_start + rows) * k];
                s.spawn(move || reference::matmul(a_band, b, c_band, rows, n, k));
            }
        });
        Ok(())
    }
}
