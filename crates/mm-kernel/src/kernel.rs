use std::fmt::Debug;

use crate::dims::MatmulDims;
use crate::error::Result;

/// Trait for pluggable matmul kernels (reference, row-parallel, compiled, ...).
///
/// Every implementation computes `C = A @ B` over row-major f32 buffers and
/// must validate buffer lengths against `dims`, returning an error instead of
/// panicking when a buffer is too short.
pub trait MatmulKernel: Send + Sync + Debug {
    /// Returns the name of this kernel (e.g., "reference", "row-parallel").
    fn name(&self) -> &str;

    /// Matrix multiplication into a caller-owned output buffer.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - `c`: row-major output of shape [m, n]; every element of `c[..m*n]`
    ///   is overwritten. Elements past `m*n` are left alone.
    fn matmul_into(&self, a: &[f32], b: &[f32], c: &mut [f32], dims: MatmulDims) -> Result<()>;

    /// Matrix multiplication into a freshly allocated `m*n` buffer.
    fn matmul(&self, a: &[f32], b: &[f32], dims: MatmulDims) -> Result<Vec<f32>> {
        let mut c = vec![0.0f32; dims.c_len()?];
        self.matmul_into(a, b, &mut c, dims)?;
        Ok(c)
    }

    /// Whether this kernel reproduces the reference accumulation order for
    /// every output element, and so can be compared bit-for-bit.
    fn is_bit_exact(&self) -> bool {
        true
    }
}
