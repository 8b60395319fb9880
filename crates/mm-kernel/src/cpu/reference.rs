// Reference matmul loop nest.
//
// Every other kernel in the workspace is judged against `matmul` below, so the
// loop order and the single f32 accumulator must not change.

use log::trace;

use crate::dims::MatmulDims;
use crate::error::Result;

/// Naive matrix multiplication `C = A * B` using m-n-k loop order.
///
/// Each output element is accumulated left to right in an `f32` starting at
/// `0.0` and then stored, so `c[..m*n]` is fully overwritten (with zeros when
/// `k == 0`). When `m == 0` or `n == 0` nothing is written.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, overwritten
/// * `m` - Rows of A and C
/// * `n` - Columns of B and C
/// * `k` - Columns of A, rows of B
///
/// # Panics
///
/// Panics if a slice is shorter than its required length. Use
/// [`matmul_checked`] to get an error instead.
pub fn matmul(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    debug_assert!(a.len() >= m * k, "A: need {} elements, got {}", m * k, a.len());
    debug_assert!(b.len() >= k * n, "B: need {} elements, got {}", k * n, b.len());
    debug_assert!(c.len() >= m * n, "C: need {} elements, got {}", m * n, c.len());

    for i in 0..m {
        for j in 0..n {
            let mut s = 0.0f32;
            for p in 0..k {
                s += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = s;
        }
    }
}

/// Length-checked form of [`matmul`].
///
/// Returns `KernelError::BufferTooShort` without touching `c` if any buffer
/// is shorter than `dims` requires.
pub fn matmul_checked(a: &[f32], b: &[f32], c: &mut [f32], dims: MatmulDims) -> Result<()> {
    dims.validate(a.len(), b.len(), c.len())?;
    trace!("reference matmul {}", dims);
    matmul(a, b, c, dims.m, dims.n, dims.k);
    Ok(())
}

/// Pointer form of [`matmul`], for callers that own raw buffers.
///
/// # Safety
///
/// `a`, `b` and `c` must be valid for `m*k`, `k*n` and `m*n` elements
/// respectively, `c` must be writable and must not overlap `a` or `b`, and the
/// products must not overflow `usize`. A pointer may be null when its
/// required length is zero.
pub unsafe fn matmul_raw(
    a: *const f32,
    b: *const f32,
    c: *mut f32,
    m: usize,
    n: usize,
    k: usize,
) {
    let a = unsafe { slice_or_empty(a, m * k) };
    let b = unsafe { slice_or_empty(b, k * n) };
    let c_len = m * n;
    if c_len == 0 {
        return;
    }
    let c = unsafe { std::slice::from_raw_parts_mut(c, c_len) };
    matmul(a, b, c, m, n, k);
}

unsafe fn slice_or_empty<'a>(ptr: *const f32, len: usize) -> &'a [f32] {
    if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len) }
    }
}
