use mm_kernel::dims::offset;
use mm_kernel::{KernelError, MatmulDims};

use crate::error::Result;

/// Transpose a matrix: returns `src^T`.
///
/// Converts from row-major (rows × cols) to row-major (cols × rows).
pub fn transpose(src: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut dst = vec![0.0f32; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            dst[offset(j, i, rows)] = src[offset(i, j, cols)];
        }
    }
    dst
}

/// Computes `A @ B` as `(B^T @ A^T)^T`.
///
/// Independent of the reference kernel: it multiplies the transposed operands
/// with an i-k-j loop and an f64 accumulator, then transposes back. Results
/// agree with the reference only within a tolerance.
pub fn matmul_via_transpose(a: &[f32], b: &[f32], dims: MatmulDims) -> Result<Vec<f32>> {
    let MatmulDims { m, n, k } = dims;
    let a_len = dims.a_len()?;
    let b_len = dims.b_len()?;
    if a.len() < a_len {
        return Err(KernelError::BufferTooShort {
            buffer: "A",
            required: a_len,
            got: a.len(),
        }
        .into());
    }
    if b.len() < b_len {
        return Err(KernelError::BufferTooShort {
            buffer: "B",
            required: b_len,
            got: b.len(),
        }
        .into());
    }

    let bt = transpose(&b[..b_len], k, n); // n x k
    let at = transpose(&a[..a_len], m, k); // k x m

    // (n x k) @ (k x m) = n x m
    let mut acc = vec![0.0f64; n * m];
    for i in 0..n {
        for p in 0..k {
            let lhs = bt[offset(i, p, k)] as f64;
            let acc_row = &mut acc[i * m..(i + 1) * m];
            for (j, out) in acc_row.iter_mut().enumerate() {
                *out += lhs * at[offset(p, j, m)] as f64;
            }
        }
    }

    let ct: Vec<f32> = acc.into_iter().map(|v| v as f32).collect();
    Ok(transpose(&ct, n, m))
}
