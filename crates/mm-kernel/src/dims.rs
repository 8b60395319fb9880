use crate::error::{KernelError, Result};
use std::fmt;

/// Logical shape of one `C = A x B` call.
///
/// A is `m x k`, B is `k x n`, C is `m x n`, all row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatmulDims {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl MatmulDims {
    /// Create dims in the kernel's `(m, n, k)` argument order.
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        MatmulDims { m, n, k }
    }

    /// Square `n x n x n` dims.
    pub fn square(n: usize) -> Self {
        MatmulDims { m: n, n, k: n }
    }

    /// Convert C-style signed dimensions, rejecting negatives.
    pub fn from_i32(m: i32, n: i32, k: i32) -> Result<Self> {
        let conv = |name: &str, v: i32| {
            usize::try_from(v).map_err(|_| {
                KernelError::InvalidArgument(format!("{} must be non-negative, got {}", name, v))
            })
        };
        Ok(MatmulDims {
            m: conv("M", m)?,
            n: conv("N", n)?,
            k: conv("K", k)?,
        })
    }

    /// Required length of A (`m * k`).
    pub fn a_len(&self) -> Result<usize> {
        checked_len(self.m, self.k)
    }

    /// Required length of B (`k * n`).
    pub fn b_len(&self) -> Result<usize> {
        checked_len(self.k, self.n)
    }

    /// Required length of C (`m * n`).
    pub fn c_len(&self) -> Result<usize> {
        checked_len(self.m, self.n)
    }

    /// Floating-point operation count (`2 * m * n * k`), saturating.
    pub fn flops(&self) -> u64 {
        (self.m as u64)
            .saturating_mul(self.n as u64)
            .saturating_mul(self.k as u64)
            .saturating_mul(2)
    }

    /// Checks that all three buffers are long enough for these dims.
    ///
    /// Buffers may be longer than required; the tail is ignored by every kernel.
    pub fn validate(&self, a_len: usize, b_len: usize, c_len: usize) -> Result<()> {
        check_buffer("A", self.a_len()?, a_len)?;
        check_buffer("B", self.b_len()?, b_len)?;
        check_buffer("C", self.c_len()?, c_len)?;
        Ok(())
    }
}

/// Row-major offset of element `(row, col)` in a matrix with `stride` columns.
#[inline]
pub fn offset(row: usize, col: usize, stride: usize) -> usize {
    row * stride + col
}

pub(crate) fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(KernelError::DimensionOverflow { rows, cols })
}

pub(crate) fn check_buffer(buffer: &'static str, required: usize, got: usize) -> Result<()> {
    if got < required {
        return Err(KernelError::BufferTooShort {
            buffer,
            required,
            got,
        });
    }
    Ok(())
}

impl fmt::Display for MatmulDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}] @ [{}x{}]", self.m, self.k, self.k, self.n)
    }
}

impl From<(usize, usize, usize)> for MatmulDims {
    fn from((m, n, k): (usize, usize, usize)) -> Self {
        MatmulDims::new(m, n, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_lengths() {
        let d = MatmulDims::new(2, 4, 3);
        assert_eq!(d.a_len().unwrap(), 6);
        assert_eq!(d.b_len().unwrap(), 12);
        assert_eq!(d.c_len().unwrap(), 8);
        assert_eq!(d.flops(), 48);
    }

    #[test]
    fn test_square() {
        assert_eq!(MatmulDims::square(5), MatmulDims::new(5, 5, 5));
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(0, 0, 3), 0);
        assert_eq!(offset(1, 2, 3), 5);
    }

    #[test]
    fn test_validate_allows_longer_buffers() {
        let d = MatmulDims::new(2, 2, 2);
        assert!(d.validate(4, 4, 4).is_ok());
        assert!(d.validate(10, 10, 10).is_ok());
    }

    #[test]
    fn test_validate_short_buffer() {
        let d = MatmulDims::new(2, 3, 4);
        let err = d.validate(8, 11, 6).unwrap_err();
        assert_eq!(
            err,
            KernelError::BufferTooShort {
                buffer: "B",
                required: 12,
                got: 11
            }
        );
    }

    #[test]
    fn test_zero_dims_need_no_storage() {
        let d = MatmulDims::new(3, 4, 0);
        assert!(d.validate(0, 0, 12).is_ok());
        assert!(MatmulDims::new(0, 0, 7).validate(0, 0, 0).is_ok());
    }

    #[test]
    fn test_overflow() {
        let d = MatmulDims::new(usize::MAX, 1, 2);
        assert!(matches!(
            d.a_len(),
            Err(KernelError::DimensionOverflow { .. })
        ));
        assert_eq!(d.flops(), u64::MAX);
    }

    #[test]
    fn test_from_i32() {
        assert_eq!(
            MatmulDims::from_i32(2, 3, 4).unwrap(),
            MatmulDims::new(2, 3, 4)
        );
        assert!(MatmulDims::from_i32(-1, 3, 4).is_err());
        assert!(MatmulDims::from_i32(1, 3, -4).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(MatmulDims::new(2, 3, 4).to_string(), "[2x4] @ [4x3]");
    }
}
