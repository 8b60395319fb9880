use crate::dims::{check_buffer, checked_len, offset, MatmulDims};
use crate::error::{KernelError, Result};
use crate::kernel::MatmulKernel;

/// Borrowed row-major view over a slice.
///
/// Element `(r, c)` lives at `r * cols + c`. The slice may be longer than
/// `rows * cols`; the tail is not part of the view.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> MatrixView<'a> {
    /// # Errors
    /// Returns an error if `data` holds fewer than `rows * cols` elements.
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        check_buffer("view", len, data.len())?;
        Ok(MatrixView {
            data: &data[..len],
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns element `(row, col)`.
    ///
    /// # Panics
    /// Panics if `row >= rows()` or `col >= cols()`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        self.data[offset(row, col, self.cols)]
    }

    /// Returns row `row` as a slice.
    pub fn row(&self, row: usize) -> &'a [f32] {
        let start = offset(row, 0, self.cols);
        &self.data[start..start + self.cols]
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }
}

/// Mutable row-major view over a slice.
#[derive(Debug)]
pub struct MatrixViewMut<'a> {
    data: &'a mut [f32],
    rows: usize,
    cols: usize,
}

impl<'a> MatrixViewMut<'a> {
    /// # Errors
    /// Returns an error if `data` holds fewer than `rows * cols` elements.
    pub fn new(data: &'a mut [f32], rows: usize, cols: usize) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        check_buffer("view", len, data.len())?;
        Ok(MatrixViewMut {
            data: &mut data[..len],
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        self.data[offset(row, col, self.cols)]
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut f32 {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        &mut self.data[offset(row, col, self.cols)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        *self.get_mut(row, col) = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.data
    }
}

/// An owned, contiguous, row-major f32 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a matrix from row-major data.
    ///
    /// # Errors
    /// Returns an error if `data.len() != rows * cols`.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        if data.len() != len {
            return Err(KernelError::InvalidArgument(format!(
                "data length {} does not match {}x{} (expected {})",
                data.len(),
                rows,
                cols,
                len
            )));
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a zero-filled matrix.
    ///
    /// # Errors
    /// Returns `DimensionOverflow` if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Ok(Matrix {
            data: vec![0.0; checked_len(rows, cols)?],
            rows,
            cols,
        })
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.data[offset(i, i, n)] = 1.0;
        }
        Ok(m)
    }

    /// Create a matrix from a list of equally long rows.
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(KernelError::InvalidArgument(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix {
            data,
            rows: rows.len(),
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.view().get(row, col)
    }

    pub fn row(&self, row: usize) -> &[f32] {
        let start = offset(row, 0, self.cols);
        &self.data[start..start + self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn view(&self) -> MatrixView<'_> {
        MatrixView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn view_mut(&mut self) -> MatrixViewMut<'_> {
        MatrixViewMut {
            data: &mut self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns the transpose as a new `cols x rows` matrix.
    pub fn transpose(&self) -> Matrix {
        let mut out = vec![0.0f32; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[offset(j, i, self.rows)] = self.data[offset(i, j, self.cols)];
            }
        }
        Matrix {
            data: out,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Matrix multiplication using the given kernel.
    ///
    /// self is [m, k], other is [k, n], result is [m, n].
    pub fn matmul(&self, other: &Matrix, kernel: &dyn MatmulKernel) -> Result<Matrix> {
        let m = self.rows;
        let k = self.cols;
        let k2 = other.rows;
        let n = other.cols;

        if k != k2 {
            return Err(KernelError::MatmulMismatch { m, k, k2, n });
        }

        let data = kernel.matmul(&self.data, &other.data, MatmulDims::new(m, n, k))?;
        Ok(Matrix {
            data,
            rows: m,
            cols: n,
        })
    }
}
