use std::sync::Arc;

use log::debug;

use crate::cpu::ReferenceKernel;
use crate::dims::MatmulDims;
use crate::error::Result;
use crate::kernel::MatmulKernel;

/// A kernel specialised for one fixed shape.
///
/// The dimensions are chosen once at construction; each call then only
/// supplies the three buffers, the way a kernel compiled for a known
/// `M`, `N`, `K` is invoked.
#[derive(Debug, Clone)]
pub struct BoundKernel {
    dims: MatmulDims,
    a_len: usize,
    b_len: usize,
    c_len: usize,
    kernel: Arc<dyn MatmulKernel>,
}

impl BoundKernel {
    /// Bind `kernel` to `dims`.
    ///
    /// # Errors
    /// Returns `DimensionOverflow` if any buffer length overflows `usize`.
    pub fn new(dims: MatmulDims, kernel: Arc<dyn MatmulKernel>) -> Result<Self> {
        let a_len = dims.a_len()?;
        let b_len = dims.b_len()?;
        let c_len = dims.c_len()?;
        debug!("binding {} kernel to {}", kernel.name(), dims);
        Ok(BoundKernel {
            dims,
            a_len,
            b_len,
            c_len,
            kernel,
        })
    }

    /// Bind the reference kernel to `dims`.
    pub fn reference(dims: MatmulDims) -> Result<Self> {
        Self::new(dims, Arc::new(ReferenceKernel::new()))
    }

    pub fn dims(&self) -> MatmulDims {
        self.dims
    }

    /// Required (A, B, C) buffer lengths.
    pub fn buffer_lens(&self) -> (usize, usize, usize) {
        (self.a_len, self.b_len, self.c_len)
    }

    pub fn kernel(&self) -> &dyn MatmulKernel {
        self.kernel.as_ref()
    }

    /// Run the bound kernel: `C = A @ B` for the bound dims.
    pub fn invoke(&self, a: &[f32], b: &[f32], c: &mut [f32]) -> Result<()> {
        self.kernel.matmul_into(a, b, c, self.dims)
    }
}
