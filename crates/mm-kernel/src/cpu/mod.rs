pub mod parallel;
pub mod reference;

pub use parallel::RowParallelKernel;

use crate::dims::MatmulDims;
use crate::error::Result;
use crate::kernel::MatmulKernel;

/// Pure-Rust reference kernel.
///
/// Runs the canonical m-n-k triple loop with a single f32 accumulator per
/// output element. Other kernels are checked for numeric equivalence against
/// this one.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    pub fn new() -> Self {
        ReferenceKernel
    }
}

impl Default for ReferenceKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MatmulKernel for ReferenceKernel {
    fn name(&self) -> &str {
        "reference"
    }

    fn matmul_into(&self, a: &[f32], b: &[f32], c: &mut [f32], dims: MatmulDims) -> Result<()> {
        reference::matmul_checked(a, b, c, dims)
    }
}
