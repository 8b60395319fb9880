use mm_kernel::{BoundKernel, KernelConfig, MatmulDims, Result};

use crate::types::MMKernelVariant;

/// Opaque handle owning a kernel bound to one `M`, `N`, `K`.
pub struct MMKernel {
    pub bound: BoundKernel,
}

impl MMKernel {
    pub fn new(dims: MatmulDims, variant: MMKernelVariant) -> Result<Self> {
        let config = KernelConfig {
            variant: variant.into(),
            ..KernelConfig::default()
        };
        Ok(Self {
            bound: BoundKernel::new(dims, config.build())?,
        })
    }
}
