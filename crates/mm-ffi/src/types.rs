use mm_kernel::KernelVariant;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MMStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorInternal = 2,
}

/// Kernel variant selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MMKernelVariant {
    Reference = 0,
    RowParallel = 1,
}

impl From<MMKernelVariant> for KernelVariant {
    fn from(v: MMKernelVariant) -> Self {
        match v {
            MMKernelVariant::Reference => KernelVariant::Reference,
            MMKernelVariant::RowParallel => KernelVariant::RowParallel,
        }
    }
}
