use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("kernel error: {0}")]
    Kernel(#[from] mm_kernel::KernelError),
    #[error("harness has no shapes to check")]
    EmptyShapeList,
}

pub type Result<T> = std::result::Result<T, VerifyError>;
