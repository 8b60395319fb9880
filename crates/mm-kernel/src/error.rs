use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("buffer {buffer} too short: need {required} elements, got {got}")]
    BufferTooShort {
        buffer: &'static str,
        required: usize,
        got: usize,
    },
    #[error("dimension overflow: {rows}x{cols} elements do not fit in usize")]
    DimensionOverflow { rows: usize, cols: usize },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
