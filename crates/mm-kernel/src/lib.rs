//! `mm-kernel` - Reference single-precision matrix multiplication.
//!
//! This crate provides:
//! - The canonical m-n-k triple-loop `C = A @ B` over row-major f32 buffers
//!   (`cpu::reference`), in unchecked, length-checked and raw-pointer forms
//! - A `MatmulKernel` trait for pluggable kernel variants
//! - `ReferenceKernel` and the bit-exact `RowParallelKernel`
//! - `BoundKernel`, a kernel bound to one fixed shape
//! - Row-major matrix and view types
//! - `KernelConfig` for selecting a variant from the environment

pub mod bound;
pub mod config;
pub mod cpu;
pub mod dims;
pub mod error;
pub mod kernel;
pub mod matrix;

// Re-export primary types at the crate root for convenience.
pub use bound::BoundKernel;
pub use config::{KernelConfig, KernelVariant};
pub use cpu::reference::{matmul, matmul_checked, matmul_raw};
pub use cpu::{ReferenceKernel, RowParallelKernel};
pub use dims::MatmulDims;
pub use error::{KernelError, Result};
pub use kernel::MatmulKernel;
pub use matrix::{Matrix, MatrixView, MatrixViewMut};
