//! `mm-verify` - numeric equivalence checks for matmul kernels.
//!
//! Compares kernel variants against the reference either bit-for-bit or
//! within a tolerance, on seeded random inputs, and cross-checks the
//! reference against an independent `(B^T A^T)^T` computation.

pub mod compare;
pub mod error;
pub mod harness;
pub mod random;
pub mod transpose;

pub use compare::{bit_exact, compare, within_tolerance, CompareMode, Comparison, Mismatch, Tolerance};
pub use error::{Result, VerifyError};
pub use harness::{CaseReport, EquivalenceHarness, HarnessConfig, HarnessReport};
pub use random::MatrixGen;
pub use transpose::{matmul_via_transpose, transpose};
