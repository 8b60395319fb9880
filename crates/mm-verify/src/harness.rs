use std::fmt;

use log::{debug, info, warn};
use mm_kernel::{MatmulDims, MatmulKernel, ReferenceKernel};

use crate::compare::{compare, within_tolerance, CompareMode, Comparison, Tolerance};
use crate::error::{Result, VerifyError};
use crate::random::{MatrixGen, DEFAULT_SEED};
use crate::transpose::matmul_via_transpose;

/// Value pre-filled into output buffers to expose unwritten elements.
pub const DEFAULT_SENTINEL: f32 = -1.0e30;
/// Sentinel-filled elements appended past `m * n` in every output buffer.
pub const GUARD_LEN: usize = 16;

/// Parameters of an equivalence run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Seed for the A/B generator; every case draws from one stream.
    pub seed: u64,
    pub shapes: Vec<MatmulDims>,
    pub mode: CompareMode,
    pub sentinel: f32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            shapes: vec![
                MatmulDims::square(20),
                MatmulDims::square(1),
                MatmulDims::new(2, 2, 3),
                MatmulDims::new(3, 5, 0),
                MatmulDims::new(0, 4, 3),
                MatmulDims::new(4, 0, 3),
                MatmulDims::new(1, 33, 17),
                MatmulDims::new(13, 17, 11),
                MatmulDims::new(64, 48, 96),
                // Above the row-parallel split threshold, uneven bands.
                MatmulDims::new(161, 101, 64),
            ],
            mode: CompareMode::BitExact,
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

impl HarnessConfig {
    /// Default config, comparing bit-exactly only if `kernel` claims the
    /// reference accumulation order.
    pub fn for_kernel(kernel: &dyn MatmulKernel) -> Self {
        let mode = if kernel.is_bit_exact() {
            CompareMode::BitExact
        } else {
            CompareMode::Tolerance(Tolerance::default())
        };
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Outcome of one shape.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub dims: MatmulDims,
    pub comparison: Comparison,
    /// Candidate elements still holding the sentinel where the reference wrote
    /// something else.
    pub sentinel_survivors: usize,
    /// Guard elements past `m * n` the candidate overwrote.
    pub guard_writes: usize,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.comparison.is_match() && self.sentinel_survivors == 0 && self.guard_writes == 0
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub kernel: String,
    pub mode: CompareMode,
    pub cases: Vec<CaseReport>,
}

impl HarnessReport {
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed())
    }
}

impl fmt::Display for HarnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        writeln!(
            f,
            "{} [{}]: {}/{} cases passed",
            self.kernel,
            self.mode,
            self.cases.len() - failed,
            self.cases.len()
        )?;
        for case in self.failures() {
            writeln!(
                f,
                "  {}: {} ({} unwritten, {} guard writes)",
                case.dims, case.comparison, case.sentinel_survivors, case.guard_writes
            )?;
        }
        Ok(())
    }
}

/// Runs candidate kernels against [`ReferenceKernel`] on seeded random inputs.
#[derive(Debug, Clone)]
pub struct EquivalenceHarness {
    config: HarnessConfig,
    reference: ReferenceKernel,
}

impl EquivalenceHarness {
    /// # Errors
    /// Returns `EmptyShapeList` if `config.shapes` is empty.
    pub fn new(config: HarnessConfig) -> Result<Self> {
        if config.shapes.is_empty() {
            return Err(VerifyError::EmptyShapeList);
        }
        Ok(Self {
            config,
            reference: ReferenceKernel::new(),
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Check `candidate` against the reference on every configured shape.
    ///
    /// Both kernels get output buffers of `m * n + GUARD_LEN` sentinels; only
    /// the first `m * n` are compared and the guard must survive untouched.
    /// Kernel errors (e.g. a candidate rejecting valid buffers) abort the run.
    pub fn run(&self, candidate: &dyn MatmulKernel) -> Result<HarnessReport> {
        info!(
            "checking {} against reference ({}, seed {}, {} shapes)",
            candidate.name(),
            self.config.mode,
            self.config.seed,
            self.config.shapes.len()
        );
        let mut gen = MatrixGen::seeded(self.config.seed);
        let sentinel = self.config.sentinel;
        let mut cases = Vec::with_capacity(self.config.shapes.len());

        for &dims in &self.config.shapes {
            let a = gen.vec(dims.a_len()?);
            let b = gen.vec(dims.b_len()?);
            let c_len = dims.c_len()?;

            let mut expected = vec![sentinel; c_len + GUARD_LEN];
            let mut actual = vec![sentinel; c_len + GUARD_LEN];
            self.reference.matmul_into(&a, &b, &mut expected, dims)?;
            candidate.matmul_into(&a, &b, &mut actual, dims)?;

            let (expected, _) = expected.split_at(c_len);
            let (actual, guard) = actual.split_at(c_len);
            let comparison = compare(self.config.mode, expected, actual);
            let sentinel_survivors = count_survivors(expected, actual, sentinel);
            let guard_writes = count_guard_writes(guard, sentinel);
            let case = CaseReport {
                dims,
                comparison,
                sentinel_survivors,
                guard_writes,
            };
            if case.passed() {
                debug!("{} {}: {}", candidate.name(), dims, case.comparison);
            } else {
                warn!(
                    "{} {}: {} ({} unwritten, {} guard writes)",
                    candidate.name(),
                    dims,
                    case.comparison,
                    sentinel_survivors,
                    guard_writes
                );
            }
            cases.push(case);
        }

        Ok(HarnessReport {
            kernel: candidate.name().to_string(),
            mode: self.config.mode,
            cases,
        })
    }

    /// Compare the reference against the independent `(B^T A^T)^T`
    /// computation on every configured shape, under `tol`.
    pub fn run_transpose_cross_check(&self, tol: Tolerance) -> Result<HarnessReport> {
        let mut gen = MatrixGen::seeded(self.config.seed);
        let mut cases = Vec::with_capacity(self.config.shapes.len());

        for &dims in &self.config.shapes {
            let a = gen.vec(dims.a_len()?);
            let b = gen.vec(dims.b_len()?);
            let expected = self.reference.matmul(&a, &b, dims)?;
            let actual = matmul_via_transpose(&a, &b, dims)?;
            let comparison = within_tolerance(&expected, &actual, tol);
            debug!("transpose cross-check {}: {}", dims, comparison);
            cases.push(CaseReport {
                dims,
                comparison,
                sentinel_survivors: 0,
                guard_writes: 0,
            });
        }

        Ok(HarnessReport {
            kernel: "transpose".to_string(),
            mode: CompareMode::Tolerance(tol),
            cases,
        })
    }
}

impl Default for EquivalenceHarness {
    fn default() -> Self {
        Self {
            config: HarnessConfig::default(),
            reference: ReferenceKernel::new(),
        }
    }
}

fn count_survivors(expected: &[f32], actual: &[f32], sentinel: f32) -> usize {
    let bits = sentinel.to_bits();
    expected
        .iter()
        .zip(actual)
        .filter(|(e, a)| a.to_bits() == bits && e.to_bits() != bits)
        .count()
}

fn count_guard_writes(guard: &[f32], sentinel: f32) -> usize {
    let bits = sentinel.to_bits();
    guard.iter().filter(|v| v.to_bits() != bits).count()
}
