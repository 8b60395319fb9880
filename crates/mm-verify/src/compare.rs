use std::fmt;

use approx::{AbsDiffEq, RelativeEq, UlpsEq};

/// Acceptance bounds for tolerance-based comparison.
///
/// Two finite values match when any of the absolute, relative or ULP checks
/// passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute difference bound, also used as the epsilon of the other checks.
    pub abs: f32,
    /// Relative difference bound.
    pub rel: f32,
    /// Units-in-the-last-place bound.
    pub ulps: u32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            abs: 1e-5,
            rel: 1e-5,
            ulps: 4,
        }
    }
}

impl Tolerance {
    /// Whether `expected` and `actual` match under this tolerance.
    ///
    /// Two NaNs match; a NaN never matches a number. Infinities match only
    /// infinities of the same sign.
    pub fn matches(&self, expected: f32, actual: f32) -> bool {
        if expected.is_nan() || actual.is_nan() {
            return expected.is_nan() && actual.is_nan();
        }
        if expected.is_infinite() || actual.is_infinite() {
            return expected == actual;
        }
        expected.abs_diff_eq(&actual, self.abs)
            || expected.relative_eq(&actual, self.abs, self.rel)
            || expected.ulps_eq(&actual, self.abs, self.ulps)
    }
}

/// How a candidate's output is judged against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CompareMode {
    /// Identical bit patterns, element by element.
    #[default]
    BitExact,
    Tolerance(Tolerance),
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::BitExact => write!(f, "bit-exact"),
            CompareMode::Tolerance(t) => {
                write!(f, "tolerance(abs={}, rel={}, ulps={})", t.abs, t.rel, t.ulps)
            }
        }
    }
}

/// One differing element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub expected: f32,
    pub actual: f32,
}

/// Result of comparing two buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub expected_len: usize,
    pub actual_len: usize,
    /// Mismatching elements within the common prefix, in index order.
    pub mismatches: Vec<Mismatch>,
    /// Largest `|expected - actual|` over pairs where it is defined.
    pub max_abs_diff: f32,
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        self.expected_len == self.actual_len && self.mismatches.is_empty()
    }

    pub fn first_mismatch(&self) -> Option<&Mismatch> {
        self.mismatches.first()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected_len != self.actual_len {
            return write!(
                f,
                "length mismatch: expected {}, got {}",
                self.expected_len, self.actual_len
            );
        }
        match self.first_mismatch() {
            None => write!(f, "match (max abs diff {:e})", self.max_abs_diff),
            Some(m) => write!(
                f,
                "{} mismatches, first at {}: expected {:e}, got {:e} (max abs diff {:e})",
                self.mismatches.len(),
                m.index,
                m.expected,
                m.actual,
                self.max_abs_diff
            ),
        }
    }
}

fn compare_with<F>(expected: &[f32], actual: &[f32], same: F) -> Comparison
where
    F: Fn(f32, f32) -> bool,
{
    let mut mismatches = Vec::new();
    let mut max_abs_diff = 0.0f32;
    for (index, (&e, &a)) in expected.iter().zip(actual).enumerate() {
        // NaN differences are skipped by f32::max.
        max_abs_diff = max_abs_diff.max((e - a).abs());
        if !same(e, a) {
            mismatches.push(Mismatch {
                index,
                expected: e,
                actual: a,
            });
        }
    }
    Comparison {
        expected_len: expected.len(),
        actual_len: actual.len(),
        mismatches,
        max_abs_diff,
    }
}

/// Element-wise comparison of bit patterns.
pub fn bit_exact(expected: &[f32], actual: &[f32]) -> Comparison {
    compare_with(expected, actual, |e, a| e.to_bits() == a.to_bits())
}

/// Element-wise comparison under `tol`.
pub fn within_tolerance(expected: &[f32], actual: &[f32], tol: Tolerance) -> Comparison {
    compare_with(expected, actual, |e, a| tol.matches(e, a))
}

pub fn compare(mode: CompareMode, expected: &[f32], actual: &[f32]) -> Comparison {
    match mode {
        CompareMode::BitExact => bit_exact(expected, actual),
        CompareMode::Tolerance(tol) => within_tolerance(expected, actual, tol),
    }
}
