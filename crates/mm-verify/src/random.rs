use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 7;

/// Seeded generator of row-major test matrices.
///
/// The same seed always yields the same sequence of matrices, so a failing
/// equivalence case can be replayed.
pub struct MatrixGen {
    rng: StdRng,
    dist: Uniform<f32>,
}

impl MatrixGen {
    /// Values drawn uniformly from `[0, 1)`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_range(seed, 0.0, 1.0)
    }

    /// Values drawn uniformly from `[low, high)`.
    ///
    /// # Panics
    /// Panics if `low >= high`.
    pub fn with_range(seed: u64, low: f32, high: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            dist: Uniform::new(low, high),
        }
    }

    /// A `rows x cols` matrix as a flat row-major vector.
    pub fn matrix(&mut self, rows: usize, cols: usize) -> Vec<f32> {
        self.vec(rows * cols)
    }

    pub fn vec(&mut self, len: usize) -> Vec<f32> {
        (0..len).map(|_| self.dist.sample(&mut self.rng)).collect()
    }
}

impl Default for MatrixGen {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}
