use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use crate::cpu::{ReferenceKernel, RowParallelKernel};
use crate::error::{KernelError, Result};
use crate::kernel::MatmulKernel;

/// Environment variable selecting the kernel variant.
pub const ENV_VARIANT: &str = "MM_KERNEL_VARIANT";
/// Environment variable capping the thread count of parallel variants.
pub const ENV_THREADS: &str = "MM_KERNEL_THREADS";

/// Kernel implementation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelVariant {
    Reference,
    RowParallel,
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelVariant::Reference => write!(f, "reference"),
            KernelVariant::RowParallel => write!(f, "row-parallel"),
        }
    }
}

impl FromStr for KernelVariant {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "naive" => Ok(KernelVariant::Reference),
            "row-parallel" | "row_parallel" | "parallel" => Ok(KernelVariant::RowParallel),
            other => Err(KernelError::InvalidArgument(format!(
                "unknown kernel variant '{}'",
                other
            ))),
        }
    }
}

/// Parameters controlling which kernel is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    pub variant: KernelVariant,
    /// Upper bound on worker threads; ignored by the reference kernel.
    pub max_threads: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            variant: KernelVariant::Reference,
            max_threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl KernelConfig {
    /// Defaults overridden by `MM_KERNEL_VARIANT` and `MM_KERNEL_THREADS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_VARIANT) {
            config.variant = v.parse()?;
        }
        if let Some(v) = lookup(ENV_THREADS) {
            config.max_threads = v.trim().parse().map_err(|e| {
                KernelError::InvalidArgument(format!("{}={:?}: {}", ENV_THREADS, v, e))
            })?;
            if config.max_threads == 0 {
                return Err(KernelError::InvalidArgument(format!(
                    "{} must be at least 1",
                    ENV_THREADS
                )));
            }
        }
        Ok(config)
    }

    /// Instantiate the configured kernel.
    pub fn build(&self) -> Arc<dyn MatmulKernel> {
        debug!("building {} kernel (max_threads={})", self.variant, self.max_threads);
        match self.variant {
            KernelVariant::Reference => Arc::new(ReferenceKernel::new()),
            KernelVariant::RowParallel => Arc::new(RowParallelKernel::new(self.max_threads)),
        }
    }
}
