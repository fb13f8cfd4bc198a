//! Configuration for parallel window evaluation.

use serde::{Deserialize, Serialize};

/// Configuration for parallel window evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Maximum number of threads to use (0 = use all available).
    #[serde(default)]
    pub max_threads: usize,

    /// Minimum parallelization threshold (windows below this run sequentially).
    #[serde(default = "default_min_parallel_jobs")]
    pub min_parallel_jobs: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            min_parallel_jobs: default_min_parallel_jobs(),
        }
    }
}

const fn default_min_parallel_jobs() -> usize {
    4
}
