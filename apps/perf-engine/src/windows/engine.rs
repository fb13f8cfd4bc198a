//! Parallel window evaluation using Rayon.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{Level, debug, info, span};

use super::types::{WindowSpec, WindowStats};
use crate::config::ParallelConfig;
use crate::dates::{DateIndex, resolve_range};
use crate::error::{PerfError, Result};
use crate::matrix::PriceMatrix;
use crate::metrics::compute_perf_stats;

/// Evaluates performance statistics over many date windows.
#[derive(Debug, Clone, Default)]
pub struct WindowEvaluator {
    config: ParallelConfig,
}

impl WindowEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub const fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Configure the global rayon thread pool.
    ///
    /// # Errors
    ///
    /// Returns error if the global pool was already built.
    pub fn configure_thread_pool(&self) -> Result<()> {
        if self.config.max_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_threads)
                .build_global()
                .map_err(|e| PerfError::ThreadPool {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        if self.config.max_threads > 0 {
            self.config.max_threads
        } else {
            rayon::current_num_threads()
        }
    }

    /// Resolve every window against `calendar`, slice `matrix` and compute stats.
    ///
    /// Results are in `windows` order. Windows run in parallel once there
    /// are at least `min_parallel_jobs` of them.
    ///
    /// # Errors
    ///
    /// `Shape` when `windows` is empty, otherwise the first resolution,
    /// slicing or statistics error.
    pub fn evaluate(
        &self,
        matrix: &PriceMatrix,
        calendar: &DateIndex,
        windows: &[WindowSpec],
    ) -> Result<Vec<WindowStats>> {
        if windows.is_empty() {
            return Err(PerfError::shape("no windows to evaluate"));
        }

        let start_time = Instant::now();
        let parallel = windows.len() >= self.config.min_parallel_jobs;
        info!(
            windows = windows.len(),
            symbols = matrix.n_cols(),
            parallel,
            threads = self.effective_thread_count(),
            "Evaluating windows"
        );

        let results = if parallel {
            windows
                .par_iter()
                .map(|spec| Self::evaluate_one(matrix, calendar, spec))
                .collect::<Result<Vec<_>>>()?
        } else {
            windows
                .iter()
                .map(|spec| Self::evaluate_one(matrix, calendar, spec))
                .collect::<Result<Vec<_>>>()?
        };

        info!(
            windows = results.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Window evaluation complete"
        );
        Ok(results)
    }

    fn evaluate_one(
        matrix: &PriceMatrix,
        calendar: &DateIndex,
        spec: &WindowSpec,
    ) -> Result<WindowStats> {
        let span = span!(Level::DEBUG, "window", label = %spec.label);
        let _enter = span.enter();

        let range = resolve_range(calendar, &spec.query)?;
        let (window, dropped) = matrix.slice(&range)?.drop_all_nan()?;
        if !dropped.symbols.is_empty() {
            debug!(symbols = ?dropped.symbols, "Dropped symbols without closes in window");
        }
        let stats = compute_perf_stats(&window)?;
        debug!(rows = range.row_count(), "Window evaluated");

        Ok(WindowStats {
            label: spec.label.clone(),
            range,
            stats,
        })
    }
}
