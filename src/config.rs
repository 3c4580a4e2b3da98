//! Run configuration for the edge pipeline.
//!
//! The worker count is a process-wide value, clamped to [1, 16]. A run reads
//! it once when it starts and carries the clamped value through every stage,
//! so changing it while a run is in flight has no effect on that run.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::CannyError;

/// Smallest accepted worker count.
pub const MIN_WORKERS: usize = 1;
/// Largest accepted worker count.
pub const MAX_WORKERS: usize = 16;

/// Default lower hysteresis threshold (fraction of the global maximum).
pub const DEFAULT_LOWER_THRESHOLD: f64 = 0.03;
/// Default higher hysteresis threshold (fraction of the global maximum).
pub const DEFAULT_HIGHER_THRESHOLD: f64 = 0.1;

static NUM_THREADS: AtomicUsize = AtomicUsize::new(MIN_WORKERS);

/// Clamp a requested worker count into [1, 16].
#[inline]
pub fn clamp_workers(n: usize) -> usize {
    n.clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Set the process-wide worker count used by runs that don't pass one.
pub fn set_num_threads(n: usize) {
    NUM_THREADS.store(clamp_workers(n), Ordering::Relaxed);
}

/// Current process-wide worker count.
pub fn num_threads() -> usize {
    NUM_THREADS.load(Ordering::Relaxed)
}

/// Thresholds and limits for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyConfig {
    /// Fraction of the global maximum below which a pixel is never an edge.
    pub lower_threshold: f64,
    /// Fraction of the global maximum at or above which a pixel is always an edge.
    pub higher_threshold: f64,
    /// Worker count for every parallel stage. `None` reads [`num_threads`].
    pub workers: Option<usize>,
    /// Hysteresis sweep cap. `None` uses a cap derived from the image size.
    pub max_sweeps: Option<usize>,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self {
            lower_threshold: DEFAULT_LOWER_THRESHOLD,
            higher_threshold: DEFAULT_HIGHER_THRESHOLD,
            workers: None,
            max_sweeps: None,
        }
    }
}

impl CannyConfig {
    pub fn new(lower_threshold: f64, higher_threshold: f64) -> Self {
        Self {
            lower_threshold,
            higher_threshold,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = Some(max_sweeps);
        self
    }

    /// Check `0 <= lower < higher <= 1`.
    pub fn validate(&self) -> Result<(), CannyError> {
        let (lower, higher) = (self.lower_threshold, self.higher_threshold);
        let in_range = |t: f64| t.is_finite() && (0.0..=1.0).contains(&t);
        if !in_range(lower) || !in_range(higher) || lower >= higher {
            return Err(CannyError::InvalidThresholds { lower, higher });
        }
        Ok(())
    }

    /// Worker count for a run, clamped. Falls back to the process-wide value.
    pub fn resolved_workers(&self) -> usize {
        self.workers.map(clamp_workers).unwrap_or_else(num_threads)
    }
}
