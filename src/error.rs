//! Error type shared by every stage of the edge pipeline.

/// Errors that can occur while running the edge pipeline.
///
/// Configuration errors are reported before any stage runs. Every other
/// variant aborts the current run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum CannyError {
    /// Thresholds are non-finite, outside [0, 1], or not strictly ordered.
    #[error("invalid thresholds: lower={lower}, higher={higher} (need 0 <= lower < higher <= 1)")]
    InvalidThresholds { lower: f64, higher: f64 },

    /// The image has no interior pixels.
    #[error("image too small: {rows}x{cols} (need at least 3x3)")]
    ImageTooSmall { rows: usize, cols: usize },

    /// Channel count of zero.
    #[error("image must have at least one channel")]
    NoChannels,

    /// Pixel data length does not match rows * cols * channels.
    #[error("size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Smoothing kernel violates its invariants.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// A stage output buffer could not be allocated.
    #[error("failed to allocate buffer of {elements} elements")]
    Allocation { elements: usize },

    /// A stage could not spawn its workers.
    #[error("failed to spawn workers for {stage} stage: {source}")]
    ThreadPool {
        stage: &'static str,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// Hysteresis did not reach a fixed point within its sweep cap.
    #[error("hysteresis did not converge after {sweeps} sweeps")]
    NonConvergence { sweeps: usize },
}
