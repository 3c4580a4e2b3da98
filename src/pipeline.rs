//! Full edge pipeline: smoothing, reduction, gradient, suppression, hysteresis.

use std::time::Instant;

use log::debug;
use ndarray::Array2;

use crate::buffer::PixelBuffer;
use crate::config::CannyConfig;
use crate::error::CannyError;
use crate::filters::{
    apply_hysteresis, compute_gradient, gaussian_blur, reduce_to_gray, suppress_non_maxima,
    Kernel,
};

/// Smallest row/column count with at least one interior pixel.
pub const MIN_DIMENSION: usize = 3;

/// Wall-clock time spent in each stage, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    pub smoothing_ms: f64,
    pub reduction_ms: f64,
    pub gradient_ms: f64,
    pub suppression_ms: f64,
    pub hysteresis_ms: f64,
    pub total_ms: f64,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct EdgeReport {
    /// Single-channel edge map, `(rows, cols)`.
    pub edges: Array2<u8>,
    /// Largest gradient magnitude in the image.
    pub global_max: f64,
    /// Hysteresis sweeps, including the final quiet one.
    pub sweeps: usize,
    /// Worker count used by every parallel stage.
    pub workers: usize,
    pub timings: StageTimings,
}

/// Configured edge detector.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    config: CannyConfig,
    kernel: Kernel,
}

impl EdgeDetector {
    /// Validate `config` and build a detector with the default 5x5 kernel.
    pub fn new(config: CannyConfig) -> Result<Self, CannyError> {
        config.validate()?;
        Ok(Self {
            config,
            kernel: Kernel::default(),
        })
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn config(&self) -> &CannyConfig {
        &self.config
    }

    /// Run every stage on `image`.
    ///
    /// The worker count is resolved once here and used by all four parallel
    /// stages of this run.
    pub fn run(&self, image: &PixelBuffer) -> Result<EdgeReport, CannyError> {
        check_dimensions(image.rows(), image.cols())?;
        let workers = self.config.resolved_workers();
        let mut timings = StageTimings::default();
        let t0 = Instant::now();

        let t = Instant::now();
        let blurred = gaussian_blur(image, &self.kernel, workers)?;
        timings.smoothing_ms = elapsed_ms(t);

        let t = Instant::now();
        let gray = reduce_to_gray(&blurred, workers)?;
        drop(blurred);
        timings.reduction_ms = elapsed_ms(t);

        let t = Instant::now();
        let mut field = compute_gradient(gray.view(), workers)?;
        drop(gray);
        timings.gradient_ms = elapsed_ms(t);

        let t = Instant::now();
        let mut edges = suppress_non_maxima(&mut field, workers)?;
        timings.suppression_ms = elapsed_ms(t);

        let t = Instant::now();
        let sweeps = apply_hysteresis(
            &mut field,
            &mut edges,
            self.config.lower_threshold,
            self.config.higher_threshold,
            self.config.max_sweeps,
        )?;
        timings.hysteresis_ms = elapsed_ms(t);
        timings.total_ms = elapsed_ms(t0);

        debug!(
            "canny: {}x{}x{} workers={} max={:.3} sweeps={} smooth_ms={:.3} gray_ms={:.3} \
             gradient_ms={:.3} nms_ms={:.3} hysteresis_ms={:.3} total_ms={:.3}",
            image.rows(),
            image.cols(),
            image.channels(),
            workers,
            field.global_max(),
            sweeps,
            timings.smoothing_ms,
            timings.reduction_ms,
            timings.gradient_ms,
            timings.suppression_ms,
            timings.hysteresis_ms,
            timings.total_ms,
        );

        Ok(EdgeReport {
            edges,
            global_max: field.global_max(),
            sweeps,
            workers,
            timings,
        })
    }
}

fn check_dimensions(rows: usize, cols: usize) -> Result<(), CannyError> {
    if rows < MIN_DIMENSION || cols < MIN_DIMENSION {
        return Err(CannyError::ImageTooSmall { rows, cols });
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Run the pipeline on a typed buffer and return the `(rows, cols)` edge map.
pub fn detect_edges_with(
    config: &CannyConfig,
    image: &PixelBuffer,
) -> Result<Array2<u8>, CannyError> {
    Ok(EdgeDetector::new(*config)?.run(image)?.edges)
}

/// Detect edges in a flat row-major image with interleaved channels.
///
/// Returns a single-channel buffer of `rows * cols` samples. Fails before any
/// stage runs if the thresholds are not `0 <= lower < higher <= 1`, if either
/// dimension is below 3, or if `pixels` does not hold
/// `rows * cols * channels` samples. `workers` is clamped to [1, 16].
pub fn detect_edges(
    pixels: &[u8],
    rows: usize,
    cols: usize,
    channels: usize,
    lower_threshold: f64,
    higher_threshold: f64,
    workers: usize,
) -> Result<Vec<u8>, CannyError> {
    let config = CannyConfig::new(lower_threshold, higher_threshold).with_workers(workers);
    config.validate()?;
    check_dimensions(rows, cols)?;
    let image = PixelBuffer::from_slice(pixels, rows, cols, channels)?;

    let edges = detect_edges_with(&config, &image)?;
    Ok(edges.into_raw_vec_and_offset().0)
}
