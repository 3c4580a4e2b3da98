//! Smoothing stage: 5x5 weighted-average blur.
//!
//! Border pixels average only over the neighbors that lie inside the image
//! and divide by the weight actually used, so there is no zero-padding
//! darkening along the edges. The normalization constant cancels in that
//! ratio, which is why accumulation uses the raw weights: a flat image comes
//! out bit-identical.

use ndarray::{Array2, ArrayView3, ArrayViewMut3};

use crate::buffer::{split_rows_mut, PixelBuffer};
use crate::error::CannyError;
use crate::partition::partition_rows;
use crate::worker::{describe_workers, fork_join, WorkerDescriptor};

// ============================================================================
// Kernel
// ============================================================================

/// Side length of the smoothing kernel.
pub const KERNEL_SIZE: usize = 5;
const RADIUS: isize = (KERNEL_SIZE / 2) as isize;

/// Symmetric, non-negative 5x5 weight matrix with its normalization constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: [[f64; KERNEL_SIZE]; KERNEL_SIZE],
    normalization: f64,
}

impl Kernel {
    /// Build a kernel, checking that the weights are finite, non-negative and
    /// symmetric, that the centre weight is positive, and that
    /// `normalization == 1 / sum(weights)`.
    pub fn new(
        weights: [[f64; KERNEL_SIZE]; KERNEL_SIZE],
        normalization: f64,
    ) -> Result<Self, CannyError> {
        let mut sum = 0.0;
        for (r, row) in weights.iter().enumerate() {
            for (c, &w) in row.iter().enumerate() {
                if !w.is_finite() || w < 0.0 {
                    return Err(CannyError::InvalidKernel(format!(
                        "weight at ({r}, {c}) must be finite and non-negative, got {w}"
                    )));
                }
                if w != weights[c][r] {
                    return Err(CannyError::InvalidKernel(format!(
                        "weights are not symmetric at ({r}, {c})"
                    )));
                }
                sum += w;
            }
        }

        let centre = KERNEL_SIZE / 2;
        if weights[centre][centre] <= 0.0 {
            return Err(CannyError::InvalidKernel(
                "centre weight must be positive".to_string(),
            ));
        }
        if !normalization.is_finite() || (normalization * sum - 1.0).abs() > 1e-9 {
            return Err(CannyError::InvalidKernel(format!(
                "normalization {normalization} is not 1/{sum}"
            )));
        }

        Ok(Self {
            weights,
            normalization,
        })
    }

    /// The classic 5x5 Gaussian approximation (sigma about 1.4), normalized by 1/159.
    pub fn gaussian_5x5() -> Self {
        Self {
            weights: [
                [2.0, 4.0, 5.0, 4.0, 2.0],
                [4.0, 9.0, 12.0, 9.0, 4.0],
                [5.0, 12.0, 15.0, 12.0, 5.0],
                [4.0, 9.0, 12.0, 9.0, 4.0],
                [2.0, 4.0, 5.0, 4.0, 2.0],
            ],
            normalization: 1.0 / 159.0,
        }
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Weights scaled by the normalization constant (they sum to 1).
    pub fn normalized(&self) -> Array2<f64> {
        Array2::from_shape_fn((KERNEL_SIZE, KERNEL_SIZE), |(r, c)| {
            self.weights[r][c] * self.normalization
        })
    }

    #[inline]
    fn weight(&self, dr: isize, dc: isize) -> f64 {
        self.weights[(dr + RADIUS) as usize][(dc + RADIUS) as usize]
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::gaussian_5x5()
    }
}

// ============================================================================
// Parallel Blur
// ============================================================================

struct SmoothInput<'a> {
    image: ArrayView3<'a, u8>,
    kernel: &'a Kernel,
}

/// Blur every channel of `input` with `kernel`, split across `workers` row bands.
///
/// # Arguments
/// * `input` - Image with any channel count (rows, cols, channels)
/// * `kernel` - 5x5 weights; border pixels renormalize over in-bounds weights
/// * `workers` - Worker count, clamped to 1-16
///
/// # Returns
/// Freshly allocated blurred image with the same shape as `input`
pub fn gaussian_blur(
    input: &PixelBuffer,
    kernel: &Kernel,
    workers: usize,
) -> Result<PixelBuffer, CannyError> {
    let mut output = PixelBuffer::zeros(input.rows(), input.cols(), input.channels())?;

    let ranges = partition_rows(input.rows(), workers);
    let shared = SmoothInput {
        image: input.as_array(),
        kernel,
    };
    let bands = split_rows_mut(output.as_array_mut(), &ranges);
    fork_join("smoothing", describe_workers(&ranges, &shared, bands), blur_rows)?;

    Ok(output)
}

fn blur_rows(mut d: WorkerDescriptor<'_, SmoothInput<'_>, ArrayViewMut3<'_, u8>>) {
    let image = &d.input.image;
    let kernel = d.input.kernel;
    let (rows, cols, channels) = image.dim();
    let (rows, cols) = (rows as isize, cols as isize);

    for row in d.rows.clone() {
        let local = row - d.rows.start;
        let row = row as isize;
        for col in 0..cols {
            for ch in 0..channels {
                let mut sum = 0.0;
                let mut weight_sum = 0.0;
                for dr in -RADIUS..=RADIUS {
                    let r = row + dr;
                    if r < 0 || r >= rows {
                        continue;
                    }
                    for dc in -RADIUS..=RADIUS {
                        let c = col + dc;
                        if c < 0 || c >= cols {
                            continue;
                        }
                        let w = kernel.weight(dr, dc);
                        sum += image[[r as usize, c as usize, ch]] as f64 * w;
                        weight_sum += w;
                    }
                }
                d.output[[local, col as usize, ch]] = (sum / weight_sum) as u8;
            }
        }
    }
}
