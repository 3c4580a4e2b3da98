//! Gradient stage: Sobel magnitude, quantized direction, global maximum.
//!
//! Interior pixels are convolved with the two 3x3 Sobel kernels. Border
//! pixels are filled afterwards by [`fix_borders`], which copies the adjacent
//! interior row/column, so every pixel has a defined magnitude and direction
//! before suppression runs.
//!
//! ## Direction quantization
//!
//! The angle `atan2(gy, gx)` in degrees is shifted by 180, truncated to an
//! integer and then floored to a multiple of 45. Values are normally in
//! `{0, 45, ..., 315}`; a horizontal gradient pointing left (`gy == +0`,
//! `gx < 0`) lands exactly on 360. Degrees are computed against pi truncated
//! to 8 decimals, so exact negative multiples of 45 degrees (e.g. straight
//! down, -90) come out a hair past the boundary and fall one bucket lower.

use std::sync::{Mutex, PoisonError};

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::buffer::{split_rows_mut, try_array2};
use crate::error::CannyError;
use crate::partition::{interior_rows, partition_rows};
use crate::worker::{describe_workers, fork_join, WorkerDescriptor};

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Pi to 8 decimals; fixes where exact multiples of 45 degrees fall.
const TRUNCATED_PI: f64 = 3.141_592_65;

// ============================================================================
// Gradient Field
// ============================================================================

/// Per-pixel gradient magnitude and quantized direction, plus the largest
/// magnitude seen anywhere in the image.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    magnitude: Array2<f64>,
    direction: Array2<i32>,
    global_max: f64,
}

impl GradientField {
    /// Assemble a field from precomputed parts. Both arrays must share a shape.
    pub fn from_parts(
        magnitude: Array2<f64>,
        direction: Array2<i32>,
        global_max: f64,
    ) -> Result<Self, CannyError> {
        if magnitude.dim() != direction.dim() {
            return Err(CannyError::SizeMismatch {
                expected: magnitude.len(),
                actual: direction.len(),
            });
        }
        Ok(Self {
            magnitude,
            direction,
            global_max,
        })
    }

    pub fn rows(&self) -> usize {
        self.magnitude.nrows()
    }

    pub fn cols(&self) -> usize {
        self.magnitude.ncols()
    }

    pub fn magnitude(&self) -> &Array2<f64> {
        &self.magnitude
    }

    pub fn direction(&self) -> &Array2<i32> {
        &self.direction
    }

    pub fn global_max(&self) -> f64 {
        self.global_max
    }

    pub(crate) fn magnitude_mut(&mut self) -> &mut Array2<f64> {
        &mut self.magnitude
    }

    pub(crate) fn set_magnitude(&mut self, magnitude: Array2<f64>) {
        debug_assert_eq!(magnitude.dim(), self.direction.dim());
        self.magnitude = magnitude;
    }
}

// ============================================================================
// Sobel Gradient
// ============================================================================

/// Largest magnitude across all workers. Each worker merges its local
/// maximum exactly once, under the lock.
#[derive(Debug, Default)]
struct GlobalMax(Mutex<f64>);

impl GlobalMax {
    fn merge(&self, local: f64) {
        let mut max = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if local > *max {
            *max = local;
        }
    }

    fn into_inner(self) -> f64 {
        self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

struct GradientInput<'a, 'm> {
    gray: ArrayView2<'a, u8>,
    global_max: &'m GlobalMax,
}

type GradientBands<'a> = (ArrayViewMut2<'a, f64>, ArrayViewMut2<'a, i32>);

/// Compute the gradient field of a single-channel image, then fill its border.
///
/// # Arguments
/// * `gray` - Single-channel image (rows, cols)
/// * `workers` - Worker count, clamped to 1-16
///
/// # Returns
/// Magnitudes, quantized directions and the global maximum magnitude, with
/// the border replicated from the adjacent interior pixels
pub fn compute_gradient(
    gray: ArrayView2<'_, u8>,
    workers: usize,
) -> Result<GradientField, CannyError> {
    let (rows, cols) = gray.dim();
    let mut magnitude = try_array2(rows, cols, 0.0f64)?;
    let mut direction = try_array2(rows, cols, 0i32)?;
    let global_max = GlobalMax::default();

    let ranges = partition_rows(rows, workers);
    let shared = GradientInput {
        gray: gray.view(),
        global_max: &global_max,
    };
    let bands: Vec<GradientBands<'_>> = split_rows_mut(magnitude.view_mut(), &ranges)
        .into_iter()
        .zip(split_rows_mut(direction.view_mut(), &ranges))
        .collect();
    fork_join("gradient", describe_workers(&ranges, &shared, bands), gradient_rows)?;

    let mut field = GradientField {
        magnitude,
        direction,
        global_max: global_max.into_inner(),
    };
    fix_borders(&mut field);
    Ok(field)
}

fn gradient_rows(d: WorkerDescriptor<'_, GradientInput<'_, '_>, GradientBands<'_>>) {
    let gray = &d.input.gray;
    let (rows, cols) = gray.dim();
    let (mut magnitude, mut direction) = d.output;
    let mut local_max = 0.0f64;

    for row in interior_rows(&d.rows, rows) {
        let local = row - d.rows.start;
        for col in 1..cols.saturating_sub(1) {
            let mut gx = 0.0f64;
            let mut gy = 0.0f64;
            for dr in 0..3 {
                for dc in 0..3 {
                    let p = gray[[row + dr - 1, col + dc - 1]] as f64;
                    gx += SOBEL_X[2 - dr][2 - dc] as f64 * p;
                    gy += SOBEL_Y[2 - dr][2 - dc] as f64 * p;
                }
            }

            let m = (gx * gx + gy * gy).sqrt();
            magnitude[[local, col]] = m;
            direction[[local, col]] = quantize_direction(gx, gy);
            if m > local_max {
                local_max = m;
            }
        }
    }

    d.input.global_max.merge(local_max);
}

/// Quantize the gradient angle to a multiple of 45 degrees in `[0, 360]`.
#[inline]
pub fn quantize_direction(gx: f64, gy: f64) -> i32 {
    let degrees = gy.atan2(gx) * 180.0 / TRUNCATED_PI;
    let theta = (180.0 + degrees) as i32;
    (theta / 45) * 45
}

// ============================================================================
// Border Fixup
// ============================================================================

/// Replicate the first/last interior row and column into the border.
///
/// Rows 0 and `rows - 1` copy rows 1 and `rows - 2` (interior columns only),
/// then columns 0 and `cols - 1` copy columns 1 and `cols - 2` for every row,
/// which also fills the corners. Images without an interior are left alone.
pub fn fix_borders(field: &mut GradientField) {
    let (rows, cols) = (field.rows(), field.cols());
    if rows < 3 || cols < 3 {
        return;
    }

    replicate_border(&mut field.magnitude);
    replicate_border(&mut field.direction);
}

fn replicate_border<T: Copy>(grid: &mut Array2<T>) {
    let (rows, cols) = grid.dim();
    for col in 1..cols - 1 {
        grid[[0, col]] = grid[[1, col]];
        grid[[rows - 1, col]] = grid[[rows - 2, col]];
    }
    for row in 0..rows {
        grid[[row, 0]] = grid[[row, 1]];
        grid[[row, cols - 1]] = grid[[row, cols - 2]];
    }
}

/// Scale a magnitude into 0..=255 relative to the global maximum.
///
/// A zero maximum gives `0 * inf = NaN`, which casts to 0: a flat image maps
/// to an all-black edge map.
#[inline]
pub(crate) fn scale_to_u8(magnitude: f64, global_max: f64) -> u8 {
    (magnitude * (255.0 / global_max)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5x5 step: columns 0-1 black, 2-4 white.
    fn vertical_step() -> Array2<u8> {
        Array2::from_shape_fn((5, 5), |(_, c)| if c < 2 { 0 } else { 255 })
    }

    #[test]
    fn test_quantize_direction_buckets() {
        assert_eq!(quantize_direction(1.0, 0.0), 180);
        assert_eq!(quantize_direction(0.0, 1.0), 270);
        assert_eq!(quantize_direction(1.0, 1.0), 225);
        assert_eq!(quantize_direction(-1.0, 1.0), 315);
        assert_eq!(quantize_direction(0.0, 0.0), 180);
        assert_eq!(quantize_direction(-1.0, 0.0), 360);
        assert_eq!(quantize_direction(1.0, 0.2), 180);
    }

    #[test]
    fn test_negative_exact_angles_drop_a_bucket() {
        // -90 and -135 degrees overshoot slightly and truncate downwards.
        assert_eq!(quantize_direction(0.0, -1.0), 45);
        assert_eq!(quantize_direction(-1.0, -1.0), 0);
        assert_eq!(quantize_direction(1.0, -1.0), 90);
    }

    #[test]
    fn test_flat_image_has_no_gradient() {
        let gray = Array2::<u8>::from_elem((5, 5), 128);
        let field = compute_gradient(gray.view(), 1).unwrap();
        assert_eq!(field.global_max(), 0.0);
        assert!(field.magnitude().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_vertical_step_response() {
        let field = compute_gradient(vertical_step().view(), 1).unwrap();

        // Columns 1 and 2 straddle the step: |gx| = 4 * 255.
        assert_eq!(field.global_max(), 1020.0);
        for row in 0..5 {
            assert_eq!(field.magnitude()[[row, 1]], 1020.0);
            assert_eq!(field.magnitude()[[row, 2]], 1020.0);
            assert_eq!(field.magnitude()[[row, 3]], 0.0);
            assert_eq!(field.direction()[[row, 1]], 360);
        }
    }

    #[test]
    fn test_field_outlives_borrowed_input() {
        // The returned field owns its buffers; only the call borrows `gray`.
        let field = {
            let gray = vertical_step();
            let view = gray.slice(ndarray::s![.., ..]);
            compute_gradient(view, 3).unwrap()
        };
        assert_eq!(field.global_max(), 1020.0);
        assert_eq!(field.magnitude()[[2, 1]], 1020.0);
    }

    #[test]
    fn test_border_replicates_interior() {
        let gray = Array2::from_shape_fn((6, 7), |(r, c)| ((r * 31 + c * 17) % 256) as u8);
        let field = compute_gradient(gray.view(), 2).unwrap();
        let m = field.magnitude();
        let d = field.direction();

        for col in 1..6 {
            assert_eq!(m[[0, col]], m[[1, col]]);
            assert_eq!(m[[5, col]], m[[4, col]]);
            assert_eq!(d[[0, col]], d[[1, col]]);
        }
        for row in 0..6 {
            assert_eq!(m[[row, 0]], m[[row, 1]]);
            assert_eq!(m[[row, 6]], m[[row, 5]]);
            assert_eq!(d[[row, 6]], d[[row, 5]]);
        }
    }

    #[test]
    fn test_global_max_independent_of_workers() {
        let gray = Array2::from_shape_fn((23, 19), |(r, c)| ((r * r * 7 + c * 13) % 256) as u8);
        let reference = compute_gradient(gray.view(), 1).unwrap();
        let max = reference.magnitude().iter().cloned().fold(0.0, f64::max);
        assert_eq!(reference.global_max(), max);

        for workers in 2..=16 {
            let field = compute_gradient(gray.view(), workers).unwrap();
            assert_eq!(field, reference, "workers {workers}");
        }
    }

    #[test]
    fn test_scale_to_u8() {
        assert_eq!(scale_to_u8(1020.0, 1020.0), 255);
        assert_eq!(scale_to_u8(510.0, 1020.0), 127);
        assert_eq!(scale_to_u8(0.0, 0.0), 0);
    }
}
