//! Reduction stage: collapse all channels into one intensity plane.
//!
//! Each output pixel is the truncated mean of its channels. Unlike a
//! luminosity conversion no channel is weighted more than another, so
//! single-channel input passes through unchanged.

use ndarray::{Array2, ArrayView3, ArrayViewMut2};

use crate::buffer::{split_rows_mut, try_array2, PixelBuffer};
use crate::error::CannyError;
use crate::partition::partition_rows;
use crate::worker::{describe_workers, fork_join, WorkerDescriptor};

// ============================================================================
// Channel Reduction
// ============================================================================

/// Average the channels of `input` into a `(rows, cols)` plane.
///
/// # Arguments
/// * `input` - Image with any channel count (rows, cols, channels)
/// * `workers` - Worker count, clamped to 1-16
///
/// # Returns
/// Single-channel plane (rows, cols) holding the truncated channel mean
pub fn reduce_to_gray(input: &PixelBuffer, workers: usize) -> Result<Array2<u8>, CannyError> {
    let mut output = try_array2(input.rows(), input.cols(), 0u8)?;

    let ranges = partition_rows(input.rows(), workers);
    let image = input.as_array();
    let bands = split_rows_mut(output.view_mut(), &ranges);
    fork_join("reduction", describe_workers(&ranges, &image, bands), average_rows)?;

    Ok(output)
}

fn average_rows(mut d: WorkerDescriptor<'_, ArrayView3<'_, u8>, ArrayViewMut2<'_, u8>>) {
    let (_, cols, channels) = d.input.dim();

    for row in d.rows.clone() {
        let local = row - d.rows.start;
        for col in 0..cols {
            let sum: u32 = (0..channels).map(|ch| d.input[[row, col, ch]] as u32).sum();
            d.output[[local, col]] = (sum / channels as u32) as u8;
        }
    }
}
