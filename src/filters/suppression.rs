//! Suppression stage: thin edges to one-pixel ridges.
//!
//! A pixel survives only if neither neighbor along its gradient direction has
//! a strictly larger magnitude. Neighbors are always read from the gradient
//! stage's magnitudes, never from values another worker may already have
//! suppressed, so the result does not depend on how rows are partitioned.

use ndarray::{ArrayView2, ArrayViewMut2};

use super::gradient::{scale_to_u8, GradientField};
use crate::buffer::{split_rows_mut, try_array2, try_copy2};
use crate::error::CannyError;
use crate::partition::{interior_rows, partition_rows};
use crate::worker::{describe_workers, fork_join, WorkerDescriptor};

// ============================================================================
// Direction Classes
// ============================================================================

/// Direction class obtained by folding antipodal quantized directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 0 / 180: compare left and right.
    Horizontal,
    /// 45 / 225: compare lower-right and upper-left.
    DiagonalAscending,
    /// 90 / 270: compare below and above.
    Vertical,
    /// Everything else, including 135 / 315 and 360.
    DiagonalDescending,
}

impl Direction {
    /// Classify a quantized direction. Anything outside the first three
    /// antipodal pairs is treated as the descending diagonal.
    pub fn classify(theta: i32) -> Self {
        match theta {
            0 | 180 => Self::Horizontal,
            45 | 225 => Self::DiagonalAscending,
            90 | 270 => Self::Vertical,
            _ => Self::DiagonalDescending,
        }
    }

    /// `(row, col)` offsets of the two neighbors compared against.
    pub fn neighbor_offsets(self) -> [(isize, isize); 2] {
        match self {
            Self::Horizontal => [(0, -1), (0, 1)],
            Self::DiagonalAscending => [(1, 1), (-1, -1)],
            Self::Vertical => [(1, 0), (-1, 0)],
            Self::DiagonalDescending => [(1, -1), (-1, 1)],
        }
    }
}

// ============================================================================
// Non-Maximum Suppression
// ============================================================================

struct SuppressionInput<'a> {
    magnitude: ArrayView2<'a, f64>,
    direction: ArrayView2<'a, i32>,
    global_max: f64,
}

type SuppressionBands<'a> = (ArrayViewMut2<'a, f64>, ArrayViewMut2<'a, u8>);

/// Zero non-maximal magnitudes in `field` and return the scaled 8-bit map.
///
/// Only interior pixels are touched; border magnitudes keep their replicated
/// values and border output pixels stay 0.
///
/// # Arguments
/// * `field` - Gradient field; its magnitudes are replaced by the suppressed ones
/// * `workers` - Worker count, clamped to 1-16
///
/// # Returns
/// Edge map (rows, cols) scaled so the global maximum maps to 255
pub fn suppress_non_maxima(
    field: &mut GradientField,
    workers: usize,
) -> Result<ndarray::Array2<u8>, CannyError> {
    let (rows, cols) = (field.rows(), field.cols());
    let mut suppressed = try_copy2(field.magnitude())?;
    let mut output = try_array2(rows, cols, 0u8)?;

    let ranges = partition_rows(rows, workers);
    {
        let shared = SuppressionInput {
            magnitude: field.magnitude().view(),
            direction: field.direction().view(),
            global_max: field.global_max(),
        };
        let bands: Vec<SuppressionBands<'_>> = split_rows_mut(suppressed.view_mut(), &ranges)
            .into_iter()
            .zip(split_rows_mut(output.view_mut(), &ranges))
            .collect();
        fork_join("suppression", describe_workers(&ranges, &shared, bands), suppress_rows)?;
    }

    field.set_magnitude(suppressed);
    Ok(output)
}

fn suppress_rows(d: WorkerDescriptor<'_, SuppressionInput<'_>, SuppressionBands<'_>>) {
    let input = d.input;
    let (rows, cols) = input.magnitude.dim();
    let (mut suppressed, mut output) = d.output;

    for row in interior_rows(&d.rows, rows) {
        let local = row - d.rows.start;
        for col in 1..cols.saturating_sub(1) {
            let current = input.magnitude[[row, col]];
            let direction = Direction::classify(input.direction[[row, col]]);

            let dominated = direction.neighbor_offsets().iter().any(|&(dr, dc)| {
                let r = (row as isize + dr) as usize;
                let c = (col as isize + dc) as usize;
                current < input.magnitude[[r, c]]
            });
            let kept = if dominated { 0.0 } else { current };

            suppressed[[local, col]] = kept;
            output[[local, col]] = scale_to_u8(kept, input.global_max);
        }
    }
}
