//! Hysteresis stage: double thresholding by fixed-point relaxation.
//!
//! Runs on one thread. Each sweep visits every interior pixel in raster
//! order and sees the promotions made earlier in the same sweep, so the
//! sweep order is part of the result.
//!
//! Per pixel, with `hi = higher * max` and `lo = lower * max`:
//! - below `lo`: zeroed;
//! - at or above `hi`: kept;
//! - otherwise: promoted to exactly `hi` if any of its 8 neighbors is
//!   currently at or above `hi`, else zeroed for this sweep.
//!
//! Sweeps repeat until one changes nothing.

use log::debug;
use ndarray::Array2;

use super::gradient::{scale_to_u8, GradientField};
use crate::error::CannyError;

// ============================================================================
// Double Thresholding
// ============================================================================

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Upper bound on the sweeps a run can need.
///
/// Every productive sweep zeroes or promotes at least one pixel, and each
/// interior pixel can be zeroed at most once and promoted at most once, so
/// `2 * interior + 1` sweeps always suffice.
pub fn default_sweep_cap(rows: usize, cols: usize) -> usize {
    let interior = rows.saturating_sub(2) * cols.saturating_sub(2);
    (rows + cols).max(2 * interior + 1)
}

/// Apply double thresholding to `field` in place and write the 8-bit result
/// for every interior pixel into `edges`.
///
/// # Arguments
/// * `field` - Suppressed gradient field, updated in place
/// * `edges` - Edge map from suppression, same shape as `field`
/// * `lower_threshold` - Fraction of the global maximum below which pixels are dropped
/// * `higher_threshold` - Fraction of the global maximum at which pixels are strong
/// * `max_sweeps` - Sweep cap, `None` for [`default_sweep_cap`]
///
/// # Returns
/// Number of sweeps performed, including the final one that made no change.
/// Fails with [`CannyError::NonConvergence`] if every allowed sweep made changes.
pub fn apply_hysteresis(
    field: &mut GradientField,
    edges: &mut Array2<u8>,
    lower_threshold: f64,
    higher_threshold: f64,
    max_sweeps: Option<usize>,
) -> Result<usize, CannyError> {
    let (rows, cols) = (field.rows(), field.cols());
    if edges.dim() != (rows, cols) {
        return Err(CannyError::SizeMismatch {
            expected: rows * cols,
            actual: edges.len(),
        });
    }

    let global_max = field.global_max();
    let hi = higher_threshold * global_max;
    let lo = lower_threshold * global_max;
    let cap = max_sweeps.unwrap_or_else(|| default_sweep_cap(rows, cols));
    let magnitude = field.magnitude_mut();

    let mut sweeps = 0;
    loop {
        if sweeps >= cap {
            return Err(CannyError::NonConvergence { sweeps });
        }
        sweeps += 1;

        let mut changed = false;
        for row in 1..rows.saturating_sub(1) {
            for col in 1..cols.saturating_sub(1) {
                let current = magnitude[[row, col]];
                if current < lo {
                    changed |= current != 0.0;
                    magnitude[[row, col]] = 0.0;
                } else if current < hi {
                    magnitude[[row, col]] = 0.0;
                    if has_strong_neighbor(magnitude, row, col, hi) {
                        magnitude[[row, col]] = hi;
                        changed = true;
                    } else {
                        changed |= current != 0.0;
                    }
                }
                edges[[row, col]] = scale_to_u8(magnitude[[row, col]], global_max);
            }
        }

        if !changed {
            break;
        }
    }

    debug!("hysteresis: converged after {sweeps} sweeps (hi={hi:.3}, lo={lo:.3})");
    Ok(sweeps)
}

fn has_strong_neighbor(magnitude: &Array2<f64>, row: usize, col: usize, hi: f64) -> bool {
    NEIGHBORS.iter().any(|&(dr, dc)| {
        let r = (row as isize + dr) as usize;
        let c = (col as isize + dc) as usize;
        magnitude[[r, c]] >= hi
    })
}
