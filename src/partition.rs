//! Row partitioning for parallel stages.

use std::ops::Range;

use crate::config::clamp_workers;

/// Split rows `[0, rows)` into one contiguous range per worker.
///
/// The worker count is clamped to [1, 16]. Every range but the last holds
/// `rows / workers` rows; the last one absorbs the remainder. When
/// `rows < workers` the leading ranges are empty.
pub fn partition_rows(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = clamp_workers(workers);
    let chunk = rows / workers;

    (0..workers)
        .map(|t| {
            let start = t * chunk;
            let end = if t == workers - 1 { rows } else { start + chunk };
            start..end
        })
        .collect()
}

/// Interior rows of `range`, i.e. the part that excludes row 0 and row `rows - 1`.
#[inline]
pub(crate) fn interior_rows(range: &Range<usize>, rows: usize) -> Range<usize> {
    let start = range.start.max(1);
    let end = range.end.min(rows.saturating_sub(1));
    start..end.max(start)
}
