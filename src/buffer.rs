//! Pixel buffers and allocation helpers.
//!
//! ## Layout
//!
//! A [`PixelBuffer`] is a row-major `(rows, cols, channels)` block of 8-bit
//! samples with channels interleaved, matching what image decoders hand out.
//! Indexing goes through `ndarray`, so every accessor is bounds-checked and no
//! call site repeats the flat-offset arithmetic.
//!
//! Stage outputs are always freshly allocated. Allocation goes through
//! `try_reserve_exact` so an oversized image surfaces as
//! [`CannyError::Allocation`] instead of aborting the process.

use std::ops::Range;

use ndarray::{Array2, Array3, ArrayView3, ArrayViewMut, Axis, Dimension};

use crate::error::CannyError;

/// Multi-channel 8-bit image, row-major with interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Wrap a flat sample vector of length `rows * cols * channels`.
    pub fn from_vec(
        pixels: Vec<u8>,
        rows: usize,
        cols: usize,
        channels: usize,
    ) -> Result<Self, CannyError> {
        if channels == 0 {
            return Err(CannyError::NoChannels);
        }
        let expected = sample_count(rows, cols, channels)?;
        if pixels.len() != expected {
            return Err(CannyError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let data = Array3::from_shape_vec((rows, cols, channels), pixels).map_err(|_| {
            CannyError::SizeMismatch {
                expected,
                actual: rows * cols * channels,
            }
        })?;
        Ok(Self { data })
    }

    /// Copy a flat sample slice into a new buffer.
    pub fn from_slice(
        pixels: &[u8],
        rows: usize,
        cols: usize,
        channels: usize,
    ) -> Result<Self, CannyError> {
        let mut owned = try_vec_with_capacity(pixels.len())?;
        owned.extend_from_slice(pixels);
        Self::from_vec(owned, rows, cols, channels)
    }

    /// Wrap an `(rows, cols, channels)` array.
    pub fn from_array(data: Array3<u8>) -> Result<Self, CannyError> {
        if data.dim().2 == 0 {
            return Err(CannyError::NoChannels);
        }
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// Zero-filled buffer of the given shape.
    pub fn zeros(rows: usize, cols: usize, channels: usize) -> Result<Self, CannyError> {
        let len = sample_count(rows, cols, channels)?;
        Self::from_vec(try_filled(len, 0)?, rows, cols, channels)
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Sample at `(row, col, channel)`, or `None` outside the image.
    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<u8> {
        self.data.get([row, col, channel]).copied()
    }

    pub fn as_array(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub(crate) fn as_array_mut(&mut self) -> ndarray::ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Flat row-major samples.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_raw_vec_and_offset().0
    }
}

fn sample_count(rows: usize, cols: usize, channels: usize) -> Result<usize, CannyError> {
    rows.checked_mul(cols)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(CannyError::Allocation {
            elements: usize::MAX,
        })
}

pub(crate) fn try_vec_with_capacity<T>(len: usize) -> Result<Vec<T>, CannyError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CannyError::Allocation { elements: len })?;
    Ok(data)
}

pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, CannyError> {
    let mut data = try_vec_with_capacity(len)?;
    data.resize(len, value);
    Ok(data)
}

/// Fallible `Array2::from_elem`.
pub(crate) fn try_array2<T: Clone>(
    rows: usize,
    cols: usize,
    value: T,
) -> Result<Array2<T>, CannyError> {
    let len = rows.checked_mul(cols).ok_or(CannyError::Allocation {
        elements: usize::MAX,
    })?;
    let data = try_filled(len, value)?;
    Array2::from_shape_vec((rows, cols), data).map_err(|_| CannyError::SizeMismatch {
        expected: len,
        actual: rows * cols,
    })
}

/// Fallible deep copy of a 2D array.
pub(crate) fn try_copy2<T: Clone>(src: &Array2<T>) -> Result<Array2<T>, CannyError> {
    let mut data = try_vec_with_capacity(src.len())?;
    data.extend(src.iter().cloned());
    Array2::from_shape_vec(src.dim(), data).map_err(|_| CannyError::SizeMismatch {
        expected: src.len(),
        actual: src.len(),
    })
}

/// Carve a mutable view into disjoint row bands, one per range.
///
/// `ranges` must be contiguous and start at row 0, as produced by
/// [`crate::partition::partition_rows`]. Band `i` covers exactly `ranges[i]`,
/// so band-local row `r` is image row `ranges[i].start + r`.
pub(crate) fn split_rows_mut<'a, A, D>(
    mut view: ArrayViewMut<'a, A, D>,
    ranges: &[Range<usize>],
) -> Vec<ArrayViewMut<'a, A, D>>
where
    D: Dimension,
{
    let mut bands = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (band, rest) = view.split_at(Axis(0), range.len());
        bands.push(band);
        view = rest;
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition_rows;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(PixelBuffer::from_vec(vec![0; 12], 2, 2, 3).is_ok());
        match PixelBuffer::from_vec(vec![0; 11], 2, 2, 3) {
            Err(CannyError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 11);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            PixelBuffer::from_vec(vec![], 2, 2, 0),
            Err(CannyError::NoChannels)
        ));
    }

    #[test]
    fn test_get_is_row_major_interleaved() {
        let pixels: Vec<u8> = (0..24).collect();
        let buf = PixelBuffer::from_vec(pixels, 2, 4, 3).unwrap();
        assert_eq!(buf.get(0, 0, 0), Some(0));
        assert_eq!(buf.get(0, 1, 2), Some(5));
        assert_eq!(buf.get(1, 0, 0), Some(12));
        assert_eq!(buf.get(1, 3, 2), Some(23));
        assert_eq!(buf.get(2, 0, 0), None);
        assert_eq!(buf.get(0, 0, 3), None);
    }

    #[test]
    fn test_into_vec_roundtrips_transposed_input() {
        let arr = Array3::<u8>::from_shape_fn((3, 2, 1), |(r, c, _)| (r * 10 + c) as u8);
        let transposed = arr.clone().permuted_axes([1, 0, 2]);
        let buf = PixelBuffer::from_array(transposed).unwrap();
        assert_eq!((buf.rows(), buf.cols()), (2, 3));
        assert_eq!(buf.into_vec(), vec![0, 10, 20, 1, 11, 21]);
    }

    #[test]
    fn test_split_rows_mut_writes_disjoint_bands() {
        let mut grid = Array2::<u32>::zeros((7, 3));
        let ranges = partition_rows(7, 3);
        let bands = split_rows_mut(grid.view_mut(), &ranges);
        assert_eq!(bands.len(), 3);
        for (mut band, range) in bands.into_iter().zip(&ranges) {
            assert_eq!(band.nrows(), range.len());
            for (local, mut row) in band.rows_mut().into_iter().enumerate() {
                row.fill((range.start + local) as u32);
            }
        }
        for r in 0..7 {
            assert!(grid.row(r).iter().all(|&v| v == r as u32));
        }
    }
}
