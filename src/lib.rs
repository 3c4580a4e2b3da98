//! Parallel Canny edge detection.
//!
//! Computes a single-channel edge map from an 8-bit raster image with a
//! five-stage pipeline, four of whose stages split the image rows across a
//! fixed number of worker threads.
//!
//! ## Image Format
//! Input is a flat row-major buffer with interleaved channels, any channel
//! count >= 1:
//! - **Grayscale**: (rows, cols, 1)
//! - **RGB**: (rows, cols, 3)
//! - **RGBA**: (rows, cols, 4) - alpha is averaged like any other channel
//!
//! Output is always (rows, cols) with values 0-255. The one-pixel image
//! border is always 0.
//!
//! ## Pipeline
//! 1. Smoothing - 5x5 weighted blur, border-renormalized (parallel)
//! 2. Reduction - channel mean (parallel)
//! 3. Gradient - Sobel magnitude/direction and global maximum (parallel),
//!    then border replication (sequential)
//! 4. Suppression - non-maximum suppression along the gradient (parallel)
//! 5. Hysteresis - double thresholding until a sweep changes nothing (sequential)
//!
//! Every parallel stage is a full fork/join on a freshly spawned pool, so a
//! stage never starts before the previous one has finished. The result is
//! bit-identical for every worker count.
//!
//! ```
//! use canny_parallel::detect_edges;
//!
//! let pixels = vec![128u8; 5 * 5 * 3];
//! let edges = detect_edges(&pixels, 5, 5, 3, 0.03, 0.1, 4).unwrap();
//! assert!(edges.iter().all(|&v| v == 0));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod filters;
pub mod partition;
pub mod pipeline;
mod worker;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::PixelBuffer;
pub use config::{num_threads, set_num_threads, CannyConfig, MAX_WORKERS, MIN_WORKERS};
pub use error::CannyError;
pub use filters::{GradientField, Kernel};
pub use partition::partition_rows;
pub use pipeline::{detect_edges, detect_edges_with, EdgeDetector, EdgeReport, StageTimings};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::{CannyConfig, CannyError, EdgeDetector, PixelBuffer};

    fn to_py_err(err: CannyError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    /// Detect edges in a (height, width, channels) u8 image.
    ///
    /// Returns a (height, width) u8 edge map. `workers` defaults to the
    /// process-wide value set with `set_num_threads`.
    #[pyfunction]
    #[pyo3(signature = (image, lower_threshold=0.03, higher_threshold=0.1, workers=None))]
    pub fn canny_edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        lower_threshold: f64,
        higher_threshold: f64,
        workers: Option<usize>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let config = CannyConfig {
            lower_threshold,
            higher_threshold,
            workers,
            max_sweeps: None,
        };
        let detector = EdgeDetector::new(config).map_err(to_py_err)?;
        let buffer = PixelBuffer::from_array(image.as_array().to_owned()).map_err(to_py_err)?;

        let report = py
            .allow_threads(|| detector.run(&buffer))
            .map_err(to_py_err)?;
        Ok(report.edges.into_pyarray(py))
    }

    /// Set the process-wide worker count (clamped to 1-16).
    #[pyfunction]
    pub fn set_num_threads(n: usize) {
        crate::config::set_num_threads(n);
    }

    /// Current process-wide worker count.
    #[pyfunction]
    pub fn get_num_threads() -> usize {
        crate::config::num_threads()
    }

    #[pymodule]
    pub fn canny_parallel(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(canny_edges, m)?)?;
        m.add_function(wrap_pyfunction!(set_num_threads, m)?)?;
        m.add_function(wrap_pyfunction!(get_num_threads, m)?)?;
        Ok(())
    }
}
