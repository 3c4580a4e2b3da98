//! Stages of the edge pipeline.
//!
//! | Stage | Module | Input | Output | Threads |
//! |-------|--------|-------|--------|---------|
//! | Smoothing | [`smooth`] | (H, W, C) u8 | (H, W, C) u8 | parallel |
//! | Reduction | [`grayscale`] | (H, W, C) u8 | (H, W) u8 | parallel |
//! | Gradient | [`gradient`] | (H, W) u8 | [`GradientField`] | parallel + border fixup |
//! | Suppression | [`suppression`] | [`GradientField`] | (H, W) u8 | parallel |
//! | Hysteresis | [`hysteresis`] | [`GradientField`] + (H, W) u8 | (H, W) u8 | sequential |
//!
//! Parallel stages split the rows with [`crate::partition_rows`]; each worker
//! writes only its own rows of a freshly allocated output, and the stage
//! returns only after every worker has finished.

pub mod gradient;
pub mod grayscale;
pub mod hysteresis;
pub mod smooth;
pub mod suppression;

pub use gradient::{compute_gradient, fix_borders, quantize_direction, GradientField};
pub use grayscale::reduce_to_gray;
pub use hysteresis::{apply_hysteresis, default_sweep_cap};
pub use smooth::{gaussian_blur, Kernel};
pub use suppression::{suppress_non_maxima, Direction};
