//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat byte arrays as produced by `ImageData` (RGBA, 4 channels) or any
//! other interleaved layout.

use wasm_bindgen::prelude::*;

use crate::pipeline::detect_edges;

/// Detect edges in a flat interleaved u8 image.
///
/// # Arguments
/// * `data` - Flat array of samples (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - Samples per pixel
/// * `lower_threshold` - Low hysteresis threshold, fraction of the strongest gradient
/// * `higher_threshold` - High hysteresis threshold, fraction of the strongest gradient
/// * `workers` - Worker count, clamped to 1-16
///
/// # Returns
/// Flat array of width * height edge values (0-255)
#[wasm_bindgen]
pub fn canny_edges_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    lower_threshold: f64,
    higher_threshold: f64,
    workers: usize,
) -> Result<Vec<u8>, JsValue> {
    detect_edges(
        data,
        height,
        width,
        channels,
        lower_threshold,
        higher_threshold,
        workers,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))
}
