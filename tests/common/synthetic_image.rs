/// Generates a multi-channel test scene: a shaded background, a bright disc,
/// a dark bar and a faint diagonal stripe, with deterministic speckle noise.
pub fn scene_u8(rows: usize, cols: usize, channels: usize) -> Vec<u8> {
    assert!(rows > 0 && cols > 0, "image dimensions must be positive");
    assert!(channels > 0, "channel count must be positive");

    let (cy, cx) = (rows as f64 * 0.45, cols as f64 * 0.55);
    let radius = rows.min(cols) as f64 * 0.3;

    let mut img = vec![0u8; rows * cols * channels];
    for y in 0..rows {
        for x in 0..cols {
            let dy = y as f64 - cy;
            let dx = x as f64 - cx;
            let mut base = 40.0 + 60.0 * x as f64 / cols as f64;
            if (dx * dx + dy * dy).sqrt() < radius {
                base = 210.0;
            }
            if y > rows * 3 / 4 && x > cols / 8 && x < cols / 2 {
                base = 15.0;
            }
            if (x + y) % 17 == 0 {
                base += 25.0;
            }
            let speckle = ((x * 7919 + y * 104_729) % 13) as f64 - 6.0;

            for c in 0..channels {
                let tint = (c as f64) * 9.0;
                let v = (base + speckle + tint).clamp(0.0, 255.0);
                img[(y * cols + x) * channels + c] = v as u8;
            }
        }
    }
    img
}

/// Single-channel step: columns left of `split` are `low`, the rest `high`.
pub fn vertical_step_u8(rows: usize, cols: usize, split: usize, low: u8, high: u8) -> Vec<u8> {
    let mut img = vec![low; rows * cols];
    for y in 0..rows {
        for x in split..cols {
            img[y * cols + x] = high;
        }
    }
    img
}
