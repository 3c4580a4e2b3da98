mod common;

use common::synthetic_image::{scene_u8, vertical_step_u8};

use canny_parallel::filters::{compute_gradient, reduce_to_gray, suppress_non_maxima};
use canny_parallel::{
    detect_edges, detect_edges_with, partition_rows, CannyConfig, CannyError, EdgeDetector,
    PixelBuffer,
};

#[test]
fn worker_count_does_not_change_output() {
    let (rows, cols, channels) = (61, 47, 3);
    let pixels = scene_u8(rows, cols, channels);

    let reference = detect_edges(&pixels, rows, cols, channels, 0.03, 0.1, 1).unwrap();
    assert!(
        reference.iter().any(|&v| v > 0),
        "scene should produce some edges"
    );

    for workers in 2..=16 {
        let edges = detect_edges(&pixels, rows, cols, channels, 0.03, 0.1, workers).unwrap();
        assert_eq!(edges, reference, "output differs with {workers} workers");
    }
}

#[test]
fn one_and_four_workers_agree_on_100x100() {
    let pixels = scene_u8(100, 100, 3);
    let one = detect_edges(&pixels, 100, 100, 3, 0.03, 0.1, 1).unwrap();
    let four = detect_edges(&pixels, 100, 100, 3, 0.03, 0.1, 4).unwrap();
    assert_eq!(one, four);
}

#[test]
fn uniform_gray_5x5_has_no_edges() {
    let pixels = vec![128u8; 5 * 5 * 3];
    let edges = detect_edges(&pixels, 5, 5, 3, 0.03, 0.1, 1).unwrap();
    assert_eq!(edges, vec![0u8; 25]);
}

#[test]
fn vertical_step_survives_suppression_at_boundary() {
    let pixels = vertical_step_u8(5, 5, 2, 0, 255);
    let image = PixelBuffer::from_vec(pixels, 5, 5, 1).unwrap();

    let gray = reduce_to_gray(&image, 1).unwrap();
    let mut field = compute_gradient(gray.view(), 1).unwrap();
    let high = 0.1 * field.global_max();
    suppress_non_maxima(&mut field, 1).unwrap();

    let magnitude = field.magnitude();
    for row in 1..4 {
        assert!(magnitude[[row, 1]] >= high, "row {row} left of step");
        assert!(magnitude[[row, 2]] >= high, "row {row} right of step");
        assert_eq!(magnitude[[row, 3]], 0.0, "row {row} flat side");
        // Border columns keep the values replicated from columns 1 and 3.
        assert!(magnitude[[row, 0]] >= high, "row {row} left border");
        assert_eq!(magnitude[[row, 4]], 0.0, "row {row} right border");
    }
}

#[test]
fn border_of_output_is_always_zero() {
    let (rows, cols) = (30, 40);
    let pixels = scene_u8(rows, cols, 1);
    let edges = detect_edges(&pixels, rows, cols, 1, 0.03, 0.1, 6).unwrap();

    for x in 0..cols {
        assert_eq!(edges[x], 0);
        assert_eq!(edges[(rows - 1) * cols + x], 0);
    }
    for y in 0..rows {
        assert_eq!(edges[y * cols], 0);
        assert_eq!(edges[y * cols + cols - 1], 0);
    }
}

#[test]
fn rerun_on_binary_map_keeps_every_edge_pixel() {
    let (rows, cols) = (40, 40);
    let pixels = scene_u8(rows, cols, 3);
    let first = detect_edges(&pixels, rows, cols, 3, 0.03, 0.1, 2).unwrap();
    let binary: Vec<u8> = first.iter().map(|&v| if v > 0 { 255 } else { 0 }).collect();

    assert!(binary.iter().any(|&v| v == 255));

    // With lower=0 every pixel connected to a strong one is promoted, so the
    // second pass can only add edge pixels, never remove strong ones.
    let image = PixelBuffer::from_vec(binary.clone(), rows, cols, 1).unwrap();
    let detector = EdgeDetector::new(CannyConfig::new(0.0, 1.0).with_workers(2)).unwrap();
    let report = detector.run(&image).unwrap();
    assert!(report.edges.iter().any(|&v| v == 255));
    for (i, &v) in binary.iter().enumerate() {
        if v == 255 {
            let (y, x) = (i / cols, i % cols);
            assert!(report.edges[[y, x]] > 0, "edge pixel ({y}, {x}) was lost");
        }
    }
}

#[test]
fn typed_entry_point_matches_flat_one() {
    let pixels = scene_u8(25, 33, 4);
    let flat = detect_edges(&pixels, 25, 33, 4, 0.05, 0.2, 3).unwrap();

    let image = PixelBuffer::from_vec(pixels, 25, 33, 4).unwrap();
    let config = CannyConfig::new(0.05, 0.2).with_workers(3);
    let typed = detect_edges_with(&config, &image).unwrap();
    assert_eq!(typed.into_raw_vec_and_offset().0, flat);
}

#[test]
fn configuration_errors_fail_fast() {
    let pixels = scene_u8(10, 10, 1);
    assert!(matches!(
        detect_edges(&pixels, 10, 10, 1, 0.2, 0.1, 1),
        Err(CannyError::InvalidThresholds { .. })
    ));
    assert!(matches!(
        detect_edges(&pixels, 10, 10, 1, 0.0, 1.01, 1),
        Err(CannyError::InvalidThresholds { .. })
    ));
    assert!(matches!(
        detect_edges(&pixels[..20], 2, 10, 1, 0.03, 0.1, 1),
        Err(CannyError::ImageTooSmall { .. })
    ));
}

#[test]
fn out_of_range_worker_counts_are_clamped() {
    let pixels = scene_u8(20, 20, 1);
    let reference = detect_edges(&pixels, 20, 20, 1, 0.03, 0.1, 1).unwrap();
    assert_eq!(detect_edges(&pixels, 20, 20, 1, 0.03, 0.1, 0).unwrap(), reference);
    assert_eq!(detect_edges(&pixels, 20, 20, 1, 0.03, 0.1, 99).unwrap(), reference);
}

#[test]
fn more_workers_than_rows() {
    let pixels = scene_u8(4, 30, 3);
    assert_eq!(partition_rows(4, 16).iter().filter(|r| r.is_empty()).count(), 15);
    let one = detect_edges(&pixels, 4, 30, 3, 0.03, 0.1, 1).unwrap();
    let many = detect_edges(&pixels, 4, 30, 3, 0.03, 0.1, 16).unwrap();
    assert_eq!(one, many);
}
