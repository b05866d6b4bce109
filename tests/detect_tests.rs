//! End to end detection on synthetic symbols
//!
//! Symbols are rendered at 4 pixels per module with a 4 module quiet zone,
//! so finder pattern centers fall on exact pixel boundaries and every
//! reference point can be checked for equality.

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use image::imageops;
use qr_locate::detector::finder::{FinderScan, ScanMode};
use qr_locate::models::{Model2Versions, UnsupportedDimension, VersionLookup};
use qr_locate::tools::{draw_modules, render_symbol};
use qr_locate::{
    BitMatrix, DecodeHints, DetectError, Detector, MultiDetector, NotFoundReason, Point, Version, detect,
    detect_many, detect_multi,
};

/// Accepts only the listed dimensions
struct OnlyDimensions(&'static [i32]);

impl VersionLookup for OnlyDimensions {
    type Version = Version;

    fn version_for_dimension(&self, dimension: i32) -> Result<Version, UnsupportedDimension> {
        if self.0.contains(&dimension) {
            Model2Versions.version_for_dimension(dimension)
        } else {
            Err(UnsupportedDimension(dimension))
        }
    }
}

#[test]
fn test_version1_from_ascii_art() {
    let modules = version1_modules();
    assert_eq!(modules.width(), 21);
    // Render at 3 pixels per module this time
    let image = render_symbol(&modules, 3, 4);

    let result = detect(&image, &DecodeHints::default()).unwrap();
    assert_eq!(
        result.points,
        vec![
            Point::new(22.5, 64.5),
            Point::new(22.5, 22.5),
            Point::new(64.5, 22.5)
        ]
    );
    assert_eq!(result.alignment_point(), None);
    assert_eq!(result.bits, modules);
    // Display writes the same art back
    assert_eq!(result.bits.to_string().trim_end(), VERSION1_ART.trim_matches('\n').trim_end());
}

#[test]
fn test_try_harder_gives_same_result() {
    let modules = version1_modules();
    let image = render_symbol(&modules, 3, 4);
    let normal = detect(&image, &DecodeHints::default()).unwrap();
    let harder = detect(&image, &DecodeHints::try_harder()).unwrap();
    assert_eq!(normal, harder);
}

#[test]
fn test_version2_uses_alignment_pattern() {
    let modules = modules(2, 1);
    let image = render(&modules);

    let result = detect(&image, &DecodeHints::default()).unwrap();
    assert_eq!(result.dimension(), 25);
    assert_eq!(
        result.points,
        vec![
            pixel_center(3.5, 21.5),
            pixel_center(3.5, 3.5),
            pixel_center(21.5, 3.5),
            pixel_center(18.5, 18.5),
        ]
    );
    assert_eq!(result.bits, modules);
}

#[test]
fn test_larger_versions() {
    for (version, seed) in [(3, 9), (7, 3)] {
        let modules = modules(version, seed);
        let image = render(&modules);
        let result = detect(&image, &DecodeHints::default()).unwrap();
        let d = 17.0 + 4.0 * version as f64;
        assert_eq!(result.dimension(), d as usize);
        assert_eq!(result.alignment_point(), Some(pixel_center(d - 6.5, d - 6.5)));
        assert_eq!(result.bits, modules, "version {version}");
    }
}

#[test]
fn test_rotated_symbol() {
    let modules = modules(2, 5);
    let upright = to_gray_image(&render(&modules));
    let rotated = from_gray_image(&imageops::rotate90(&upright));
    let side = rotated.height() as f64;

    // Clockwise rotation takes (x, y) to (side - y, x)
    let rotate = |p: Point| Point::new(side - p.y, p.x);

    let result = detect(&rotated, &DecodeHints::default()).unwrap();
    let expected: Vec<Point> = [
        pixel_center(3.5, 21.5),
        pixel_center(3.5, 3.5),
        pixel_center(21.5, 3.5),
        pixel_center(18.5, 18.5),
    ]
    .into_iter()
    .map(rotate)
    .collect();
    for (got, want) in result.points.iter().zip(&expected) {
        assert_abs_diff_eq!(got.x, want.x, epsilon = 1e-9);
        assert_abs_diff_eq!(got.y, want.y, epsilon = 1e-9);
    }
    // Sampling follows the symbol, not the image
    assert_eq!(result.bits, modules);
}

#[test]
fn test_sink_receives_candidates() {
    let image = render(&modules(2, 1));
    let mut reported: Vec<Point> = Vec::new();
    Detector::new(&image)
        .detect_with_sink(&DecodeHints::default(), &mut reported)
        .unwrap();
    assert_eq!(
        reported,
        vec![
            pixel_center(3.5, 3.5),
            pixel_center(21.5, 3.5),
            pixel_center(3.5, 21.5),
            pixel_center(18.5, 18.5),
        ]
    );
}

#[test]
fn test_two_symbols() {
    let left = modules(1, 1);
    let right = modules(1, 2);
    let mut canvas = BitMatrix::new(260, 160);
    draw_modules(&mut canvas, &left, 16, 16, MODULE_PX);
    draw_modules(&mut canvas, &right, 150, 30, MODULE_PX);

    let mut results = detect_multi(&canvas, &DecodeHints::default());
    results.sort_by(|a, b| a.points[1].x.total_cmp(&b.points[1].x));
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].points[1], Point::new(30.0, 30.0));
    assert_eq!(results[0].bits, left);
    assert_eq!(
        results[1].points,
        vec![
            Point::new(164.0, 100.0),
            Point::new(164.0, 44.0),
            Point::new(220.0, 44.0)
        ]
    );
    assert_eq!(results[1].bits, right);
}

#[test]
fn test_multi_scan_visits_every_corner() {
    let left = modules(1, 1);
    let right = modules(1, 2);
    let mut canvas = BitMatrix::new(260, 160);
    draw_modules(&mut canvas, &left, 16, 16, MODULE_PX);
    draw_modules(&mut canvas, &right, 150, 30, MODULE_PX);

    let candidates = FinderScan::new(&canvas, &mut ()).scan(&DecodeHints::default(), ScanMode::Multi);
    assert_eq!(candidates.len(), 6);
    assert!(candidates.iter().all(|c| c.count >= 2 && c.module_size == 4.0));
}

#[test]
fn test_perspective_warped_symbols() {
    // Opposite corners pulled unevenly, so no parallelogram fits
    let corners = [
        Point::new(20.0, 30.0),
        Point::new(230.0, 10.0),
        Point::new(250.0, 240.0),
        Point::new(10.0, 220.0),
    ];
    for (version, seed) in [(2, 1), (5, 2)] {
        let modules = modules(version, seed);
        let upright = render_symbol(&modules, 6, QUIET_ZONE);
        let image = warp(&upright, corners, 270, 270);

        let result = detect(&image, &DecodeHints::default()).unwrap();
        assert_eq!(result.dimension(), modules.width(), "version {version}");
        assert!(result.alignment_point().is_some());
        assert_eq!(result.bits, modules, "version {version}");
    }
}

/// Version 1 at the top left, version 2 lower right
fn mixed_version_canvas() -> (BitMatrix, BitMatrix, BitMatrix) {
    let small = modules(1, 1);
    let large = modules(2, 3);
    let mut canvas = BitMatrix::new(280, 180);
    draw_modules(&mut canvas, &small, 16, 16, MODULE_PX);
    draw_modules(&mut canvas, &large, 150, 60, MODULE_PX);
    (canvas, small, large)
}

#[test]
fn test_multi_skips_failing_triples() {
    let (canvas, small, large) = mixed_version_canvas();
    let hints = DecodeHints::default();

    let mut both = MultiDetector::new(&canvas).detect_multi(&hints).unwrap();
    both.sort_by_key(|r| r.dimension());
    assert_eq!(both.len(), 2);
    assert_eq!(both[0].bits, small);
    assert_eq!(both[1].bits, large);

    // The version 2 triple fails with a format error; the other survives
    let only_small = MultiDetector::with_versions(&canvas, OnlyDimensions(&[21]))
        .detect_multi(&hints)
        .unwrap();
    assert_eq!(only_small.len(), 1);
    assert_eq!(only_small[0].bits, small);
    assert_eq!(only_small[0].points[1], Point::new(30.0, 30.0));

    let only_large = MultiDetector::with_versions(&canvas, OnlyDimensions(&[25]))
        .detect_multi(&hints)
        .unwrap();
    assert_eq!(only_large.len(), 1);
    assert_eq!(only_large[0].bits, large);

    // Triples exist but none rectifies
    let none = MultiDetector::with_versions(&canvas, OnlyDimensions(&[]))
        .detect_multi(&hints)
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_nothing_to_find() {
    let blank = BitMatrix::new(120, 120);
    let err = detect(&blank, &DecodeHints::default()).unwrap_err();
    assert_eq!(err, DetectError::NotFound(NotFoundReason::TooFewCandidates(0)));
    assert!(detect_multi(&blank, &DecodeHints::default()).is_empty());
    assert!(MultiDetector::new(&blank).detect_multi(&DecodeHints::default()).is_err());
}

#[test]
fn test_detect_many_in_parallel() {
    let images: Vec<BitMatrix> = (1..=4).map(|seed| render(&modules(2, seed))).collect();
    let results = detect_many(&images, &DecodeHints::default());
    for (seed, result) in (1..=4).zip(results) {
        assert_eq!(result.unwrap().bits, modules(2, seed));
    }
}
