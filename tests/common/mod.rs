//! Shared helpers for the integration tests

#![allow(dead_code)]

use image::{GrayImage, Luma};
use qr_locate::BitMatrix;
use qr_locate::tools::{render_symbol, synthetic_symbol};
use qr_locate::utils::geometry::PerspectiveTransform;
use qr_locate::{Point, Version};

/// Pixels per module used by most tests
pub const MODULE_PX: usize = 4;
/// Quiet zone in modules around rendered symbols
pub const QUIET_ZONE: usize = 4;

/// A version 1 symbol written out module by module
pub const VERSION1_ART: &str = "
X X X X X X X       X       X X X X X X X 
X           X         X X   X           X 
X   X X X   X   X   X X X   X   X X X   X 
X   X X X   X       X X X   X   X X X   X 
X   X X X   X   X   X   X   X   X X X   X 
X           X   X   X       X           X 
X X X X X X X   X   X   X   X X X X X X X 
                  X X X X                 
  X X X X X X           X X X             
X X   X X         X   X X   X     X     X 
X       X X X X X X       X X X   X       
X X X           X X     X       X       X 
X X X       X X   X X X X     X X X X X X 
                  X X       X X   X   X X 
X X X X X X X       X X   X X X X X X X X 
X           X   X   X X   X   X     X X   
X   X X X   X     X           X   X X X   
X   X X X   X   X   X X X X X X           
X   X X X   X     X X X   X     X X X X   
X           X   X X X X   X X X       X   
X X X X X X X     X X X     X X     X X X 
";

/// Parse [`VERSION1_ART`]
pub fn version1_modules() -> BitMatrix {
    BitMatrix::parse(VERSION1_ART, "X ", "  ").expect("valid module art")
}

/// Module grid of a synthetic symbol
pub fn modules(version: u8, seed: u32) -> BitMatrix {
    let version = Version::for_number(version).expect("version in range");
    synthetic_symbol(&version, seed)
}

/// Render with the default module size and quiet zone
pub fn render(modules: &BitMatrix) -> BitMatrix {
    render_symbol(modules, MODULE_PX, QUIET_ZONE)
}

/// Center of module `(x, y)` of a symbol rendered by [`render`]
pub fn pixel_center(x: f64, y: f64) -> Point {
    let scale = MODULE_PX as f64;
    let offset = QUIET_ZONE as f64;
    Point::new((x + offset) * scale, (y + offset) * scale)
}

/// Black pixels become luma 0, white 255
pub fn to_gray_image(matrix: &BitMatrix) -> GrayImage {
    GrayImage::from_fn(matrix.width() as u32, matrix.height() as u32, |x, y| {
        if matrix.get(x as usize, y as usize) {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Threshold at mid gray
pub fn from_gray_image(image: &GrayImage) -> BitMatrix {
    let mut matrix = BitMatrix::new(image.width() as usize, image.height() as usize);
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[0] < 128 {
            matrix.set(x as usize, y as usize, true);
        }
    }
    matrix
}

/// Project `source` onto a `width` x `height` canvas so that its corners
/// land on `corners` (top-left, top-right, bottom-right, bottom-left).
///
/// Each canvas pixel takes the source pixel under its center; pixels that
/// map outside the source stay white.
pub fn warp(source: &BitMatrix, corners: [Point; 4], width: usize, height: usize) -> BitMatrix {
    let (sw, sh) = (source.width() as f64, source.height() as f64);
    let square = [
        Point::new(0.0, 0.0),
        Point::new(sw, 0.0),
        Point::new(sw, sh),
        Point::new(0.0, sh),
    ];
    let to_source =
        PerspectiveTransform::quadrilateral_to_quadrilateral(&corners, &square).expect("non-degenerate corners");

    let mut canvas = BitMatrix::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let p = to_source.transform_point(&Point::new(x as f64 + 0.5, y as f64 + 0.5));
            let inside = p.x >= 0.0 && p.y >= 0.0 && p.x < sw && p.y < sh;
            if inside && source.get(p.x.floor() as usize, p.y.floor() as usize) {
                canvas.set(x, y, true);
            }
        }
    }
    canvas
}
