//! Synthetic symbol rendering for tests and benchmarks.
//!
//! Symbols are built as module grids with the fixed function patterns in
//! place and pseudo-random data elsewhere, then scaled to pixels. Nothing
//! here tries to produce a decodable symbol.

use crate::models::{BitMatrix, Version, VersionDescriptor};

/// Draw a 7x7 module finder pattern with its top-left pixel at
/// `(left, top)`. Its center is at `left + 3.5 * module_px`.
pub fn draw_finder_pattern(image: &mut BitMatrix, left: usize, top: usize, module_px: usize) {
    draw_concentric(image, left, top, module_px, 7);
}

/// Draw a 5x5 module alignment pattern with its top-left pixel at
/// `(left, top)`. Its center is at `left + 2.5 * module_px`.
pub fn draw_alignment_pattern(image: &mut BitMatrix, left: usize, top: usize, module_px: usize) {
    draw_concentric(image, left, top, module_px, 5);
}

/// Alternating black and white square rings, black outermost, over an odd
/// number of modules.
fn draw_concentric(image: &mut BitMatrix, left: usize, top: usize, module_px: usize, modules: usize) {
    let last = modules - 1;
    for my in 0..modules {
        for mx in 0..modules {
            let ring = mx.min(my).min(last - mx).min(last - my);
            let black = ring % 2 == 0 || ring == last / 2;
            for y in 0..module_px {
                for x in 0..module_px {
                    image.set(left + mx * module_px + x, top + my * module_px + y, black);
                }
            }
        }
    }
}

/// Build the module grid of a symbol of the given version.
///
/// Finder patterns, separators, timing patterns and alignment patterns
/// follow the symbol layout; every other module is filled from a linear
/// congruential generator seeded with `seed`, so the same inputs always
/// give the same grid.
pub fn synthetic_symbol(version: &Version, seed: u32) -> BitMatrix {
    let d = version.dimension_for_version() as usize;
    let mut modules = BitMatrix::square(d);
    let mut reserved = BitMatrix::square(d);

    // Finder patterns with their white separators
    for (left, top) in [(0, 0), (d - 7, 0), (0, d - 7)] {
        draw_finder_pattern(&mut modules, left, top, 1);
    }
    reserved.set_region(0, 0, 8, 8);
    reserved.set_region(d - 8, 0, 8, 8);
    reserved.set_region(0, d - 8, 8, 8);

    // Timing patterns
    for k in 8..d - 8 {
        modules.set(k, 6, k % 2 == 0);
        modules.set(6, k, k % 2 == 0);
        reserved.set(k, 6, true);
        reserved.set(6, k, true);
    }

    let centers = version.alignment_pattern_centers();
    for &cy in centers {
        for &cx in centers {
            let (cx, cy) = (cx as usize, cy as usize);
            let near = |c: usize| c < 9;
            let far = |c: usize| c + 9 > d;
            if (near(cx) && near(cy)) || (far(cx) && near(cy)) || (near(cx) && far(cy)) {
                continue;
            }
            draw_alignment_pattern(&mut modules, cx - 2, cy - 2, 1);
            reserved.set_region(cx - 2, cy - 2, 5, 5);
        }
    }

    let mut state = seed;
    for y in 0..d {
        for x in 0..d {
            if reserved.get(x, y) {
                continue;
            }
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            modules.set(x, y, state >> 31 == 1);
        }
    }
    modules
}

/// Draw `modules` onto `canvas`, each module as a `module_px` square, with
/// the grid's top-left corner at pixel `(left, top)`.
pub fn draw_modules(canvas: &mut BitMatrix, modules: &BitMatrix, left: usize, top: usize, module_px: usize) {
    for my in 0..modules.height() {
        for mx in 0..modules.width() {
            if modules.get(mx, my) {
                canvas.set_region(left + mx * module_px, top + my * module_px, module_px, module_px);
            }
        }
    }
}

/// Scale a module grid to pixels with a white border of `quiet_zone`
/// modules on every side.
pub fn render_symbol(modules: &BitMatrix, module_px: usize, quiet_zone: usize) -> BitMatrix {
    let width = (modules.width() + 2 * quiet_zone) * module_px;
    let height = (modules.height() + 2 * quiet_zone) * module_px;
    let mut image = BitMatrix::new(width, height);
    let offset = quiet_zone * module_px;
    draw_modules(&mut image, modules, offset, offset, module_px);
    image
}
