/// Module grid sampling through a perspective transform
use crate::error::SamplingError;
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Sample a `dimension_x` by `dimension_y` module grid.
///
/// `transform` maps module space (module `(x, y)` has its center at
/// `(x + 0.5, y + 0.5)`) to image pixels. Each module takes the value of
/// the single pixel under its center.
pub fn sample_grid(
    image: &BitMatrix,
    dimension_x: usize,
    dimension_y: usize,
    transform: &PerspectiveTransform,
) -> Result<BitMatrix, SamplingError> {
    if dimension_x == 0 || dimension_y == 0 {
        return Err(SamplingError::EmptyGrid);
    }
    let mut bits = BitMatrix::new(dimension_x, dimension_y);
    let mut points = vec![0.0f64; 2 * dimension_x];
    for y in 0..dimension_y {
        let row_center = y as f64 + 0.5;
        for (x, pair) in points.chunks_exact_mut(2).enumerate() {
            pair[0] = x as f64 + 0.5;
            pair[1] = row_center;
        }
        transform.transform_points(&mut points);
        // Quick check to see if points have been transformed to a valid place
        check_and_nudge_points(image, &mut points)?;
        for (x, pair) in points.chunks_exact(2).enumerate() {
            let (px, py) = pixel_in_bounds(image, pair[0], pair[1])?;
            if image.get(px, py) {
                bits.set(x, y, true);
            }
        }
    }
    Ok(bits)
}

/// Sample a grid whose transform is given by four corresponding corners in
/// module space (`src`) and image space (`dst`).
pub fn sample_grid_quads(
    image: &BitMatrix,
    dimension_x: usize,
    dimension_y: usize,
    src: &[Point; 4],
    dst: &[Point; 4],
) -> Result<BitMatrix, SamplingError> {
    let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(src, dst)
        .ok_or(SamplingError::NonFinite)?;
    sample_grid(image, dimension_x, dimension_y, &transform)
}

/// Validate interleaved `x, y` points against the image bounds.
///
/// Only the ends of a row are checked: starting at each end, points are
/// inspected until one needs no nudging. A point up to one pixel outside
/// the image is pulled onto the edge; anything further out is an error.
pub fn check_and_nudge_points(image: &BitMatrix, points: &mut [f64]) -> Result<(), SamplingError> {
    let width = image.width() as i64;
    let height = image.height() as i64;

    let mut nudged = true;
    for pair in points.chunks_exact_mut(2) {
        if !nudged {
            break;
        }
        nudged = nudge(pair, width, height)?;
    }

    nudged = true;
    for pair in points.chunks_exact_mut(2).rev() {
        if !nudged {
            break;
        }
        nudged = nudge(pair, width, height)?;
    }
    Ok(())
}

fn nudge(pair: &mut [f64], width: i64, height: i64) -> Result<bool, SamplingError> {
    if !pair[0].is_finite() || !pair[1].is_finite() {
        return Err(SamplingError::NonFinite);
    }
    let x = pair[0] as i64;
    let y = pair[1] as i64;
    if x < -1 || x > width || y < -1 || y > height {
        return Err(out_of_bounds(x, y, width, height));
    }

    let mut nudged = false;
    if x == -1 {
        pair[0] = 0.0;
        nudged = true;
    } else if x == width {
        pair[0] = (width - 1) as f64;
        nudged = true;
    }
    if y == -1 {
        pair[1] = 0.0;
        nudged = true;
    } else if y == height {
        pair[1] = (height - 1) as f64;
        nudged = true;
    }
    Ok(nudged)
}

/// Interior points are not nudged, so a twisted transform can still land
/// outside the image here.
fn pixel_in_bounds(image: &BitMatrix, x: f64, y: f64) -> Result<(usize, usize), SamplingError> {
    let width = image.width() as i64;
    let height = image.height() as i64;
    if !x.is_finite() || !y.is_finite() {
        return Err(SamplingError::NonFinite);
    }
    let (px, py) = (x as i64, y as i64);
    if px < 0 || px >= width || py < 0 || py >= height {
        return Err(out_of_bounds(px, py, width, height));
    }
    Ok((px as usize, py as usize))
}

fn out_of_bounds(x: i64, y: i64, width: i64, height: i64) -> SamplingError {
    SamplingError::OutOfBounds {
        x,
        y,
        width: width as usize,
        height: height as usize,
    }
}
