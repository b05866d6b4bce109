/// Locates a symbol from its finder patterns and samples its module grid
use log::debug;

use crate::config::DecodeHints;
use crate::detector::alignment::{AlignmentPattern, AlignmentPatternFinder};
use crate::detector::finder::{FinderPatternInfo, FinderScan};
use crate::detector::sampler;
use crate::detector::sink::ResultPointSink;
use crate::error::{DetectError, NotFoundReason, Result};
use crate::models::{BitMatrix, DetectorResult, Model2Versions, Point, VersionDescriptor, VersionLookup};
use crate::utils::geometry::PerspectiveTransform;

/// Allowance factors tried, in module sizes, around the estimated
/// alignment pattern position
const ALIGNMENT_ALLOWANCE_FACTORS: [f64; 3] = [4.0, 8.0, 16.0];

/// Single-symbol detector over a binary image.
///
/// The detector only borrows the image; every call runs its own scans, so
/// one detector can serve any number of calls.
pub struct Detector<'a, V: VersionLookup = Model2Versions> {
    image: &'a BitMatrix,
    versions: V,
}

impl<'a> Detector<'a> {
    /// Create a detector using the Model 2 version table
    pub fn new(image: &'a BitMatrix) -> Self {
        Self::with_versions(image, Model2Versions)
    }
}

impl<'a, V: VersionLookup> Detector<'a, V> {
    /// Create a detector with a caller supplied version lookup
    pub fn with_versions(image: &'a BitMatrix, versions: V) -> Self {
        Self { image, versions }
    }

    /// The image being searched
    pub fn image(&self) -> &'a BitMatrix {
        self.image
    }

    /// Locate a symbol and sample its modules
    pub fn detect(&self, hints: &DecodeHints) -> Result<DetectorResult> {
        self.detect_with_sink(hints, &mut ())
    }

    /// Like [`detect`](Self::detect), reporting every new finder and
    /// alignment candidate to `sink`.
    pub fn detect_with_sink<S: ResultPointSink + ?Sized>(
        &self,
        hints: &DecodeHints,
        sink: &mut S,
    ) -> Result<DetectorResult> {
        let info = FinderScan::new(self.image, &mut *sink).find(hints)?;
        self.process_finder_pattern_info(&info, sink)
    }

    /// Rectify the symbol whose finder patterns are `info`.
    pub fn process_finder_pattern_info<S: ResultPointSink + ?Sized>(
        &self,
        info: &FinderPatternInfo,
        sink: &mut S,
    ) -> Result<DetectorResult> {
        let top_left = info.top_left.center;
        let top_right = info.top_right.center;
        let bottom_left = info.bottom_left.center;

        let module_size = self.calculate_module_size(&top_left, &top_right, &bottom_left)?;
        if module_size < 1.0 {
            return Err(NotFoundReason::ModuleSizeTooSmall.into());
        }
        let dimension = compute_dimension(&top_left, &top_right, &bottom_left, module_size)?;
        debug!("module size {:.3}, dimension {}", module_size, dimension);

        let version = self
            .versions
            .version_for_dimension(dimension)
            .map_err(|source| DetectError::Format { dimension, source })?;

        // Modules between the finder centers along one edge of the version
        let modules_between = version.dimension_for_version() - 7;
        let mut alignment = None;
        if modules_between <= 0 {
            debug!("version dimension {} leaves no room for an alignment pattern", modules_between + 7);
        } else if !version.alignment_pattern_centers().is_empty() {
            // Guess where a "bottom right" finder pattern would have been
            let bottom_right_x = top_right.x - top_left.x + bottom_left.x;
            let bottom_right_y = top_right.y - top_left.y + bottom_left.y;

            // The alignment pattern sits 3 modules in from that corner
            let correction = 1.0 - 3.0 / modules_between as f64;
            let estimate_x = (top_left.x + correction * (bottom_right_x - top_left.x)) as i64;
            let estimate_y = (top_left.y + correction * (bottom_right_y - top_left.y)) as i64;

            for factor in ALIGNMENT_ALLOWANCE_FACTORS {
                match self.find_alignment_in_region(module_size, estimate_x, estimate_y, factor, sink) {
                    Ok(pattern) => {
                        alignment = Some(pattern);
                        break;
                    }
                    Err(err) => debug!("no alignment pattern within {} modules: {}", factor, err),
                }
            }
            if alignment.is_none() {
                debug!("falling back to the three finder patterns");
            }
        }

        let transform = create_transform(&top_left, &top_right, &bottom_left, alignment.as_ref(), dimension)?;
        let side = dimension as usize;
        let bits = sampler::sample_grid(self.image, side, side, &transform)?;

        let mut points = vec![bottom_left, top_left, top_right];
        points.extend(alignment.map(|a| a.center));
        Ok(DetectorResult::new(bits, points))
    }

    /// Average of the module sizes measured along the top and left edges.
    fn calculate_module_size(&self, top_left: &Point, top_right: &Point, bottom_left: &Point) -> Result<f64> {
        let horizontal = self.calculate_module_size_one_way(top_left, top_right);
        let vertical = self.calculate_module_size_one_way(top_left, bottom_left);
        match (horizontal, vertical) {
            (Some(h), Some(v)) => Ok((h + v) / 2.0),
            _ => Err(NotFoundReason::ModuleSizeUnmeasurable.into()),
        }
    }

    /// Measure the finder pattern width at both ends of one edge; a finder
    /// pattern is 7 modules across.
    fn calculate_module_size_one_way(&self, pattern: &Point, other: &Point) -> Option<f64> {
        let (px, py) = (pattern.x as i64, pattern.y as i64);
        let (ox, oy) = (other.x as i64, other.y as i64);
        let estimate1 = self.size_of_black_white_black_run_both_ways(px, py, ox, oy);
        let estimate2 = self.size_of_black_white_black_run_both_ways(ox, oy, px, py);
        match (estimate1, estimate2) {
            (Some(e1), Some(e2)) => Some((e1 + e2) / 14.0),
            (Some(e), None) | (None, Some(e)) => Some(e / 7.0),
            (None, None) => None,
        }
    }

    /// Width of the finder pattern through `from`: the run towards `to`
    /// plus the run in the opposite direction, clipped to the image.
    fn size_of_black_white_black_run_both_ways(
        &self,
        from_x: i64,
        from_y: i64,
        to_x: i64,
        to_y: i64,
    ) -> Option<f64> {
        let result = self.size_of_black_white_black_run(from_x, from_y, to_x, to_y)?;

        let width = self.image.width() as i64;
        let height = self.image.height() as i64;

        // Now count the other way, without running off the image
        let mut scale = 1.0;
        let mut other_to_x = from_x - (to_x - from_x);
        if other_to_x < 0 {
            scale = from_x as f64 / (from_x - other_to_x) as f64;
            other_to_x = 0;
        } else if other_to_x >= width {
            scale = (width - 1 - from_x) as f64 / (other_to_x - from_x) as f64;
            other_to_x = width - 1;
        }
        let mut other_to_y = (from_y as f64 - (to_y - from_y) as f64 * scale) as i64;

        scale = 1.0;
        if other_to_y < 0 {
            scale = from_y as f64 / (from_y - other_to_y) as f64;
            other_to_y = 0;
        } else if other_to_y >= height {
            scale = (height - 1 - from_y) as f64 / (other_to_y - from_y) as f64;
            other_to_y = height - 1;
        }
        other_to_x = (from_x as f64 + (other_to_x - from_x) as f64 * scale) as i64;

        let other = self.size_of_black_white_black_run(from_x, from_y, other_to_x, other_to_y)?;
        // The start pixel was counted by both runs
        Some(result + other - 1.0)
    }

    /// Bresenham walk from `from` towards `to` through black, white, black;
    /// returns the distance to the first pixel after the second black run.
    fn size_of_black_white_black_run(&self, from_x: i64, from_y: i64, to_x: i64, to_y: i64) -> Option<f64> {
        let steep = (to_y - from_y).abs() > (to_x - from_x).abs();
        let (from_x, from_y, to_x, to_y) = if steep {
            (from_y, from_x, to_y, to_x)
        } else {
            (from_x, from_y, to_x, to_y)
        };

        let dx = (to_x - from_x).abs();
        let dy = (to_y - from_y).abs();
        let mut error = -dx / 2;
        let x_step = if from_x < to_x { 1 } else { -1 };
        let y_step = if from_y < to_y { 1 } else { -1 };

        // Black in states 0 and 2, white in state 1
        let mut state = 0;
        let x_limit = to_x + x_step;
        let mut x = from_x;
        let mut y = from_y;
        while x != x_limit {
            let (real_x, real_y) = if steep { (y, x) } else { (x, y) };
            if (state == 1) == self.pixel(real_x, real_y) {
                if state == 2 {
                    return Some(distance(x, y, from_x, from_y));
                }
                state += 1;
            }
            error += dy;
            if error > 0 {
                if y == to_y {
                    break;
                }
                y += y_step;
                error -= dx;
            }
            x += x_step;
        }

        // Ran out of line in the last black run; treat the pixel just past
        // the end as white
        (state == 2).then(|| distance(to_x + x_step, to_y, from_x, from_y))
    }

    /// Search a square of `allowance_factor` module sizes around the
    /// estimate for an alignment pattern.
    fn find_alignment_in_region<S: ResultPointSink + ?Sized>(
        &self,
        module_size: f64,
        estimate_x: i64,
        estimate_y: i64,
        allowance_factor: f64,
        sink: &mut S,
    ) -> Result<AlignmentPattern> {
        let allowance = (allowance_factor * module_size) as i64;
        let min_extent = module_size * 3.0;

        let left = estimate_x.saturating_sub(allowance).max(0);
        let right = estimate_x.saturating_add(allowance).min(self.image.width() as i64 - 1);
        if (right.saturating_sub(left) as f64) < min_extent {
            return Err(NotFoundReason::RegionTooSmall.into());
        }
        let top = estimate_y.saturating_sub(allowance).max(0);
        let bottom = estimate_y.saturating_add(allowance).min(self.image.height() as i64 - 1);
        if (bottom.saturating_sub(top) as f64) < min_extent {
            return Err(NotFoundReason::RegionTooSmall.into());
        }

        let pattern = AlignmentPatternFinder::new(
            self.image,
            left as usize,
            top as usize,
            (right - left) as usize,
            (bottom - top) as usize,
            module_size,
            sink,
        )
        .find()?;
        debug!("alignment pattern at ({:.1}, {:.1})", pattern.center.x, pattern.center.y);
        Ok(pattern)
    }

    fn pixel(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && self.image.get(x as usize, y as usize)
    }
}

fn distance(ax: i64, ay: i64, bx: i64, by: i64) -> f64 {
    let dx = (ax - bx) as f64;
    let dy = (ay - by) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Symbol side length in modules implied by the finder pattern spacing,
/// snapped to the nearest size of the form `4k + 1`.
pub fn compute_dimension(top_left: &Point, top_right: &Point, bottom_left: &Point, module_size: f64) -> Result<i32> {
    let tltr = (top_left.distance(top_right) / module_size).round() as i32;
    let tlbl = (top_left.distance(bottom_left) / module_size).round() as i32;
    snap_dimension((tltr + tlbl) / 2 + 7)
}

fn snap_dimension(dimension: i32) -> Result<i32> {
    match dimension & 0x03 {
        0 => Ok(dimension + 1),
        2 => Ok(dimension - 1),
        3 => Err(NotFoundReason::InvalidDimension(dimension).into()),
        _ => Ok(dimension),
    }
}

/// Map module space onto the image through the finder pattern centers and
/// either the alignment pattern or the inferred fourth corner.
pub fn create_transform(
    top_left: &Point,
    top_right: &Point,
    bottom_left: &Point,
    alignment: Option<&AlignmentPattern>,
    dimension: i32,
) -> Result<PerspectiveTransform> {
    let dim_minus_three = dimension as f64 - 3.5;
    let (bottom_right, source_bottom_right) = match alignment {
        Some(pattern) => (pattern.center, dim_minus_three - 3.0),
        None => (
            Point::new(
                top_right.x - top_left.x + bottom_left.x,
                top_right.y - top_left.y + bottom_left.y,
            ),
            dim_minus_three,
        ),
    };

    let src = [
        Point::new(3.5, 3.5),
        Point::new(dim_minus_three, 3.5),
        Point::new(source_bottom_right, source_bottom_right),
        Point::new(3.5, dim_minus_three),
    ];
    let dst = [*top_left, *top_right, bottom_right, *bottom_left];
    PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst)
        .ok_or_else(|| NotFoundReason::DegenerateTransform.into())
}
