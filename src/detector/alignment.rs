/// Alignment pattern detection
/// Alignment patterns appear in QR codes version 2 and above: a 5x5 module
/// square whose middle row reads white, black, white in 1:1:1 proportion
/// once the outer black ring is left out.
use log::trace;

use crate::detector::sink::ResultPointSink;
use crate::error::{NotFoundReason, Result};
use crate::models::{BitMatrix, Point};

/// An alignment pattern candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentPattern {
    /// Estimated center in image coordinates
    pub center: Point,
    /// Estimated width of one module in pixels
    pub module_size: f64,
}

impl AlignmentPattern {
    /// Create a new candidate
    pub fn new(x: f64, y: f64, module_size: f64) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
        }
    }

    /// Whether an observation at row `i`, column `j` is this pattern
    pub fn about_equals(&self, module_size: f64, i: f64, j: f64) -> bool {
        if (i - self.center.y).abs() <= module_size && (j - self.center.x).abs() <= module_size {
            let diff = (module_size - self.module_size).abs();
            diff <= 1.0 || diff <= self.module_size
        } else {
            false
        }
    }

    /// Average of this candidate and a new observation
    pub fn combine_estimate(&self, i: f64, j: f64, new_module_size: f64) -> Self {
        Self::new(
            (self.center.x + j) / 2.0,
            (self.center.y + i) / 2.0,
            (self.module_size + new_module_size) / 2.0,
        )
    }
}

/// Searches one rectangle of the image for an alignment pattern.
///
/// Only the inner white-black-white core is matched, since the outer black
/// ring often merges with neighbouring data modules. Rows are visited from
/// the middle of the region outwards because the estimate is usually close.
pub struct AlignmentPatternFinder<'a, S: ResultPointSink + ?Sized> {
    image: &'a BitMatrix,
    start_x: usize,
    start_y: usize,
    width: usize,
    height: usize,
    module_size: f64,
    possible_centers: Vec<AlignmentPattern>,
    sink: &'a mut S,
}

impl<'a, S: ResultPointSink + ?Sized> AlignmentPatternFinder<'a, S> {
    /// Prepare a search of `width x height` pixels from `(start_x, start_y)`
    /// for a pattern built from modules of roughly `module_size` pixels.
    pub fn new(
        image: &'a BitMatrix,
        start_x: usize,
        start_y: usize,
        width: usize,
        height: usize,
        module_size: f64,
        sink: &'a mut S,
    ) -> Self {
        Self {
            image,
            start_x,
            start_y,
            width,
            height,
            module_size,
            possible_centers: Vec::with_capacity(5),
            sink,
        }
    }

    /// Return the first pattern seen twice, else the first seen at all.
    pub fn find(mut self) -> Result<AlignmentPattern> {
        let max_j = self.start_x + self.width;
        let middle_i = self.start_y + self.height / 2;

        for generation in 0..self.height {
            // middle, middle - 1, middle + 1, middle - 2, ...
            let offset = (generation + 1) / 2;
            let i = if generation & 1 == 0 {
                middle_i + offset
            } else {
                match middle_i.checked_sub(offset) {
                    Some(i) => i,
                    None => continue,
                }
            };

            let mut state_count = [0u32; 3];
            let mut j = self.start_x;
            // A white run cut off by the region edge has unknown length
            while j < max_j && !self.image.get(j, i) {
                j += 1;
            }
            let mut current_state = 0usize;
            while j < max_j {
                if self.image.get(j, i) {
                    if current_state == 1 {
                        state_count[1] += 1;
                    } else if current_state == 2 {
                        if self.found_pattern_cross(&state_count) {
                            if let Some(confirmed) = self.handle_possible_center(&state_count, i, j) {
                                return Ok(confirmed);
                            }
                        }
                        state_count = [state_count[2], 1, 0];
                        current_state = 1;
                    } else {
                        current_state += 1;
                        state_count[current_state] += 1;
                    }
                } else {
                    if current_state == 1 {
                        current_state += 1;
                    }
                    state_count[current_state] += 1;
                }
                j += 1;
            }

            if self.found_pattern_cross(&state_count) {
                if let Some(confirmed) = self.handle_possible_center(&state_count, i, max_j) {
                    return Ok(confirmed);
                }
            }
        }

        // Nothing seen twice; settle for the first candidate
        self.possible_centers
            .first()
            .copied()
            .ok_or_else(|| NotFoundReason::NoAlignmentPattern.into())
    }

    fn found_pattern_cross(&self, state_count: &[u32; 3]) -> bool {
        let max_variance = self.module_size / 2.0;
        state_count
            .iter()
            .all(|&c| (self.module_size - c as f64).abs() < max_variance)
    }

    /// Vertical cross-check; returns a combined pattern when the observation
    /// matches an earlier candidate.
    fn handle_possible_center(
        &mut self,
        state_count: &[u32; 3],
        i: usize,
        j: usize,
    ) -> Option<AlignmentPattern> {
        let total: u32 = state_count.iter().sum();
        let center_j = center_from_end(state_count, j);
        let center_i = self.cross_check_vertical(i, center_j as usize, 2 * state_count[1], total)?;
        let module_size = total as f64 / 3.0;

        if let Some(existing) = self
            .possible_centers
            .iter()
            .find(|c| c.about_equals(module_size, center_i, center_j))
        {
            return Some(existing.combine_estimate(center_i, center_j, module_size));
        }

        let pattern = AlignmentPattern::new(center_j, center_i, module_size);
        trace!("new alignment candidate at ({:.1}, {:.1})", center_j, center_i);
        self.possible_centers.push(pattern);
        self.sink.report(pattern.center);
        None
    }

    fn cross_check_vertical(
        &self,
        start_i: usize,
        center_j: usize,
        max_count: u32,
        original_total: u32,
    ) -> Option<f64> {
        let image = self.image;
        let black = |i: isize| image.get(center_j, i as usize);
        let max_i = image.height() as isize;
        let mut sc = [0u32; 3];

        // Up from center
        let mut i = start_i as isize;
        while i >= 0 && black(i) && sc[1] <= max_count {
            sc[1] += 1;
            i -= 1;
        }
        if i < 0 || sc[1] > max_count {
            return None;
        }
        while i >= 0 && !black(i) && sc[0] <= max_count {
            sc[0] += 1;
            i -= 1;
        }
        if sc[0] > max_count {
            return None;
        }

        // Down from center
        i = start_i as isize + 1;
        while i < max_i && black(i) && sc[1] <= max_count {
            sc[1] += 1;
            i += 1;
        }
        if i == max_i || sc[1] > max_count {
            return None;
        }
        while i < max_i && !black(i) && sc[2] <= max_count {
            sc[2] += 1;
            i += 1;
        }
        if sc[2] > max_count {
            return None;
        }

        let total: u32 = sc.iter().sum();
        if 5 * total.abs_diff(original_total) >= 2 * original_total {
            return None;
        }
        self.found_pattern_cross(&sc)
            .then(|| center_from_end(&sc, i as usize))
    }
}

fn center_from_end(state_count: &[u32; 3], end: usize) -> f64 {
    (end as u32 - state_count[2]) as f64 - state_count[1] as f64 / 2.0
}
