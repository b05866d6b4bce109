/// Finder pattern detection using 1:1:3:1:1 ratio scanning with
/// vertical, horizontal and diagonal cross-checks
use log::{debug, trace};

use crate::config::DecodeHints;
use crate::detector::sink::ResultPointSink;
use crate::error::{NotFoundReason, Result};
use crate::models::point::order_indices;
use crate::models::{BitMatrix, Point};

/// Observations needed before a candidate counts as confirmed
pub(crate) const CENTER_QUORUM: u32 = 2;
const MIN_SKIP: usize = 3;
/// Largest symbol (in modules) the default row stride must not skip over
const MAX_MODULES: usize = 97;

/// A finder pattern candidate: one of the three large corner markers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Estimated center in image coordinates
    pub center: Point,
    /// Estimated width of one module in pixels
    pub module_size: f64,
    /// Number of scans that observed this pattern
    pub count: u32,
}

impl FinderPattern {
    /// A candidate seen once
    pub fn new(x: f64, y: f64, module_size: f64) -> Self {
        Self::with_count(x, y, module_size, 1)
    }

    /// A candidate seen `count` times
    pub fn with_count(x: f64, y: f64, module_size: f64, count: u32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            count,
        }
    }

    /// Whether an observation at row `i`, column `j` with the given module
    /// size is the same pattern.
    pub fn about_equals(&self, module_size: f64, i: f64, j: f64) -> bool {
        if (i - self.center.y).abs() <= module_size && (j - self.center.x).abs() <= module_size {
            let diff = (module_size - self.module_size).abs();
            diff <= 1.0 || diff <= self.module_size
        } else {
            false
        }
    }

    /// Fold a new observation into the running average, weighted by how
    /// many observations this candidate already carries.
    pub fn combine_estimate(&self, i: f64, j: f64, new_module_size: f64) -> Self {
        let count = self.count as f64;
        let combined = count + 1.0;
        Self::with_count(
            (count * self.center.x + j) / combined,
            (count * self.center.y + i) / combined,
            (count * self.module_size + new_module_size) / combined,
            self.count + 1,
        )
    }
}

/// The three finder patterns of one symbol, in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPatternInfo {
    /// Bottom-left corner marker
    pub bottom_left: FinderPattern,
    /// Top-left corner marker
    pub top_left: FinderPattern,
    /// Top-right corner marker
    pub top_right: FinderPattern,
}

impl FinderPatternInfo {
    /// Order three patterns into bottom-left, top-left and top-right.
    pub fn new(patterns: [FinderPattern; 3]) -> Self {
        let [bl, tl, tr] = order_indices(&patterns.map(|p| p.center));
        Self {
            bottom_left: patterns[bl],
            top_left: patterns[tl],
            top_right: patterns[tr],
        }
    }

    /// Centers as `[bottom_left, top_left, top_right]`
    pub fn points(&self) -> [Point; 3] {
        [self.bottom_left.center, self.top_left.center, self.top_right.center]
    }
}

/// How much of the image a scan covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Skip rows once two corners are confirmed and stop as soon as three
    /// consistent corners exist
    Single,
    /// Visit every stride row; used when several symbols may be present
    Multi,
}

/// Scan state for one pass over an image.
///
/// A scan is created per call and consumed by [`scan`](Self::scan) or
/// [`find`](Self::find); the candidate list it builds is handed back to the
/// caller and never shared.
pub struct FinderScan<'a, S: ResultPointSink + ?Sized> {
    image: &'a BitMatrix,
    sink: &'a mut S,
    possible_centers: Vec<FinderPattern>,
    has_skipped: bool,
}

impl<'a, S: ResultPointSink + ?Sized> FinderScan<'a, S> {
    /// Prepare a scan of `image`, reporting new candidates to `sink`
    pub fn new(image: &'a BitMatrix, sink: &'a mut S) -> Self {
        Self {
            image,
            sink,
            possible_centers: Vec::new(),
            has_skipped: false,
        }
    }

    /// Locate the best finder pattern triple.
    pub fn find(self, hints: &DecodeHints) -> Result<FinderPatternInfo> {
        let mut candidates = self.scan(hints, ScanMode::Single);
        let best = select_best_patterns(&mut candidates)?;
        Ok(FinderPatternInfo::new(best))
    }

    /// Run the row scan and return every candidate found.
    pub fn scan(mut self, hints: &DecodeHints, mode: ScanMode) -> Vec<FinderPattern> {
        let max_i = self.image.height();
        let max_j = self.image.width();

        // Search every `skip` rows so the smallest symbol we care about still
        // gets crossed by a few of them.
        let mut skip = (3 * max_i) / (4 * MAX_MODULES);
        if skip < MIN_SKIP || hints.try_harder {
            skip = MIN_SKIP;
        }

        let mut done = false;
        let mut i = skip as isize - 1;
        while i < max_i as isize && !done {
            let y = i as usize;
            let mut state_count = [0u32; 5];
            let mut current_state = 0usize;
            let mut j = 0usize;
            while j < max_j {
                if self.image.get(j, y) {
                    // Black pixel
                    if current_state & 1 == 1 {
                        current_state += 1;
                    }
                    state_count[current_state] += 1;
                } else if current_state & 1 == 1 {
                    // White pixel while counting white
                    state_count[current_state] += 1;
                } else if current_state < 4 {
                    current_state += 1;
                    state_count[current_state] += 1;
                } else if found_pattern_cross(&state_count)
                    && self.handle_possible_center(&state_count, y, j)
                {
                    let center_run = state_count[2] as isize;
                    state_count = [0; 5];
                    current_state = 0;
                    if mode == ScanMode::Multi {
                        j += 1;
                        continue;
                    }
                    skip = 2;
                    if self.has_skipped {
                        done = self.have_multiply_confirmed_centers();
                    } else {
                        let row_skip = self.find_row_skip();
                        if row_skip > center_run {
                            // Jump ahead to where the next corner should be and
                            // give up on the rest of this row
                            i += row_skip - center_run - skip as isize;
                            break;
                        }
                    }
                } else {
                    shift_counts2(&mut state_count);
                    current_state = 3;
                }
                j += 1;
            }

            if found_pattern_cross(&state_count)
                && self.handle_possible_center(&state_count, y, max_j)
                && mode == ScanMode::Single
            {
                skip = (state_count[0] as usize).max(1);
                if self.has_skipped {
                    done = self.have_multiply_confirmed_centers();
                }
            }
            i += skip as isize;
        }

        debug!(
            "finder scan ({:?}) found {} candidates",
            mode,
            self.possible_centers.len()
        );
        self.possible_centers
    }

    /// Confirm a horizontal hit with vertical, horizontal and diagonal
    /// cross-checks, then merge it into the candidate list.
    ///
    /// `i` is the row and `j` the column just past the pattern.
    fn handle_possible_center(&mut self, state_count: &[u32; 5], i: usize, j: usize) -> bool {
        let total: u32 = state_count.iter().sum();
        let center_j = center_from_end(state_count, j);
        let Some(center_i) = self.cross_check_vertical(i, center_j as usize, state_count[2], total)
        else {
            return false;
        };
        let Some(center_j) =
            self.cross_check_horizontal(center_j as usize, center_i as usize, state_count[2], total)
        else {
            return false;
        };
        if !self.cross_check_diagonal(center_i as usize, center_j as usize) {
            return false;
        }

        let module_size = total as f64 / 7.0;
        match self
            .possible_centers
            .iter_mut()
            .find(|c| c.about_equals(module_size, center_i, center_j))
        {
            Some(existing) => {
                *existing = existing.combine_estimate(center_i, center_j, module_size);
            }
            None => {
                let pattern = FinderPattern::new(center_j, center_i, module_size);
                trace!(
                    "new finder candidate at ({:.1}, {:.1}), module {:.2}",
                    center_j, center_i, module_size
                );
                self.possible_centers.push(pattern);
                self.sink.report(pattern.center);
            }
        }
        true
    }

    /// Count runs up and down column `center_j` from row `start_i`.
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
        let mut sc = [0u32; 5];

        // Up through the center
        let mut i = start_i as isize;
        while i >= 0 && black(i) {
            sc[2] += 1;
            i -= 1;
        }
        if i < 0 {
            return None;
        }
        while i >= 0 && !black(i) && sc[1] <= max_count {
            sc[1] += 1;
            i -= 1;
        }
        // Ran off the top or the white run is too long
        if i < 0 || sc[1] > max_count {
            return None;
        }
        while i >= 0 && black(i) && sc[0] <= max_count {
            sc[0] += 1;
            i -= 1;
        }
        if sc[0] > max_count {
            return None;
        }

        // Now down
        i = start_i as isize + 1;
        while i < max_i && black(i) {
            sc[2] += 1;
            i += 1;
        }
        if i == max_i {
            return None;
        }
        while i < max_i && !black(i) && sc[3] < max_count {
            sc[3] += 1;
            i += 1;
        }
        if i == max_i || sc[3] >= max_count {
            return None;
        }
        while i < max_i && black(i) && sc[4] < max_count {
            sc[4] += 1;
            i += 1;
        }
        if sc[4] >= max_count {
            return None;
        }

        // The vertical extent may differ from the horizontal one by less
        // than 40%
        let total: u32 = sc.iter().sum();
        if 5 * total.abs_diff(original_total) >= 2 * original_total {
            return None;
        }
        found_pattern_cross(&sc).then(|| center_from_end(&sc, i as usize))
    }

    /// Count runs left and right along row `center_i` from column `start_j`.
    fn cross_check_horizontal(
        &self,
        start_j: usize,
        center_i: usize,
        max_count: u32,
        original_total: u32,
    ) -> Option<f64> {
        let image = self.image;
        let black = |j: isize| image.get(j as usize, center_i);
        let max_j = image.width() as isize;
        let mut sc = [0u32; 5];

        let mut j = start_j as isize;
        while j >= 0 && black(j) {
            sc[2] += 1;
            j -= 1;
        }
        if j < 0 {
            return None;
        }
        while j >= 0 && !black(j) && sc[1] <= max_count {
            sc[1] += 1;
            j -= 1;
        }
        if j < 0 || sc[1] > max_count {
            return None;
        }
        while j >= 0 && black(j) && sc[0] <= max_count {
            sc[0] += 1;
            j -= 1;
        }
        if sc[0] > max_count {
            return None;
        }

        j = start_j as isize + 1;
        while j < max_j && black(j) {
            sc[2] += 1;
            j += 1;
        }
        if j == max_j {
            return None;
        }
        while j < max_j && !black(j) && sc[3] < max_count {
            sc[3] += 1;
            j += 1;
        }
        if j == max_j || sc[3] >= max_count {
            return None;
        }
        while j < max_j && black(j) && sc[4] < max_count {
            sc[4] += 1;
            j += 1;
        }
        if sc[4] >= max_count {
            return None;
        }

        // Tighter than the vertical check: within 20% of the row scan
        let total: u32 = sc.iter().sum();
        if 5 * total.abs_diff(original_total) >= original_total {
            return None;
        }
        found_pattern_cross(&sc).then(|| center_from_end(&sc, j as usize))
    }

    /// Check the 1:1:3:1:1 ratio along the diagonal through the center,
    /// which rejects many false positives in dense data areas.
    fn cross_check_diagonal(&self, center_i: usize, center_j: usize) -> bool {
        let image = self.image;
        let mut sc = [0u32; 5];

        // Up and to the left
        let mut i = 0;
        while i <= center_i && i <= center_j && image.get(center_j - i, center_i - i) {
            sc[2] += 1;
            i += 1;
        }
        if sc[2] == 0 {
            return false;
        }
        while i <= center_i && i <= center_j && !image.get(center_j - i, center_i - i) {
            sc[1] += 1;
            i += 1;
        }
        if sc[1] == 0 {
            return false;
        }
        while i <= center_i && i <= center_j && image.get(center_j - i, center_i - i) {
            sc[0] += 1;
            i += 1;
        }
        if sc[0] == 0 {
            return false;
        }

        // Down and to the right
        let max_i = image.height();
        let max_j = image.width();
        i = 1;
        while center_i + i < max_i
            && center_j + i < max_j
            && image.get(center_j + i, center_i + i)
        {
            sc[2] += 1;
            i += 1;
        }
        while center_i + i < max_i
            && center_j + i < max_j
            && !image.get(center_j + i, center_i + i)
        {
            sc[3] += 1;
            i += 1;
        }
        if sc[3] == 0 {
            return false;
        }
        while center_i + i < max_i
            && center_j + i < max_j
            && image.get(center_j + i, center_i + i)
        {
            sc[4] += 1;
            i += 1;
        }
        if sc[4] == 0 {
            return false;
        }

        found_pattern_diagonal(&sc)
    }

    /// Once two corners are confirmed, estimate how many rows can be skipped
    /// before the third one. Assumes the symbol is roughly axis aligned,
    /// so the distance between the two is mostly horizontal.
    fn find_row_skip(&mut self) -> isize {
        if self.possible_centers.len() <= 1 {
            return 0;
        }
        let mut confirmed = self
            .possible_centers
            .iter()
            .filter(|c| c.count >= CENTER_QUORUM);
        let (Some(first), Some(second)) = (confirmed.next(), confirmed.next()) else {
            return 0;
        };
        self.has_skipped = true;
        let dx = (first.center.x - second.center.x).abs();
        let dy = (first.center.y - second.center.y).abs();
        (dx - dy) as isize / 2
    }

    /// True once at least three confirmed candidates exist whose module
    /// sizes agree within 5% in total.
    fn have_multiply_confirmed_centers(&self) -> bool {
        let confirmed: Vec<&FinderPattern> = self
            .possible_centers
            .iter()
            .filter(|c| c.count >= CENTER_QUORUM)
            .collect();
        if confirmed.len() < 3 {
            return false;
        }
        let total_module_size: f64 = confirmed.iter().map(|c| c.module_size).sum();
        let average = total_module_size / self.possible_centers.len() as f64;
        let total_deviation: f64 = self
            .possible_centers
            .iter()
            .map(|c| (c.module_size - average).abs())
            .sum();
        total_deviation <= 0.05 * total_module_size
    }
}

/// Center of the black core, given the column just past the pattern
fn center_from_end(state_count: &[u32; 5], end: usize) -> f64 {
    (end as u32 - state_count[4] - state_count[3]) as f64 - state_count[2] as f64 / 2.0
}

/// Whether five run lengths look like a 1:1:3:1:1 finder pattern.
///
/// Each outer run must be within half a module of the inferred module size,
/// the core within one and a half modules of three.
pub fn found_pattern_cross(state_count: &[u32; 5]) -> bool {
    ratio_within(state_count, 2.0)
}

/// Diagonal variant of [`found_pattern_cross`]. Diagonal sampling misses
/// pixels at run boundaries, so the tolerance is wider.
fn found_pattern_diagonal(state_count: &[u32; 5]) -> bool {
    ratio_within(state_count, 1.333)
}

fn ratio_within(state_count: &[u32; 5], variance_divisor: f64) -> bool {
    let total: u32 = state_count.iter().sum();
    if total < 7 {
        return false;
    }
    let module_size = total as f64 / 7.0;
    let max_variance = module_size / variance_divisor;
    let [a, b, c, d, e] = state_count.map(|v| v as f64);
    (module_size - a).abs() < max_variance
        && (module_size - b).abs() < max_variance
        && (3.0 * module_size - c).abs() < 3.0 * max_variance
        && (module_size - d).abs() < max_variance
        && (module_size - e).abs() < max_variance
}

fn shift_counts2(state_count: &mut [u32; 5]) {
    state_count[0] = state_count[2];
    state_count[1] = state_count[3];
    state_count[2] = state_count[4];
    state_count[3] = 1;
    state_count[4] = 0;
}

/// Pick the three candidates that best form an isosceles right triangle.
///
/// Only triples whose module sizes are within 40% of each other are
/// considered. For sorted squared side lengths `a <= b <= c`, the score
/// `|c - 2b| + |c - 2a|` is zero for a perfect corner layout.
pub fn select_best_patterns(candidates: &mut [FinderPattern]) -> Result<[FinderPattern; 3]> {
    let n = candidates.len();
    if n < 3 {
        // Couldn't find enough finder patterns
        return Err(NotFoundReason::TooFewCandidates(n).into());
    }
    candidates.sort_by(|a, b| a.module_size.total_cmp(&b.module_size));

    let mut distortion = f64::MAX;
    let mut best = None;
    for i in 0..n - 2 {
        let fpi = candidates[i];
        let min_module_size = fpi.module_size;
        for j in i + 1..n - 1 {
            let fpj = candidates[j];
            let squares0 = fpi.center.distance_squared(&fpj.center);
            for &fpk in &candidates[j + 1..] {
                if fpk.module_size > min_module_size * 1.4 {
                    // Sorted by size: every later k is larger still
                    break;
                }
                let mut sides = [
                    squares0,
                    fpj.center.distance_squared(&fpk.center),
                    fpi.center.distance_squared(&fpk.center),
                ];
                sides.sort_by(f64::total_cmp);
                let [a, b, c] = sides;
                // a^2 + b^2 = c^2 (Pythagoras) and a = b (isosceles)
                let d = (c - 2.0 * b).abs() + (c - 2.0 * a).abs();
                if d < distortion {
                    distortion = d;
                    best = Some([fpi, fpj, fpk]);
                }
            }
        }
    }

    let best = best.ok_or(NotFoundReason::NoPlausibleTriple)?;
    debug!(
        "best finder triple {:?} (distortion {:.2})",
        best.map(|p| (p.center.x, p.center.y)),
        distortion
    );
    Ok(best)
}
