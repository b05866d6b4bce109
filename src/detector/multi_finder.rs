/// Finder pattern triples for images holding several symbols
use log::{debug, trace};

use crate::config::DecodeHints;
use crate::detector::finder::{CENTER_QUORUM, FinderPattern, FinderPatternInfo, FinderScan, ScanMode};
use crate::detector::sink::ResultPointSink;
use crate::error::{NotFoundReason, Result};
use crate::models::BitMatrix;

/// Largest plausible symbol side, in modules, between finder centers
const MAX_MODULE_COUNT_PER_EDGE: f64 = 180.0;
/// Smallest plausible symbol side, in modules, between finder centers
const MIN_MODULE_COUNT_PER_EDGE: f64 = 9.0;

/// Neighbouring module sizes this far apart (relative and absolute) end the
/// search for partners of a candidate
const DIFF_MODSIZE_CUTOFF_PERCENT: f64 = 0.05;
const DIFF_MODSIZE_CUTOFF: f64 = 0.5;

/// Scan the whole image and return every plausible finder pattern triple.
pub fn find_multi<S: ResultPointSink + ?Sized>(
    image: &BitMatrix,
    hints: &DecodeHints,
    sink: &mut S,
) -> Result<Vec<FinderPatternInfo>> {
    let candidates = FinderScan::new(image, sink).scan(hints, ScanMode::Multi);
    let triples = select_multiple_best_patterns(candidates)?;
    debug!("{} candidate symbol triples", triples.len());
    Ok(triples.into_iter().map(FinderPatternInfo::new).collect())
}

/// All triples of confirmed candidates that could be the corners of one
/// symbol: similar module sizes, two equal edges and a right angle, each
/// within 10%.
pub fn select_multiple_best_patterns(candidates: Vec<FinderPattern>) -> Result<Vec<[FinderPattern; 3]>> {
    let mut confirmed: Vec<FinderPattern> = candidates
        .into_iter()
        .filter(|c| c.count >= CENTER_QUORUM)
        .collect();
    let size = confirmed.len();
    if size < 3 {
        // Couldn't find enough finder patterns
        return Err(NotFoundReason::TooFewCandidates(size).into());
    }
    if size == 3 {
        return Ok(vec![[confirmed[0], confirmed[1], confirmed[2]]]);
    }

    // Sorting by module size lets the loops stop at the first mismatch
    confirmed.sort_by(|a, b| a.module_size.total_cmp(&b.module_size));

    let mut results = Vec::new();
    for i1 in 0..size - 2 {
        let p1 = confirmed[i1];
        for i2 in i1 + 1..size - 1 {
            let p2 = confirmed[i2];
            if module_sizes_differ(&p1, &p2) {
                break;
            }
            for &p3 in &confirmed[i2 + 1..] {
                if module_sizes_differ(&p2, &p3) {
                    break;
                }

                let info = FinderPatternInfo::new([p1, p2, p3]);
                let d_a = info.top_left.center.distance(&info.bottom_left.center);
                let d_c = info.top_right.center.distance(&info.bottom_left.center);
                let d_b = info.top_left.center.distance(&info.top_right.center);

                // Symbol size in modules
                let module_count = (d_a + d_b) / (p1.module_size * 2.0);
                if !(MIN_MODULE_COUNT_PER_EDGE..=MAX_MODULE_COUNT_PER_EDGE).contains(&module_count) {
                    continue;
                }
                // Both edges at the top-left corner about the same length
                if ((d_a - d_b) / d_a.min(d_b)).abs() >= 0.1 {
                    continue;
                }
                // ...and the diagonal matches Pythagoras
                let d_c_expected = (d_a * d_a + d_b * d_b).sqrt();
                if ((d_c - d_c_expected) / d_c.min(d_c_expected)).abs() >= 0.1 {
                    continue;
                }

                trace!(
                    "plausible triple at ({:.1}, {:.1}), {:.0} modules",
                    info.top_left.center.x, info.top_left.center.y, module_count
                );
                results.push([p1, p2, p3]);
            }
        }
    }

    if results.is_empty() {
        return Err(NotFoundReason::NoPlausibleTriple.into());
    }
    Ok(results)
}

fn module_sizes_differ(a: &FinderPattern, b: &FinderPattern) -> bool {
    let absolute = (a.module_size - b.module_size).abs();
    let relative = absolute / a.module_size.min(b.module_size);
    absolute > DIFF_MODSIZE_CUTOFF && relative >= DIFF_MODSIZE_CUTOFF_PERCENT
}
