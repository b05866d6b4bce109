/// Run-length recording and pattern variance scoring
///
/// These are the primitives linear (1D) readers are built on: record the
/// widths of consecutive black/white runs along a row, then score them
/// against an expected bar pattern.
use crate::error::{NotFoundReason, Result};
use crate::models::BitMatrix;

/// Score observed run widths against an expected pattern.
///
/// `pattern` holds the expected width of each run in modules. The unit
/// width is inferred from the total; any run deviating by more than
/// `max_individual_variance` units scores `f64::INFINITY`. Otherwise the
/// result is the summed deviation relative to the total width, so `0.0` is
/// a perfect match.
pub fn pattern_match_variance(counters: &[u32], pattern: &[u32], max_individual_variance: f64) -> f64 {
    let total: u32 = counters.iter().sum();
    let pattern_length: u32 = pattern.iter().sum();
    if total == 0 || total < pattern_length {
        // Fewer pixels than modules cannot give a reliable reading
        return f64::INFINITY;
    }

    let total = total as f64;
    let unit_bar_width = total / pattern_length as f64;
    let max_individual_variance = max_individual_variance * unit_bar_width;

    let mut total_variance = 0.0;
    for (&counter, &expected) in counters.iter().zip(pattern) {
        let variance = (counter as f64 - expected as f64 * unit_bar_width).abs();
        if variance > max_individual_variance {
            return f64::INFINITY;
        }
        total_variance += variance;
    }
    total_variance / total
}

/// Record the widths of `counters.len()` consecutive runs on row `y`,
/// starting at column `start`.
///
/// The last run may be cut off by the right edge of the image; any other
/// shortfall is an error.
pub fn record_pattern(image: &BitMatrix, y: usize, start: usize, counters: &mut [u32]) -> Result<()> {
    counters.fill(0);
    let end = image.width();
    if start >= end || counters.is_empty() {
        return Err(NotFoundReason::RowExhausted.into());
    }

    let mut is_white = !image.get(start, y);
    let mut position = 0;
    let mut i = start;
    while i < end {
        if image.get(i, y) != is_white {
            counters[position] += 1;
        } else {
            position += 1;
            if position == counters.len() {
                break;
            }
            counters[position] = 1;
            is_white = !is_white;
        }
        i += 1;
    }

    if position == counters.len() || (position == counters.len() - 1 && i == end) {
        Ok(())
    } else {
        Err(NotFoundReason::RowExhausted.into())
    }
}

/// Like [`record_pattern`], but first walks left from `start` past
/// `counters.len()` transitions so the recorded runs end at `start`.
pub fn record_pattern_in_reverse(
    image: &BitMatrix,
    y: usize,
    start: usize,
    counters: &mut [u32],
) -> Result<()> {
    let mut transitions_left = counters.len() as isize;
    let mut start = start;
    let mut last = image.get(start, y);
    while start > 0 && transitions_left >= 0 {
        start -= 1;
        if image.get(start, y) != last {
            transitions_left -= 1;
            last = !last;
        }
    }
    if transitions_left >= 0 {
        return Err(NotFoundReason::RowExhausted.into());
    }
    record_pattern(image, y, start + 1, counters)
}
