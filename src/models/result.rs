use super::{BitMatrix, Point};

/// A located and rectified symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorResult {
    /// Sampled module grid, one bit per module
    pub bits: BitMatrix,
    /// `[bottom_left, top_left, top_right]`, followed by the alignment
    /// pattern center when one was found
    pub points: Vec<Point>,
}

impl DetectorResult {
    /// Create a new result
    pub fn new(bits: BitMatrix, points: Vec<Point>) -> Self {
        Self { bits, points }
    }

    /// Side length of the module grid
    pub fn dimension(&self) -> usize {
        self.bits.width()
    }

    /// Alignment pattern center, if the detector used one
    pub fn alignment_point(&self) -> Option<Point> {
        self.points.get(3).copied()
    }
}
