/// Receivers for candidate points found while scanning
use crate::models::Point;

/// Receives the center of every newly created finder or alignment
/// candidate. Merges into an existing candidate are not reported.
pub trait ResultPointSink {
    /// Called once per new candidate
    fn report(&mut self, point: Point);
}

/// Discards every point
impl ResultPointSink for () {
    fn report(&mut self, _point: Point) {}
}

/// Collects points in discovery order
impl ResultPointSink for Vec<Point> {
    fn report(&mut self, point: Point) {
        self.push(point);
    }
}

impl<S: ResultPointSink + ?Sized> ResultPointSink for &mut S {
    fn report(&mut self, point: Point) {
        (**self).report(point);
    }
}
