/// Perspective transforms between quadrilaterals
use crate::models::Point;

/// Projective transform stored as a 3x3 matrix.
///
/// Points map as
/// `x' = (a11 x + a21 y + a31) / (a13 x + a23 y + a33)` and
/// `y' = (a12 x + a22 y + a32) / (a13 x + a23 y + a33)`.
/// The matrix is homogeneous, so any non-zero multiple describes the same
/// mapping; composed and inverted transforms are not renormalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
    a33: f64,
}

impl PerspectiveTransform {
    /// Build a transform from coefficients given column by column
    /// (`a11, a21, a31, a12, a22, a32, a13, a23, a33`).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        a11: f64,
        a21: f64,
        a31: f64,
        a12: f64,
        a22: f64,
        a32: f64,
        a13: f64,
        a23: f64,
        a33: f64,
    ) -> Self {
        Self {
            a11,
            a12,
            a13,
            a21,
            a22,
            a23,
            a31,
            a32,
            a33,
        }
    }

    /// Coefficients in row-major order
    /// (`a11, a12, a13, a21, a22, a23, a31, a32, a33`).
    pub fn coefficients(&self) -> [f64; 9] {
        [
            self.a11, self.a12, self.a13, self.a21, self.a22, self.a23, self.a31, self.a32,
            self.a33,
        ]
    }

    /// Map the quadrilateral `src` onto the quadrilateral `dst`.
    ///
    /// Corners are given in order around the quadrilateral. Returns `None`
    /// when either quadrilateral is degenerate.
    pub fn quadrilateral_to_quadrilateral(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        let q_to_s = Self::quadrilateral_to_square(src)?;
        let s_to_q = Self::square_to_quadrilateral(dst)?;
        let composed = s_to_q.times(&q_to_s);
        composed.is_finite().then_some(composed)
    }

    /// Map the unit square corners `(0,0), (1,0), (1,1), (0,1)` onto `quad`.
    pub fn square_to_quadrilateral(quad: &[Point; 4]) -> Option<Self> {
        let [p0, p1, p2, p3] = *quad;
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;

        let transform = if dx3 == 0.0 && dy3 == 0.0 {
            // Parallelogram: the mapping is affine
            Self::new(
                p1.x - p0.x,
                p2.x - p1.x,
                p0.x,
                p1.y - p0.y,
                p2.y - p1.y,
                p0.y,
                0.0,
                0.0,
                1.0,
            )
        } else {
            let dx1 = p1.x - p2.x;
            let dx2 = p3.x - p2.x;
            let dy1 = p1.y - p2.y;
            let dy2 = p3.y - p2.y;
            let denominator = dx1 * dy2 - dx2 * dy1;
            if denominator == 0.0 {
                return None;
            }
            let a13 = (dx3 * dy2 - dx2 * dy3) / denominator;
            let a23 = (dx1 * dy3 - dx3 * dy1) / denominator;
            Self::new(
                p1.x - p0.x + a13 * p1.x,
                p3.x - p0.x + a23 * p3.x,
                p0.x,
                p1.y - p0.y + a13 * p1.y,
                p3.y - p0.y + a23 * p3.y,
                p0.y,
                a13,
                a23,
                1.0,
            )
        };
        transform.is_finite().then_some(transform)
    }

    /// Map `quad` onto the unit square; the inverse of
    /// [`square_to_quadrilateral`](Self::square_to_quadrilateral).
    pub fn quadrilateral_to_square(quad: &[Point; 4]) -> Option<Self> {
        // The adjoint is proportional to the inverse, which is all a
        // homogeneous transform needs.
        Self::square_to_quadrilateral(quad).map(|t| t.build_adjoint())
    }

    /// Transpose of the cofactor matrix
    pub fn build_adjoint(&self) -> Self {
        Self::new(
            self.a22 * self.a33 - self.a23 * self.a32,
            self.a23 * self.a31 - self.a21 * self.a33,
            self.a21 * self.a32 - self.a22 * self.a31,
            self.a13 * self.a32 - self.a12 * self.a33,
            self.a11 * self.a33 - self.a13 * self.a31,
            self.a12 * self.a31 - self.a11 * self.a32,
            self.a12 * self.a23 - self.a13 * self.a22,
            self.a13 * self.a21 - self.a11 * self.a23,
            self.a11 * self.a22 - self.a12 * self.a21,
        )
    }

    /// Compose: the result applies `other` first, then `self`.
    pub fn times(&self, other: &Self) -> Self {
        Self::new(
            self.a11 * other.a11 + self.a21 * other.a12 + self.a31 * other.a13,
            self.a11 * other.a21 + self.a21 * other.a22 + self.a31 * other.a23,
            self.a11 * other.a31 + self.a21 * other.a32 + self.a31 * other.a33,
            self.a12 * other.a11 + self.a22 * other.a12 + self.a32 * other.a13,
            self.a12 * other.a21 + self.a22 * other.a22 + self.a32 * other.a23,
            self.a12 * other.a31 + self.a22 * other.a32 + self.a32 * other.a33,
            self.a13 * other.a11 + self.a23 * other.a12 + self.a33 * other.a13,
            self.a13 * other.a21 + self.a23 * other.a22 + self.a33 * other.a23,
            self.a13 * other.a31 + self.a23 * other.a32 + self.a33 * other.a33,
        )
    }

    /// Transform interleaved `x, y` pairs in place. A trailing odd value is
    /// left untouched.
    pub fn transform_points(&self, points: &mut [f64]) {
        for pair in points.chunks_exact_mut(2) {
            let (x, y) = self.apply(pair[0], pair[1]);
            pair[0] = x;
            pair[1] = y;
        }
    }

    /// Transform separate coordinate slices in place
    pub fn transform_points_xy(&self, xs: &mut [f64], ys: &mut [f64]) {
        for (x, y) in xs.iter_mut().zip(ys.iter_mut()) {
            (*x, *y) = self.apply(*x, *y);
        }
    }

    /// Transform a single point
    pub fn transform_point(&self, p: &Point) -> Point {
        let (x, y) = self.apply(p.x, p.y);
        Point::new(x, y)
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let denominator = self.a13 * x + self.a23 * y + self.a33;
        (
            (self.a11 * x + self.a21 * y + self.a31) / denominator,
            (self.a12 * x + self.a22 * y + self.a32) / denominator,
        )
    }

    fn is_finite(&self) -> bool {
        self.coefficients().iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPSILON: f64 = 1e-4;

    fn quad(c: [f64; 8]) -> [Point; 4] {
        [
            Point::new(c[0], c[1]),
            Point::new(c[2], c[3]),
            Point::new(c[4], c[5]),
            Point::new(c[6], c[7]),
        ]
    }

    fn assert_maps(t: &PerspectiveTransform, from: (f64, f64), to: (f64, f64)) {
        let p = t.transform_point(&Point::new(from.0, from.1));
        assert_abs_diff_eq!(p.x, to.0, epsilon = EPSILON);
        assert_abs_diff_eq!(p.y, to.1, epsilon = EPSILON);
    }

    #[test]
    fn test_square_to_quadrilateral() {
        let t = PerspectiveTransform::square_to_quadrilateral(&quad([
            2.0, 3.0, 10.0, 4.0, 16.0, 15.0, 4.0, 9.0,
        ]))
        .unwrap();
        assert_maps(&t, (0.0, 0.0), (2.0, 3.0));
        assert_maps(&t, (1.0, 0.0), (10.0, 4.0));
        assert_maps(&t, (1.0, 1.0), (16.0, 15.0));
        assert_maps(&t, (0.0, 1.0), (4.0, 9.0));
        assert_maps(&t, (0.5, 0.5), (6.535211, 6.887324));
        assert_maps(&t, (1.5, 1.5), (48.0, 42.428571));
    }

    #[test]
    fn test_parallelogram_is_affine() {
        let t = PerspectiveTransform::square_to_quadrilateral(&quad([
            1.0, 1.0, 5.0, 2.0, 6.0, 6.0, 2.0, 5.0,
        ]))
        .unwrap();
        let c = t.coefficients();
        assert_eq!((c[2], c[5], c[8]), (0.0, 0.0, 1.0));
        assert_maps(&t, (0.5, 0.5), (3.5, 3.5));
    }

    #[test]
    fn test_quadrilateral_to_quadrilateral() {
        let src = quad([2.0, 3.0, 10.0, 4.0, 16.0, 15.0, 4.0, 9.0]);
        let dst = quad([103.0, 110.0, 300.0, 120.0, 290.0, 270.0, 150.0, 280.0]);
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_maps(&t, (s.x, s.y), (d.x, d.y));
        }
    }

    #[test]
    fn test_composed_coefficients() {
        let src = quad([3.0, 2.0, 7.0, 5.0, 2.0, 5.0, 3.0, 7.0]);
        let dst = quad([2.0, 3.0, 5.0, 7.0, 3.0, 2.0, 7.0, 5.0]);
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_maps(&t, (s.x, s.y), (d.x, d.y));
        }
        let expected = PerspectiveTransform::new(-10.5, -1.0, 3.5, -18.0, 4.0, 1.0, -1.5, 2.0, -14.5);
        for (got, want) in t.coefficients().iter().zip(expected.coefficients().iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_round_trip_is_identity_on_corners() {
        let q = quad([12.0, 8.0, 87.5, 14.0, 95.0, 90.0, 5.0, 80.0]);
        let to_square = PerspectiveTransform::quadrilateral_to_square(&q).unwrap();
        let to_quad = PerspectiveTransform::square_to_quadrilateral(&q).unwrap();
        let round_trip = to_quad.times(&to_square);
        for corner in q {
            assert_maps(&round_trip, (corner.x, corner.y), (corner.x, corner.y));
        }
        let unit = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for (corner, square) in q.iter().zip(unit) {
            assert_maps(&to_square, (corner.x, corner.y), square);
        }
    }

    #[test]
    fn test_degenerate_quadrilateral() {
        // Last three corners are collinear
        let q = quad([0.0, 0.0, 0.0, 4.0, 2.0, 2.0, 4.0, 0.0]);
        assert!(PerspectiveTransform::square_to_quadrilateral(&q).is_none());
        assert!(PerspectiveTransform::quadrilateral_to_square(&q).is_none());
    }

    #[test]
    fn test_transform_points_variants_agree() {
        let t = PerspectiveTransform::square_to_quadrilateral(&quad([
            2.0, 3.0, 10.0, 4.0, 16.0, 15.0, 4.0, 9.0,
        ]))
        .unwrap();
        let mut interleaved = [0.25, 0.75, 0.5, 0.5, 9.0];
        let mut xs = [0.25, 0.5];
        let mut ys = [0.75, 0.5];
        t.transform_points(&mut interleaved);
        t.transform_points_xy(&mut xs, &mut ys);
        assert_eq!([interleaved[0], interleaved[2]], xs);
        assert_eq!([interleaved[1], interleaved[3]], ys);
        assert_eq!(interleaved[4], 9.0);
    }
}
