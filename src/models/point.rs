/// 2D point with floating point coordinates in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Z component of the cross product of `a - b` and `c - b`.
    pub fn cross_product_z(a: &Point, b: &Point, c: &Point) -> f64 {
        (c.x - b.x) * (a.y - b.y) - (c.y - b.y) * (a.x - b.x)
    }

    /// Order three corner points as `[bottom_left, top_left, top_right]`.
    ///
    /// The two points furthest apart are the diagonal corners; the remaining
    /// one is top-left. The sign of the cross product decides which diagonal
    /// corner is bottom-left.
    pub fn order_best_patterns(points: [Point; 3]) -> [Point; 3] {
        let [bl, tl, tr] = order_indices(&points);
        [points[bl], points[tl], points[tr]]
    }
}

/// Index form of [`Point::order_best_patterns`], usable for any type that
/// carries a position.
pub(crate) fn order_indices(points: &[Point; 3]) -> [usize; 3] {
    let zero_one = points[0].distance(&points[1]);
    let one_two = points[1].distance(&points[2]);
    let zero_two = points[0].distance(&points[2]);

    let (mut a, b, mut c) = if one_two >= zero_one && one_two >= zero_two {
        (1, 0, 2)
    } else if zero_two >= one_two && zero_two >= zero_one {
        (0, 1, 2)
    } else {
        (0, 2, 1)
    };

    if Point::cross_product_z(&points[a], &points[b], &points[c]) < 0.0 {
        std::mem::swap(&mut a, &mut c);
    }

    [a, b, c]
}
