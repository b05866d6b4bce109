use std::fmt;

/// Compact bit matrix for storing binary images and sampled module grids.
///
/// `true` means black. Reads outside the matrix return `false` and writes
/// outside the matrix are ignored, so scanners never index out of bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create a new bit matrix with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Create a square matrix
    pub fn square(dimension: usize) -> Self {
        Self::new(dimension, dimension)
    }

    /// Parse an ASCII-art picture, one row per line.
    ///
    /// Every cell is written with exactly `set` or `unset` (for example `"X "`
    /// and `"  "`). Blank lines are skipped. Returns `None` when a row has an
    /// unexpected token or the rows differ in length.
    pub fn parse(text: &str, set: &str, unset: &str) -> Option<Self> {
        if set.is_empty() || set.len() != unset.len() {
            return None;
        }
        let cell = set.len();
        let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let width = rows.first().map(|r| r.len() / cell)?;

        let mut matrix = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width * cell {
                return None;
            }
            for x in 0..width {
                let token = row.get(x * cell..(x + 1) * cell)?;
                if token == set {
                    matrix.set(x, y, true);
                } else if token != unset {
                    return None;
                }
            }
        }
        Some(matrix)
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let bit = 1 << (index % 8);
        if value {
            self.data[index / 8] |= bit;
        } else {
            self.data[index / 8] &= !bit;
        }
    }

    /// Clear bit at (x, y)
    pub fn unset(&mut self, x: usize, y: usize) {
        self.set(x, y, false);
    }

    /// Flip bit at (x, y)
    pub fn flip(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        self.data[index / 8] ^= 1 << (index % 8);
    }

    /// Set every bit of the `width` x `height` rectangle at (left, top).
    /// The rectangle is clipped to the matrix.
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        let right = left.saturating_add(width).min(self.width);
        let bottom = top.saturating_add(height).min(self.height);
        for y in top..bottom {
            for x in left..right {
                self.set(x, y, true);
            }
        }
    }

    /// Clear all bits to 0
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        (0..self.height)
            .map(|y| (0..self.width).filter(|&x| self.get(x, y)).count())
            .sum()
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Renders with `"X "` for set and `"  "` for unset bits, the format
/// [`BitMatrix::parse`] reads back.
impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.get(x, y) { "X " } else { "  " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
