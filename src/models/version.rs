//! Symbol version lookup.
//!
//! The detector only needs two facts about a version: its side length in
//! modules and where its alignment patterns sit. Decoders own the full
//! version tables, so the detector talks to them through [`VersionLookup`].

/// The subset of a symbol version the detector consumes.
pub trait VersionDescriptor {
    /// Side length of the symbol in modules
    fn dimension_for_version(&self) -> i32;

    /// Row/column coordinates of the alignment pattern centers; empty for
    /// versions without alignment patterns.
    fn alignment_pattern_centers(&self) -> &[i32];
}

/// The dimension has no matching version.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no symbol version has dimension {0}")]
pub struct UnsupportedDimension(pub i32);

/// Maps a measured dimension to a version.
pub trait VersionLookup {
    /// Version type returned by the lookup
    type Version: VersionDescriptor;

    /// Find the version whose dimension is exactly `dimension`.
    fn version_for_dimension(&self, dimension: i32)
    -> Result<Self::Version, UnsupportedDimension>;
}

/// A Model 2 QR code version (1-40)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    number: u8,
    alignment_centers: Vec<i32>,
}

impl Version {
    /// Get the version for a number in 1..=40
    pub fn for_number(number: u8) -> Option<Self> {
        if !(1..=40).contains(&number) {
            return None;
        }
        Some(Self {
            number,
            alignment_centers: alignment_pattern_positions(number),
        })
    }

    /// Version number
    pub fn number(&self) -> u8 {
        self.number
    }
}

impl VersionDescriptor for Version {
    fn dimension_for_version(&self) -> i32 {
        17 + 4 * self.number as i32
    }

    fn alignment_pattern_centers(&self) -> &[i32] {
        &self.alignment_centers
    }
}

/// Lookup over the 40 Model 2 versions
#[derive(Debug, Clone, Copy, Default)]
pub struct Model2Versions;

impl VersionLookup for Model2Versions {
    type Version = Version;

    fn version_for_dimension(&self, dimension: i32) -> Result<Version, UnsupportedDimension> {
        if dimension % 4 != 1 {
            return Err(UnsupportedDimension(dimension));
        }
        u8::try_from((dimension - 17) / 4)
            .ok()
            .and_then(Version::for_number)
            .ok_or(UnsupportedDimension(dimension))
    }
}

/// Alignment pattern centers for a given version.
fn alignment_pattern_positions(version: u8) -> Vec<i32> {
    if version == 1 {
        return Vec::new();
    }
    let version = version as i32;
    let num_align = version / 7 + 2;
    let size = 17 + 4 * version;
    let step = if version == 32 {
        26
    } else {
        (version * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };

    let mut positions = vec![0; num_align as usize];
    positions[0] = 6;
    let mut pos = size - 7;
    for slot in positions.iter_mut().skip(1).rev() {
        *slot = pos;
        pos -= step;
    }
    positions
}
