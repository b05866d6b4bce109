//! Core data structures shared by the detectors

/// Packed binary image
pub mod matrix;
/// Points and corner ordering
pub mod point;
/// Detection output
pub mod result;
/// Symbol version lookup
pub mod version;

pub use matrix::BitMatrix;
pub use point::Point;
pub use result::DetectorResult;
pub use version::{Model2Versions, UnsupportedDimension, Version, VersionDescriptor, VersionLookup};
