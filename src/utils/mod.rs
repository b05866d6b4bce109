//! Utility functions for detection
//!
//! - Geometry (perspective transforms between quadrilaterals)
//! - Run-length pattern recording and matching

/// Perspective transforms between quadrilaterals
pub mod geometry;
/// Run-length recording and pattern variance scoring
pub mod pattern;
