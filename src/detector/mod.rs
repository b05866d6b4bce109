//! Symbol detection modules
//!
//! This module contains the logic for locating a symbol in a binary image:
//! - Finder pattern detection (the three square corner markers)
//! - Alignment pattern detection (for larger symbols)
//! - Grid sampling through a perspective transform
//! - Single and multi symbol detectors tying the stages together

/// Alignment pattern detection for versions 2+
pub mod alignment;
/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Multi-symbol detection
pub mod multi_detector;
/// Finder pattern triple selection for multiple symbols
pub mod multi_finder;
/// Single-symbol detection
pub mod qr_detector;
/// Module grid sampling
pub mod sampler;
/// Candidate point reporting
pub mod sink;

pub use alignment::{AlignmentPattern, AlignmentPatternFinder};
pub use finder::{FinderPattern, FinderPatternInfo, FinderScan, ScanMode};
pub use multi_detector::MultiDetector;
pub use qr_detector::Detector;
pub use sink::ResultPointSink;
