//! qr_locate - locate and rectify QR code symbols in binary images
//!
//! Given a binarized image, the detector finds the three finder patterns,
//! estimates the module size and symbol dimension, refines the fourth
//! corner with an alignment pattern when the version has one, and samples
//! the module grid through a perspective transform. Decoding the sampled
//! grid is left to the caller.
//!
//! ```no_run
//! use qr_locate::{BitMatrix, DecodeHints, detect};
//!
//! let image = BitMatrix::new(640, 480);
//! match detect(&image, &DecodeHints::from_env()) {
//!     Ok(result) => println!("{}x{} modules", result.dimension(), result.dimension()),
//!     Err(err) if err.is_not_found() => println!("no symbol"),
//!     Err(err) => println!("{err}"),
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Detection hints
pub mod config;
/// Symbol detection (finder patterns, alignment, sampling)
pub mod detector;
/// Error types
pub mod error;
/// Core data structures (BitMatrix, Point, versions, results)
pub mod models;
/// Synthetic symbol rendering for tests and benchmarks
pub mod tools;
/// Utility functions (perspective transforms, run-length patterns)
pub mod utils;

pub use config::DecodeHints;
pub use detector::{Detector, MultiDetector, ResultPointSink};
pub use error::{DetectError, ErrorKind, NotFoundReason, Result, SamplingError};
pub use models::{BitMatrix, DetectorResult, Point, Version};

use rayon::prelude::*;

/// Locate one symbol in `image`
pub fn detect(image: &BitMatrix, hints: &DecodeHints) -> Result<DetectorResult> {
    Detector::new(image).detect(hints)
}

/// Locate every symbol in `image`.
///
/// Returns an empty vector when nothing is found.
pub fn detect_multi(image: &BitMatrix, hints: &DecodeHints) -> Vec<DetectorResult> {
    match MultiDetector::new(image).detect_multi(hints) {
        Ok(results) => results,
        Err(err) => {
            log::debug!("multi detection found nothing: {}", err);
            Vec::new()
        }
    }
}

/// Locate one symbol in each of `images`, processing images in parallel.
///
/// Results are in input order.
pub fn detect_many(images: &[BitMatrix], hints: &DecodeHints) -> Vec<Result<DetectorResult>> {
    images
        .par_iter()
        .map(|image| Detector::new(image).detect(hints))
        .collect()
}
