/// Detection of every symbol in an image
use log::debug;

use crate::config::DecodeHints;
use crate::detector::multi_finder::find_multi;
use crate::detector::qr_detector::Detector;
use crate::detector::sink::ResultPointSink;
use crate::error::Result;
use crate::models::{BitMatrix, DetectorResult, Model2Versions, VersionLookup};

/// Finds all symbols whose finder patterns form a plausible triple
pub struct MultiDetector<'a, V: VersionLookup = Model2Versions> {
    detector: Detector<'a, V>,
}

impl<'a> MultiDetector<'a> {
    /// Create a detector using the Model 2 version table
    pub fn new(image: &'a BitMatrix) -> Self {
        Self {
            detector: Detector::new(image),
        }
    }
}

impl<'a, V: VersionLookup> MultiDetector<'a, V> {
    /// Create a detector with a caller supplied version lookup
    pub fn with_versions(image: &'a BitMatrix, versions: V) -> Self {
        Self {
            detector: Detector::with_versions(image, versions),
        }
    }

    /// Rectify every plausible triple.
    ///
    /// Fails only when no triple exists at all. Triples that do not rectify
    /// are skipped, so the result may be empty.
    pub fn detect_multi(&self, hints: &DecodeHints) -> Result<Vec<DetectorResult>> {
        self.detect_multi_with_sink(hints, &mut ())
    }

    /// Like [`detect_multi`](Self::detect_multi), reporting candidates to
    /// `sink`.
    pub fn detect_multi_with_sink<S: ResultPointSink + ?Sized>(
        &self,
        hints: &DecodeHints,
        sink: &mut S,
    ) -> Result<Vec<DetectorResult>> {
        let infos = find_multi(self.detector.image(), hints, &mut *sink)?;
        let mut results = Vec::with_capacity(infos.len());
        for info in &infos {
            match self.detector.process_finder_pattern_info(info, sink) {
                Ok(result) => results.push(result),
                Err(err) => debug!(
                    "skipping triple at ({:.1}, {:.1}): {}",
                    info.top_left.center.x, info.top_left.center.y, err
                ),
            }
        }
        Ok(results)
    }
}
