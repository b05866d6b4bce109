//! Error types for symbol detection.
//!
//! Two kinds of failure exist. "Not found" is the common, recoverable case:
//! there is no plausible symbol here. "Format" means the geometry that was
//! found cannot belong to any known symbol version.

use crate::models::UnsupportedDimension;

/// Why nothing was found
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Fewer than three finder pattern candidates were observed
    #[error("only {0} finder pattern candidates")]
    TooFewCandidates(usize),
    /// No three candidates form a plausible symbol corner triple
    #[error("no plausible finder pattern triple")]
    NoPlausibleTriple,
    /// No black-white-black run could be measured between the corners
    #[error("module size could not be measured")]
    ModuleSizeUnmeasurable,
    /// The estimated module size is below one pixel
    #[error("module size below one pixel")]
    ModuleSizeTooSmall,
    /// The estimated dimension is 3 mod 4
    #[error("dimension {0} cannot be snapped to a symbol size")]
    InvalidDimension(i32),
    /// The alignment search window is smaller than the pattern
    #[error("alignment search region too small")]
    RegionTooSmall,
    /// No alignment pattern candidate was observed
    #[error("no alignment pattern")]
    NoAlignmentPattern,
    /// The corner points do not define an invertible transform
    #[error("degenerate perspective transform")]
    DegenerateTransform,
    /// A run started at the end of a row
    #[error("row ended before the pattern")]
    RowExhausted,
}

/// Grid sampling left the image
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingError {
    /// A requested grid dimension is zero
    #[error("grid dimension must be positive")]
    EmptyGrid,
    /// A transformed point lies outside the image
    #[error("point ({x}, {y}) outside the {width}x{height} image")]
    OutOfBounds {
        /// Truncated x coordinate
        x: i64,
        /// Truncated y coordinate
        y: i64,
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },
    /// The transform produced a non-finite coordinate
    #[error("transform produced a non-finite point")]
    NonFinite,
}

/// Coarse classification of a [`DetectError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing plausible was found; callers may retry with other hints
    NotFound,
    /// The located geometry matches no symbol version
    Format,
}

/// Errors returned by the detectors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// No symbol was found
    #[error("symbol not found: {0}")]
    NotFound(NotFoundReason),
    /// Grid sampling failed; reported as not found
    #[error("symbol not found: grid sampling failed")]
    Sampling(#[from] SamplingError),
    /// The measured dimension matches no version
    #[error("dimension {dimension} matches no symbol version")]
    Format {
        /// Snapped dimension in modules
        dimension: i32,
        /// Lookup failure
        #[source]
        source: UnsupportedDimension,
    },
}

impl DetectError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectError::NotFound(_) | DetectError::Sampling(_) => ErrorKind::NotFound,
            DetectError::Format { .. } => ErrorKind::Format,
        }
    }

    /// True for every "nothing here" outcome
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<NotFoundReason> for DetectError {
    fn from(reason: NotFoundReason) -> Self {
        DetectError::NotFound(reason)
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DetectError>;
