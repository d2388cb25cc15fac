//! Vision Layer
//!
//! Letter segmentation of single words:
//! - geometry: word polygon to pixel region of interest
//! - scanner: classifier-guided search for letter boundaries
//! - tracker: candidate bookkeeping and fallback selection
//! - assembler: page-pixel letter boxes and word status
//!
//! The single-character classifier is pluggable; `tesseract` provides a
//! backend built on the tesseract CLI.

pub mod assembler;
pub mod classifier;
pub mod geometry;
pub mod scanner;
pub mod tesseract;
pub mod tracker;

use serde::{Deserialize, Serialize};

pub use assembler::{
    assemble, assemble_failed, LetterBounds, LetterBox, SegmentationResult, SegmentationStatus,
};
pub use classifier::{CharClassifier, Classification};
pub use geometry::{rectify, PixelPolygon, PixelRect, Roi};
pub use scanner::{CancelToken, LetterSegment, Scanner};
pub use tesseract::{TesseractClassifier, TesseractConfig};
pub use tracker::{Candidate, ConfidenceTracker, ScanWindow};

/// Default window growth step in pixels
pub const DEFAULT_INCREMENT: u32 = 20;

/// Configuration for the letter scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Pixels added to the candidate window on each step
    pub increment: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            increment: DEFAULT_INCREMENT,
        }
    }
}
