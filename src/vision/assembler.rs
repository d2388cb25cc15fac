//! Result assembly
//!
//! Turns ROI-relative letter slices into an immutable per-word result with
//! page-pixel letter boxes.

use serde::Serialize;

use super::geometry::{PixelRect, Roi};
use super::scanner::LetterSegment;
use crate::document::WordAnnotation;
use crate::error::GeometryError;

/// Outcome of segmenting one word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStatus {
    /// Every letter boundary came from an exact classifier read
    Complete,
    /// At least one boundary is a best-confidence fallback
    PartialFallback,
    /// No ROI could be built for the word
    Failed,
}

/// Page-pixel box, end coordinates exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LetterBounds {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl LetterBounds {
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    pub fn height(&self) -> u32 {
        self.y_end - self.y_start
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// One letter located on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterBox {
    pub character: char,
    pub bbox: LetterBounds,
    pub confidence: f32,
    pub matched: bool,
}

/// Segmentation of one word; read-only once assembled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationResult {
    word_index: usize,
    word: WordAnnotation,
    status: SegmentationStatus,
    roi: Option<PixelRect>,
    segments: Vec<LetterSegment>,
    letters: Vec<LetterBox>,
    failure: Option<String>,
}

impl SegmentationResult {
    /// Position of the word in the input document
    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn word(&self) -> &WordAnnotation {
        &self.word
    }

    pub fn status(&self) -> SegmentationStatus {
        self.status
    }

    /// Page rectangle of the word's ROI, absent when rectification failed
    pub fn roi(&self) -> Option<PixelRect> {
        self.roi
    }

    /// ROI-relative slices, left to right
    pub fn segments(&self) -> &[LetterSegment] {
        &self.segments
    }

    /// Page-pixel letter boxes, left to right
    pub fn letters(&self) -> &[LetterBox] {
        &self.letters
    }

    /// Why the word failed, for `Failed` results
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// Build the result for a word whose scan finished
pub fn assemble(
    word_index: usize,
    word: &WordAnnotation,
    roi: &Roi,
    segments: Vec<LetterSegment>,
) -> SegmentationResult {
    let (origin_x, origin_y) = roi.origin();
    let y_end = origin_y + roi.height();

    let letters = segments
        .iter()
        .map(|segment| LetterBox {
            character: segment.character,
            bbox: LetterBounds {
                x_start: origin_x + segment.start_x,
                y_start: origin_y,
                x_end: origin_x + segment.end_x,
                y_end,
            },
            confidence: segment.confidence,
            matched: segment.matched,
        })
        .collect();

    let status = if segments.iter().all(|s| s.matched) {
        SegmentationStatus::Complete
    } else {
        SegmentationStatus::PartialFallback
    };

    SegmentationResult {
        word_index,
        word: word.clone(),
        status,
        roi: Some(roi.bounds()),
        segments,
        letters,
        failure: None,
    }
}

/// Build the result for a word whose geometry was rejected
pub fn assemble_failed(
    word_index: usize,
    word: &WordAnnotation,
    error: &GeometryError,
) -> SegmentationResult {
    SegmentationResult {
        word_index,
        word: word.clone(),
        status: SegmentationStatus::Failed,
        roi: None,
        segments: Vec::new(),
        letters: Vec::new(),
        failure: Some(error.to_string()),
    }
}
