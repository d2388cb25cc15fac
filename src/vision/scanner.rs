//! Letter boundary scanner
//!
//! Walks a word's ROI left to right. For each expected character a window
//! anchored at the previous boundary grows by a fixed increment until the
//! classifier reads exactly that character or the window hits the ROI edge.
//! Without an exact read, the highest-confidence window wins.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::classifier::{sanitize_confidence, CharClassifier};
use super::geometry::Roi;
use super::tracker::{ConfidenceTracker, ScanWindow};
use super::ScanConfig;

/// One character's slice of the ROI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterSegment {
    pub character: char,
    /// ROI-relative start column (inclusive)
    pub start_x: u32,
    /// ROI-relative end column (exclusive)
    pub end_x: u32,
    pub confidence: f32,
    /// false when the boundary is a best-confidence fallback
    pub matched: bool,
}

/// Shared flag used to abandon in-flight scans
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Greedy classifier-guided scanner for one word at a time
pub struct Scanner<'a, C: ?Sized> {
    classifier: &'a C,
    config: &'a ScanConfig,
    cancel: Option<&'a CancelToken>,
}

impl<'a, C: CharClassifier + ?Sized> Scanner<'a, C> {
    pub fn new(classifier: &'a C, config: &'a ScanConfig) -> Self {
        Self {
            classifier,
            config,
            cancel: None,
        }
    }

    /// Stop between classifier calls once `cancel` is set
    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Segment `roi` into one slice per character of `expected_text`
    ///
    /// Returns `None` only when the scan was cancelled.
    pub fn scan(&self, roi: &Roi, expected_text: &str) -> Option<Vec<LetterSegment>> {
        let mut tracker = ConfidenceTracker::new();
        self.scan_with_tracker(roi, expected_text, &mut tracker)
    }

    /// Like [`Scanner::scan`], leaving every tried candidate in `tracker`
    pub fn scan_with_tracker(
        &self,
        roi: &Roi,
        expected_text: &str,
        tracker: &mut ConfidenceTracker,
    ) -> Option<Vec<LetterSegment>> {
        let width = roi.width();
        let mut cursor = 0;
        let mut segments = Vec::with_capacity(expected_text.chars().count());

        for (index, character) in expected_text.chars().enumerate() {
            let segment = if cursor >= width {
                debug!("No columns left for '{}' (letter {})", character, index);
                LetterSegment {
                    character,
                    start_x: width,
                    end_x: width,
                    confidence: 0.0,
                    matched: false,
                }
            } else {
                self.scan_letter(roi, index, character, cursor, tracker)?
            };

            cursor = segment.end_x;
            segments.push(segment);
        }

        // Trailing columns belong to the last letter.
        if let Some(last) = segments.last_mut() {
            last.end_x = width;
        }

        Some(segments)
    }

    fn scan_letter(
        &self,
        roi: &Roi,
        index: usize,
        character: char,
        cursor: u32,
        tracker: &mut ConfidenceTracker,
    ) -> Option<LetterSegment> {
        let width = roi.width();
        let increment = self.config.increment.max(1);
        let expected = character.to_string();
        let mut step: u32 = 1;

        loop {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                debug!("Scan cancelled at letter {}", index);
                return None;
            }

            let end = cursor
                .saturating_add(step.saturating_mul(increment))
                .min(width);
            let window = ScanWindow::new(cursor, end);
            let patch = roi.columns(window.start, window.end);

            let (text, confidence) = match self.classifier.classify(&patch) {
                Ok(result) => (Some(result.text), sanitize_confidence(result.confidence)),
                Err(e) => {
                    warn!(
                        "Classifier failed on window {}..{} for '{}': {}",
                        window.start, window.end, character, e
                    );
                    (None, 0.0)
                }
            };

            debug!(
                "Letter {} '{}' window {}..{}: {:?} ({:.3})",
                index, character, window.start, window.end, text, confidence
            );
            tracker.record(index, window, confidence, text.as_deref());

            if text.as_deref() == Some(expected.as_str()) {
                return Some(LetterSegment {
                    character,
                    start_x: window.start,
                    end_x: window.end,
                    confidence,
                    matched: true,
                });
            }

            if end >= width {
                break;
            }
            step += 1;
        }

        let (window, confidence) = tracker
            .best_candidate(index)
            .map(|c| (c.window, c.confidence))
            .unwrap_or((ScanWindow::new(cursor, width), 0.0));

        debug!(
            "Fallback for '{}' at {}..{} ({:.3})",
            character, window.start, window.end, confidence
        );

        Some(LetterSegment {
            character,
            start_x: window.start,
            end_x: window.end,
            confidence,
            matched: false,
        })
    }
}
