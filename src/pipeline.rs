//! Page segmentation pipeline
//!
//! Runs every word of a page through rectify, scan and assemble. Words are
//! independent, so a small pool of worker threads pulls word indices from a
//! channel; letters within a word are always scanned in order on one thread.

use crossbeam_channel::unbounded;
use image::GrayImage;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::document::WordAnnotation;
use crate::vision::{
    assemble, assemble_failed, rectify, CancelToken, CharClassifier, ConfidenceTracker,
    ScanConfig, Scanner, SegmentationResult, SegmentationStatus,
};

/// Results for one page
#[derive(Debug, Clone, Serialize)]
pub struct PageSegmentation {
    /// Finished words in input order
    pub results: Vec<SegmentationResult>,
    /// Set when the page was cancelled before every word finished
    pub cancelled: bool,
}

/// Status counts for a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
}

impl PageSegmentation {
    pub fn summary(&self) -> PageSummary {
        let mut summary = PageSummary::default();
        for result in &self.results {
            match result.status() {
                SegmentationStatus::Complete => summary.complete += 1,
                SegmentationStatus::PartialFallback => summary.partial += 1,
                SegmentationStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// Segment a single word
///
/// Returns `None` if `cancel` fired before the word finished; nothing of the
/// word's partial state escapes.
pub fn segment_word<C: CharClassifier + ?Sized>(
    image: &GrayImage,
    word_index: usize,
    word: &WordAnnotation,
    classifier: &C,
    config: &ScanConfig,
    cancel: &CancelToken,
) -> Option<SegmentationResult> {
    let roi = match rectify(image, &word.polygon) {
        Ok(roi) => roi,
        Err(e) => {
            warn!("Word {} ({}) '{}' rejected: {}", word_index, word.label(), word.text, e);
            return Some(assemble_failed(word_index, word, &e));
        }
    };

    let mut tracker = ConfidenceTracker::new();
    let segments = Scanner::new(classifier, config)
        .with_cancel(cancel)
        .scan_with_tracker(&roi, &word.text, &mut tracker)?;

    let result = assemble(word_index, word, &roi, segments);
    debug!(
        "Word {} '{}' {}x{} at {:?}: {:?} after {} classifier calls",
        word_index,
        word.text,
        roi.width(),
        roi.height(),
        roi.origin(),
        result.status(),
        tracker.total_candidates()
    );
    Some(result)
}

/// Segment every word of a page using up to `workers` threads
pub fn segment_page<C: CharClassifier + ?Sized>(
    image: &GrayImage,
    words: &[WordAnnotation],
    classifier: &C,
    config: &ScanConfig,
    workers: usize,
    cancel: &CancelToken,
) -> PageSegmentation {
    let start = Instant::now();
    let workers = workers.clamp(1, words.len().max(1));
    info!(
        "Segmenting {} words with {} worker(s), increment {} px",
        words.len(),
        workers,
        config.increment
    );

    let (job_tx, job_rx) = unbounded::<usize>();
    let (result_tx, result_rx) = unbounded::<SegmentationResult>();
    for index in 0..words.len() {
        // Receiver is alive until the scope below ends.
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(index) = job_rx.recv() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let word = &words[index];
                    if let Some(result) =
                        segment_word(image, index, word, classifier, config, cancel)
                    {
                        let _ = result_tx.send(result);
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<SegmentationResult> = result_rx.iter().collect();
    results.sort_by_key(|r| r.word_index());

    let page = PageSegmentation {
        cancelled: results.len() < words.len() && cancel.is_cancelled(),
        results,
    };

    let summary = page.summary();
    info!(
        "Page done in {:?}: {} complete, {} partial, {} failed{}",
        start.elapsed(),
        summary.complete,
        summary.partial,
        summary.failed,
        if page.cancelled { " (cancelled)" } else { "" }
    );

    page
}
