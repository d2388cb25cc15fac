//! Per-letter candidate bookkeeping
//!
//! Keeps every window tried for each letter of one word together with the
//! classifier's answer, and the running best by confidence.

/// Half-open column range `[start, end)` of the ROI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub start: u32,
    pub end: u32,
}

impl ScanWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// One window presented to the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub window: ScanWindow,
    /// Recognized text; `None` when the classifier call failed
    pub text: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Default)]
struct LetterCandidates {
    candidates: Vec<Candidate>,
    best: Option<usize>,
}

/// Candidate history for one word, indexed by letter position
#[derive(Debug, Default)]
pub struct ConfidenceTracker {
    letters: Vec<LetterCandidates>,
}

impl ConfidenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tried window for a letter
    ///
    /// The best candidate only changes on a strictly higher confidence, so on
    /// a tie the earliest (narrowest) window is kept.
    pub fn record(
        &mut self,
        letter_index: usize,
        window: ScanWindow,
        confidence: f32,
        recognized_text: Option<&str>,
    ) {
        if self.letters.len() <= letter_index {
            self.letters.resize_with(letter_index + 1, LetterCandidates::default);
        }
        let letter = &mut self.letters[letter_index];

        let is_better = match letter.best {
            Some(best) => confidence > letter.candidates[best].confidence,
            None => true,
        };
        if is_better {
            letter.best = Some(letter.candidates.len());
        }

        letter.candidates.push(Candidate {
            window,
            text: recognized_text.map(str::to_string),
            confidence,
        });
    }

    /// Highest-confidence window tried for a letter
    pub fn best(&self, letter_index: usize) -> Option<ScanWindow> {
        self.best_candidate(letter_index).map(|c| c.window)
    }

    pub fn best_candidate(&self, letter_index: usize) -> Option<&Candidate> {
        let letter = self.letters.get(letter_index)?;
        letter.best.map(|i| &letter.candidates[i])
    }

    /// All windows tried for a letter, in the order they were tried
    pub fn candidates(&self, letter_index: usize) -> &[Candidate] {
        self.letters
            .get(letter_index)
            .map(|l| l.candidates.as_slice())
            .unwrap_or(&[])
    }

    /// Total classifier answers recorded across all letters
    pub fn total_candidates(&self) -> usize {
        self.letters.iter().map(|l| l.candidates.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_is_highest_confidence() {
        let mut tracker = ConfidenceTracker::new();
        tracker.record(0, ScanWindow::new(0, 20), 0.3, Some("l"));
        tracker.record(0, ScanWindow::new(0, 40), 0.8, Some("h"));
        tracker.record(0, ScanWindow::new(0, 60), 0.5, Some("n"));

        assert_eq!(tracker.best(0), Some(ScanWindow::new(0, 40)));
        assert_eq!(tracker.best_candidate(0).unwrap().text.as_deref(), Some("h"));
    }

    #[test]
    fn test_tie_prefers_earliest_window() {
        let mut tracker = ConfidenceTracker::new();
        tracker.record(0, ScanWindow::new(0, 20), 0.1, None);
        tracker.record(0, ScanWindow::new(0, 40), 0.7, Some("a"));
        tracker.record(0, ScanWindow::new(0, 60), 0.7, Some("a"));

        assert_eq!(tracker.best(0), Some(ScanWindow::new(0, 40)));
    }

    #[test]
    fn test_all_zero_keeps_first() {
        let mut tracker = ConfidenceTracker::new();
        tracker.record(0, ScanWindow::new(10, 30), 0.0, None);
        tracker.record(0, ScanWindow::new(10, 50), 0.0, None);

        assert_eq!(tracker.best(0), Some(ScanWindow::new(10, 30)));
    }

    #[test]
    fn test_letters_are_independent() {
        let mut tracker = ConfidenceTracker::new();
        tracker.record(0, ScanWindow::new(0, 20), 0.9, Some("a"));
        tracker.record(1, ScanWindow::new(20, 40), 0.2, Some("c"));
        tracker.record(1, ScanWindow::new(20, 60), 0.4, Some("b"));

        assert_eq!(tracker.best(0), Some(ScanWindow::new(0, 20)));
        assert_eq!(tracker.best(1), Some(ScanWindow::new(20, 60)));
        assert_eq!(tracker.candidates(1).len(), 2);
        assert_eq!(tracker.total_candidates(), 3);
    }

    #[test]
    fn test_unknown_letter() {
        let tracker = ConfidenceTracker::new();
        assert!(tracker.best(3).is_none());
        assert!(tracker.candidates(3).is_empty());
    }

    #[test]
    fn test_window_width() {
        assert_eq!(ScanWindow::new(20, 100).width(), 80);
        assert_eq!(ScanWindow::new(100, 100).width(), 0);
    }
}
