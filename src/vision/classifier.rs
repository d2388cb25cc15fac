//! Single-character classifier contract
//!
//! The scanner only needs "image patch in, text and confidence out". Any
//! recognition engine that can answer that question for one glyph can be
//! plugged in.

use image::GrayImage;

use crate::error::ClassifierError;

/// Classifier answer for one image patch
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Recognized text, normally a single character
    pub text: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

impl Classification {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Recognizes a single character in an image patch
///
/// Implementations enforce their own per-call timeout and report it as
/// [`ClassifierError::Timeout`]. Calls may come from several worker threads at
/// once.
pub trait CharClassifier: Send + Sync {
    fn classify(&self, patch: &GrayImage) -> Result<Classification, ClassifierError>;
}

impl<T: CharClassifier + ?Sized> CharClassifier for &T {
    fn classify(&self, patch: &GrayImage) -> Result<Classification, ClassifierError> {
        (**self).classify(patch)
    }
}

impl<T: CharClassifier + ?Sized> CharClassifier for Box<T> {
    fn classify(&self, patch: &GrayImage) -> Result<Classification, ClassifierError> {
        (**self).classify(patch)
    }
}

/// Clamp a reported confidence into [0, 1]; NaN counts as no confidence
pub fn sanitize_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
