//! letterseg - split OCR word regions into per-letter boxes
//!
//! Takes a page image plus word annotations from an upstream OCR service and
//! searches each word's region for letter boundaries, using a
//! single-character classifier as an oracle.

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod vision;

pub use document::{PageImage, Polygon, WordAnnotation};
pub use error::{ClassifierError, DocumentError, ExportError, GeometryError};
pub use pipeline::{segment_page, segment_word, PageSegmentation, PageSummary};
pub use vision::{
    CancelToken, CharClassifier, Classification, LetterBox, ScanConfig, SegmentationResult,
    SegmentationStatus,
};
