//! Document Layer
//!
//! Reads the inputs the segmentation core works from: the upstream OCR
//! service's word annotations and the page image they refer to.

pub mod annotation;
pub mod page;
pub mod textract;

pub use annotation::{NormalizedPoint, Polygon, WordAnnotation};
pub use page::PageImage;
pub use textract::{load_document, parse_document};
