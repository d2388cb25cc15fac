//! Error types
//!
//! Per-word, per-candidate and document-level failures are kept in separate
//! enums so callers can tell which scope a failure belongs to.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A word polygon that cannot be turned into a usable region of interest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("degenerate word region: {width}x{height} px")]
    Degenerate { width: i64, height: i64 },

    #[error("corner ({x}, {y}) outside {image_width}x{image_height} image")]
    OutOfBounds {
        x: i64,
        y: i64,
        image_width: u32,
        image_height: u32,
    },

    #[error("non-finite polygon coordinate")]
    NonFinite,
}

/// Failure of a single classifier call
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier timed out after {0} ms")]
    Timeout(u64),

    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier failed: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Structurally invalid annotation document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("missing annotation data: {field} (block {block})")]
    MissingAnnotationData { field: &'static str, block: String },

    #[error("word block {block} has {count} polygon points, expected 4")]
    PolygonPointCount { block: String, count: usize },

    #[error("invalid annotation JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    /// Document without a `Blocks` array at all
    pub fn missing_blocks() -> Self {
        DocumentError::MissingAnnotationData {
            field: "Blocks",
            block: "<document>".to_string(),
        }
    }
}

/// Failure while writing results, overlays or glyph crops
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
