//! Word annotations supplied by the upstream OCR service

use serde::{Deserialize, Serialize};

/// A point in image-relative coordinates, both axes nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Word quadrilateral: bottom-left, bottom-right, top-right, top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polygon(pub [NormalizedPoint; 4]);

impl Polygon {
    pub fn new(
        bottom_left: NormalizedPoint,
        bottom_right: NormalizedPoint,
        top_right: NormalizedPoint,
        top_left: NormalizedPoint,
    ) -> Self {
        Self([bottom_left, bottom_right, top_right, top_left])
    }

    /// Axis-aligned polygon covering `[x0, x1] x [y0, y1]`
    pub fn from_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(
            NormalizedPoint::new(x0, y0),
            NormalizedPoint::new(x1, y0),
            NormalizedPoint::new(x1, y1),
            NormalizedPoint::new(x0, y1),
        )
    }

    pub fn bottom_left(&self) -> NormalizedPoint {
        self.0[0]
    }

    pub fn bottom_right(&self) -> NormalizedPoint {
        self.0[1]
    }

    pub fn top_right(&self) -> NormalizedPoint {
        self.0[2]
    }

    pub fn top_left(&self) -> NormalizedPoint {
        self.0[3]
    }

    pub fn corners(&self) -> &[NormalizedPoint; 4] {
        &self.0
    }
}

/// One recognized word and where it sits on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAnnotation {
    /// Upstream block id, when the document carries one
    pub id: Option<String>,
    /// Recognized word text
    pub text: String,
    /// Word location on the page
    pub polygon: Polygon,
}

impl WordAnnotation {
    pub fn new(text: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            id: None,
            text: text.into(),
            polygon,
        }
    }

    /// Block id for log messages
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("-")
    }
}
