//! Word geometry rectification
//!
//! Maps a normalized word polygon onto the page pixel grid and crops the
//! rectangular region of interest the scanner works on.

use image::{imageops, GrayImage};
use serde::Serialize;

use crate::document::{NormalizedPoint, Polygon};
use crate::error::GeometryError;

/// A polygon corner on the page pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

/// Polygon corners floored to pixel coordinates, same order as [`Polygon`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPolygon(pub [PixelPoint; 4]);

impl PixelPolygon {
    /// Scale every corner by the page dimensions and floor it
    pub fn from_normalized(polygon: &Polygon, width: u32, height: u32) -> Result<Self, GeometryError> {
        let mut corners = [PixelPoint { x: 0, y: 0 }; 4];
        for (slot, point) in corners.iter_mut().zip(polygon.corners()) {
            *slot = to_pixel(point, width, height)?;
        }
        Ok(Self(corners))
    }

    pub fn bottom_left(&self) -> PixelPoint {
        self.0[0]
    }

    pub fn top_right(&self) -> PixelPoint {
        self.0[2]
    }
}

fn to_pixel(point: &NormalizedPoint, width: u32, height: u32) -> Result<PixelPoint, GeometryError> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(GeometryError::NonFinite);
    }

    let x = (point.x * width as f64).floor() as i64;
    let y = (point.y * height as f64).floor() as i64;

    if x < 0 || y < 0 || x > width as i64 || y > height as i64 {
        return Err(GeometryError::OutOfBounds {
            x,
            y,
            image_width: width,
            image_height: height,
        });
    }

    Ok(PixelPoint { x, y })
}

/// Axis-aligned pixel rectangle on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Region of interest for one word
///
/// Owns its crop of the page so it can be handed to a worker thread without
/// borrowing the page.
#[derive(Debug, Clone)]
pub struct Roi {
    image: GrayImage,
    origin_x: u32,
    origin_y: u32,
}

impl Roi {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Page-space position of the ROI's top-left pixel
    pub fn origin(&self) -> (u32, u32) {
        (self.origin_x, self.origin_y)
    }

    /// Page rectangle covered by this ROI
    pub fn bounds(&self) -> PixelRect {
        PixelRect {
            x: self.origin_x,
            y: self.origin_y,
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Full-height strip `[start_x, end_x)` of the ROI
    pub fn columns(&self, start_x: u32, end_x: u32) -> GrayImage {
        let start_x = start_x.min(self.width());
        let end_x = end_x.clamp(start_x, self.width());
        imageops::crop_imm(&self.image, start_x, 0, end_x - start_x, self.height()).to_image()
    }
}

/// Crop the region of interest described by `polygon`
///
/// Only the bottom-left and top-right corners bound the crop; all four are
/// checked against the page bounds. Min/max per axis makes the result the same
/// whether the annotation's y axis points up or down.
pub fn rectify(image: &GrayImage, polygon: &Polygon) -> Result<Roi, GeometryError> {
    let (width, height) = image.dimensions();
    let pixels = PixelPolygon::from_normalized(polygon, width, height)?;

    let a = pixels.bottom_left();
    let b = pixels.top_right();
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));

    if x1 - x0 <= 0 || y1 - y0 <= 0 {
        return Err(GeometryError::Degenerate {
            width: x1 - x0,
            height: y1 - y0,
        });
    }

    // Corners were bounds-checked, so every value fits in u32.
    let (x0, y0) = (x0 as u32, y0 as u32);
    let (w, h) = ((x1 - x0 as i64) as u32, (y1 - y0 as i64) as u32);

    Ok(Roi {
        image: imageops::crop_imm(image, x0, y0, w, h).to_image(),
        origin_x: x0,
        origin_y: y0,
    })
}
