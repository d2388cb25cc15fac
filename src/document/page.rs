//! Page image loaded for segmentation

use image::GrayImage;
use std::path::{Path, PathBuf};

/// A page converted to 8-bit grayscale
#[derive(Debug)]
pub struct PageImage {
    /// Grayscale pixels
    pub image: GrayImage,
    /// Where the page was loaded from, if it came from disk
    pub source: Option<PathBuf>,
}

impl PageImage {
    /// Decode an image file and convert it to grayscale
    pub fn open(path: &Path) -> image::ImageResult<Self> {
        let image = image::open(path)?.to_luma8();
        Ok(Self {
            image,
            source: Some(path.to_path_buf()),
        })
    }

    /// Get page dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
