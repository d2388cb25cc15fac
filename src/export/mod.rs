//! Result export
//!
//! JSON report, debug overlay with the letter boxes drawn on the page, and
//! per-letter glyph crops for building training sets.

use image::{imageops, DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ExportError;
use crate::pipeline::PageSegmentation;
use crate::vision::LetterBox;

const MATCHED_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const FALLBACK_COLOR: Rgb<u8> = Rgb([220, 0, 0]);
const ROI_COLOR: Rgb<u8> = Rgb([0, 90, 255]);

/// Write the page results as JSON
pub fn write_json(page: &PageSegmentation, path: &Path, pretty: bool) -> Result<(), ExportError> {
    let writer = BufWriter::new(File::create(path)?);
    if pretty {
        serde_json::to_writer_pretty(writer, page)?;
    } else {
        serde_json::to_writer(writer, page)?;
    }
    info!("Wrote {} results to {:?}", page.results.len(), path);
    Ok(())
}

/// Render the page with word regions and letter boxes outlined
///
/// Matched letters are green, fallback letters red, word regions blue.
pub fn render_overlay(image: &GrayImage, page: &PageSegmentation) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(image.clone()).to_rgb8();

    for result in &page.results {
        if let Some(roi) = result.roi() {
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(roi.x as i32, roi.y as i32).of_size(roi.width, roi.height),
                ROI_COLOR,
            );
        }
        for letter in result.letters() {
            if let Some(rect) = letter_rect(letter) {
                let color = if letter.matched {
                    MATCHED_COLOR
                } else {
                    FALLBACK_COLOR
                };
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }
        }
    }

    canvas
}

/// Save the overlay produced by [`render_overlay`]
pub fn write_overlay(
    image: &GrayImage,
    page: &PageSegmentation,
    path: &Path,
) -> Result<(), ExportError> {
    render_overlay(image, page).save(path)?;
    info!("Wrote debug overlay to {:?}", path);
    Ok(())
}

/// Save each letter's crop as `<word>_<letter>_U+XXXX.png` under `dir`
///
/// Zero-width letters are skipped, as are fallback letters unless
/// `include_fallback` is set. Returns the written paths.
pub fn export_glyphs(
    image: &GrayImage,
    page: &PageSegmentation,
    dir: &Path,
    include_fallback: bool,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for result in &page.results {
        for (letter_index, letter) in result.letters().iter().enumerate() {
            if letter.bbox.is_empty() || (!letter.matched && !include_fallback) {
                continue;
            }
            let bbox = letter.bbox;
            let glyph = imageops::crop_imm(image, bbox.x_start, bbox.y_start, bbox.width(), bbox.height())
                .to_image();

            let path = dir.join(glyph_file_name(result.word_index(), letter_index, letter.character));
            glyph.save(&path)?;
            debug!("Glyph '{}' -> {:?}", letter.character, path);
            written.push(path);
        }
    }

    info!("Exported {} glyphs to {:?}", written.len(), dir);
    Ok(written)
}

fn glyph_file_name(word_index: usize, letter_index: usize, character: char) -> String {
    format!("{:05}_{:03}_U+{:04X}.png", word_index, letter_index, character as u32)
}

fn letter_rect(letter: &LetterBox) -> Option<Rect> {
    if letter.bbox.is_empty() {
        return None;
    }
    Some(
        Rect::at(letter.bbox.x_start as i32, letter.bbox.y_start as i32)
            .of_size(letter.bbox.width(), letter.bbox.height()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Polygon, WordAnnotation};
    use crate::vision::{assemble, rectify, LetterSegment};
    use image::Luma;

    fn sample_page(image: &GrayImage) -> PageSegmentation {
        let word = WordAnnotation::new("hi", Polygon::from_rect(0.25, 0.25, 0.75, 0.75));
        let roi = rectify(image, &word.polygon).unwrap();
        let segments = vec![
            LetterSegment {
                character: 'h',
                start_x: 0,
                end_x: 10,
                confidence: 0.9,
                matched: true,
            },
            LetterSegment {
                character: 'i',
                start_x: 10,
                end_x: 20,
                confidence: 0.4,
                matched: false,
            },
        ];
        PageSegmentation {
            results: vec![assemble(0, &word, &roi, segments)],
            cancelled: false,
        }
    }

    #[test]
    fn test_glyph_file_name() {
        assert_eq!(glyph_file_name(3, 1, 'A'), "00003_001_U+0041.png");
        assert_eq!(glyph_file_name(0, 0, 'ß'), "00000_000_U+00DF.png");
    }

    #[test]
    fn test_overlay_colors() {
        let image = GrayImage::from_pixel(40, 40, Luma([255]));
        let page = sample_page(&image);

        let overlay = render_overlay(&image, &page);

        assert_eq!(overlay.dimensions(), (40, 40));
        // Letter boxes are drawn after the word region, so they win on shared edges
        assert_eq!(overlay.get_pixel(10, 10), &MATCHED_COLOR);
        assert_eq!(overlay.get_pixel(29, 15), &FALLBACK_COLOR);
        assert_eq!(overlay.get_pixel(5, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_export_glyphs_skips_fallback() {
        let image = GrayImage::from_fn(40, 40, |x, _| Luma([x as u8]));
        let page = sample_page(&image);
        let dir = tempfile::tempdir().unwrap();

        let written = export_glyphs(&image, &page, dir.path(), false).unwrap();
        assert_eq!(written.len(), 1);

        let glyph = image::open(&written[0]).unwrap().to_luma8();
        assert_eq!(glyph.dimensions(), (10, 20));
        assert_eq!(glyph.get_pixel(0, 0), &Luma([10]));

        let all = export_glyphs(&image, &page, dir.path(), true).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_write_json() {
        let image = GrayImage::new(40, 40);
        let page = sample_page(&image);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&page, &path, true).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let result = &value["results"][0];
        assert_eq!(result["status"], "partial_fallback");
        assert_eq!(result["letters"][1]["bbox"]["x_start"], 20);
        assert_eq!(result["letters"][1]["matched"], false);
        assert_eq!(result["word"]["text"], "hi");
    }
}
