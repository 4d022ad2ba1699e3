//! Debug preview of a detection run.
//!
//! Draws the recognized word boxes and the chosen button point onto the
//! image Tesseract saw, and shows it in a window or saves it to disk.

pub mod window;

pub use window::show_preview;

use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

use crate::detect::{is_meaningful, Detection};

/// Color constants for preview rendering.
pub const COLOR_WORD_BOX: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green
pub const COLOR_BUTTON: Rgba<u8> = Rgba([255, 0, 0, 255]); // Red

/// Renders the detection onto a color copy of its enhanced image.
///
/// `origin` is the screen position of the image's top-left pixel, used to
/// map the chosen screen point back into the image.
pub fn annotate(detection: &Detection, origin: (i32, i32), min_text_len: usize) -> RgbaImage {
    let mut img = DynamicImage::ImageLuma8(detection.image.clone()).to_rgba8();

    for word in detection
        .words
        .iter()
        .filter(|word| is_meaningful(word, min_text_len))
    {
        draw_rect(
            &mut img,
            word.left,
            word.top,
            word.width.max(0) as u32,
            word.height.max(0) as u32,
            COLOR_WORD_BOX,
            2,
        );
    }

    if let Some(found) = &detection.found {
        draw_dot(
            &mut img,
            found.position.0 - origin.0,
            found.position.1 - origin.1,
            2,
            COLOR_BUTTON,
        );
    }

    img
}

/// Saves the preview image as PNG.
pub fn save_preview(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save(path)
        .with_context(|| format!("Failed to save debug image to {}", path.display()))?;
    log::info!("Saved debug image to {}", path.display());
    Ok(())
}

fn put_clipped(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (img_w, img_h) = img.dimensions();
    if x >= 0 && y >= 0 && (x as u32) < img_w && (y as u32) < img_h {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draws a rectangle border on an image. The border grows inwards.
pub fn draw_rect(
    img: &mut RgbaImage,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    color: Rgba<u8>,
    thickness: u32,
) {
    if w == 0 || h == 0 {
        return;
    }
    let (x, y, w, h) = (x as i64, y as i64, w as i64, h as i64);
    let t = (thickness as i64).min(w).min(h);

    for d in 0..t {
        // Top and bottom edges
        for dx in 0..w {
            put_clipped(img, x + dx, y + d, color);
            put_clipped(img, x + dx, y + h - 1 - d, color);
        }
        // Left and right edges
        for dy in 0..h {
            put_clipped(img, x + d, y + dy, color);
            put_clipped(img, x + w - 1 - d, y + dy, color);
        }
    }
}

/// Draws a filled circle centered on (cx, cy).
pub fn draw_dot(img: &mut RgbaImage, cx: i32, cy: i32, radius: u32, color: Rgba<u8>) {
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_clipped(img, cx as i64 + dx, cy as i64 + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ButtonCandidate;
    use crate::ocr::OcrWord;
    use image::GrayImage;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_draw_rect() {
        let mut img = RgbaImage::from_pixel(100, 100, BLACK);
        draw_rect(&mut img, 10, 10, 50, 30, COLOR_WORD_BOX, 2);

        assert_eq!(*img.get_pixel(10, 10), COLOR_WORD_BOX);
        assert_eq!(*img.get_pixel(59, 39), COLOR_WORD_BOX);
        assert_eq!(*img.get_pixel(11, 25), COLOR_WORD_BOX);
        assert_eq!(*img.get_pixel(35, 25), BLACK, "Inside stays untouched");
        assert_eq!(*img.get_pixel(60, 40), BLACK, "Outside stays untouched");
    }

    #[test]
    fn test_draw_rect_clips_at_edges() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        draw_rect(&mut img, -5, -5, 8, 8, COLOR_WORD_BOX, 1);
        assert_eq!(*img.get_pixel(2, 0), COLOR_WORD_BOX);
        assert_eq!(*img.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn test_draw_dot() {
        let mut img = RgbaImage::from_pixel(20, 20, BLACK);
        draw_dot(&mut img, 10, 10, 2, COLOR_BUTTON);

        assert_eq!(*img.get_pixel(10, 10), COLOR_BUTTON);
        assert_eq!(*img.get_pixel(12, 10), COLOR_BUTTON);
        assert_eq!(*img.get_pixel(12, 12), BLACK, "Corner is outside the circle");
    }

    #[test]
    fn test_annotate() {
        let detection = Detection {
            found: Some(ButtonCandidate {
                text: "drop".to_string(),
                position: (1020, 530),
            }),
            attempts: 1,
            image: GrayImage::from_pixel(60, 60, image::Luma([128])),
            words: vec![
                OcrWord {
                    text: "Drop".to_string(),
                    left: 5,
                    top: 20,
                    width: 30,
                    height: 20,
                    confidence: 90.0,
                },
                OcrWord {
                    text: "".to_string(),
                    left: 0,
                    top: 0,
                    width: 60,
                    height: 60,
                    confidence: -1.0,
                },
            ],
            candidates: Vec::new(),
        };

        let img = annotate(&detection, (1000, 500), 2);

        assert_eq!(*img.get_pixel(5, 20), COLOR_WORD_BOX);
        assert_eq!(*img.get_pixel(0, 0), Rgba([128, 128, 128, 255]), "Empty rows are not boxed");
        assert_eq!(*img.get_pixel(20, 30), COLOR_BUTTON);
    }
}
