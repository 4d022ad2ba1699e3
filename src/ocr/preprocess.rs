use image::{GrayImage, Luma, RgbaImage};

/// Prepares a screen capture for Tesseract.
///
/// Converts to grayscale, posterizes to `posterize_bits` bits per pixel and
/// then stretches contrast around mid-gray. With the defaults (2 bits,
/// level 100) every pixel ends up black, mid-gray or white, which keeps the
/// light button captions apart from the textured course background.
pub fn enhance_for_ocr(img: &RgbaImage, posterize_bits: u8, contrast_level: f32) -> GrayImage {
    let mut gray = to_grayscale(img);
    posterize(&mut gray, posterize_bits);
    change_contrast(&mut gray, contrast_level);
    gray
}

/// ITU-R 601-2 luma, in 16-bit fixed point with rounding.
pub fn to_grayscale(img: &RgbaImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let r = pixel[0] as u32;
        let g = pixel[1] as u32;
        let b = pixel[2] as u32;
        let luma = (r * 19595 + g * 38470 + b * 7471 + 0x8000) >> 16;
        output.put_pixel(x, y, Luma([luma as u8]));
    }

    output
}

/// Keeps only the `bits` most significant bits of every pixel.
pub fn posterize(img: &mut GrayImage, bits: u8) {
    let bits = bits.clamp(1, 8);
    let mask = !(0xFFu8 >> bits);
    for pixel in img.pixels_mut() {
        pixel[0] &= mask;
    }
}

/// Builds the 256-entry contrast table for `level` (-255 to 255).
///
/// `c' = 128 + F * (c - 128)` with `F = 259 (level + 255) / (255 (259 - level))`,
/// rounded half to even and clamped to 0..=255.
pub fn contrast_table(level: f32) -> [u8; 256] {
    let level = level as f64;
    let factor = (259.0 * (level + 255.0)) / (255.0 * (259.0 - level));

    let mut table = [0u8; 256];
    for (c, entry) in table.iter_mut().enumerate() {
        let value = 128.0 + factor * (c as f64 - 128.0);
        *entry = value.round_ties_even().clamp(0.0, 255.0) as u8;
    }
    table
}

/// Applies the contrast table to every pixel.
pub fn change_contrast(img: &mut GrayImage, level: f32) {
    let table = contrast_table(level);
    for pixel in img.pixels_mut() {
        pixel[0] = table[pixel[0] as usize];
    }
}
