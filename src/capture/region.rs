use anyhow::{bail, Result};
use image::{Rgba, RgbaImage};

/// Largest capture area accepted, in pixels (16384 x 16384).
pub const MAX_REGION_PIXELS: u64 = 1 << 28;

/// A rectangle in virtual-desktop pixels.
///
/// The origin may be negative when a monitor sits left of or above the
/// primary one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Checks that the rectangle can be captured into a single RGBA buffer.
    ///
    /// Each side must fit in `i32` (the platform capture APIs take signed
    /// sizes), the far edges must stay within the `i32` coordinate range, and
    /// the area must not exceed `MAX_REGION_PIXELS`.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("Capture region must not be empty");
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            bail!(
                "Capture region {}x{} exceeds the maximum side of {} pixels",
                self.width,
                self.height,
                i32::MAX
            );
        }
        if self.right() > i32::MAX as i64 || self.bottom() > i32::MAX as i64 {
            bail!(
                "Capture region {}x{} at ({}, {}) extends past the screen coordinate range",
                self.width,
                self.height,
                self.x,
                self.y
            );
        }
        let pixels = (self.width as u64).checked_mul(self.height as u64);
        match pixels {
            Some(pixels) if pixels <= MAX_REGION_PIXELS => Ok(()),
            _ => bail!(
                "Capture region {}x{} is larger than {} pixels",
                self.width,
                self.height,
                MAX_REGION_PIXELS
            ),
        }
    }

    /// Size in bytes of an RGBA buffer for this rectangle.
    pub fn rgba_len(&self) -> Result<usize> {
        self.validate()?;
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(4));
        match len {
            Some(len) => Ok(len),
            None => bail!("Capture region {}x{} overflows memory", self.width, self.height),
        }
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Returns the overlapping area, or None if the rectangles do not touch.
    pub fn intersect(&self, other: &ScreenRect) -> Option<ScreenRect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left as i64 || bottom <= top as i64 {
            return None;
        }

        Some(ScreenRect {
            x: left,
            y: top,
            width: (right - left as i64) as u32,
            height: (bottom - top as i64) as u32,
        })
    }
}

/// One monitor's screenshot together with its desktop position.
pub struct MonitorShot {
    pub bounds: ScreenRect,
    pub image: RgbaImage,
}

/// Pastes the parts of each monitor shot that fall inside `rect` into a
/// canvas of the rectangle's size. Uncovered pixels stay opaque black.
///
/// Shots whose pixel size differs from their logical bounds (HiDPI) are
/// sampled at the logical position.
pub fn compose_region(rect: &ScreenRect, shots: &[MonitorShot]) -> Result<RgbaImage> {
    rect.validate()?;
    let mut canvas = RgbaImage::from_pixel(rect.width, rect.height, Rgba([0, 0, 0, 255]));

    for shot in shots {
        let Some(overlap) = rect.intersect(&shot.bounds) else {
            continue;
        };
        let (img_w, img_h) = shot.image.dimensions();
        let scale_x = img_w as f64 / shot.bounds.width.max(1) as f64;
        let scale_y = img_h as f64 / shot.bounds.height.max(1) as f64;

        for dy in 0..overlap.height {
            for dx in 0..overlap.width {
                let desk_x = overlap.x as i64 + dx as i64;
                let desk_y = overlap.y as i64 + dy as i64;

                let src_x = ((desk_x - shot.bounds.x as i64) as f64 * scale_x) as u32;
                let src_y = ((desk_y - shot.bounds.y as i64) as f64 * scale_y) as u32;
                if src_x >= img_w || src_y >= img_h {
                    continue;
                }

                let dst_x = (desk_x - rect.x as i64) as u32;
                let dst_y = (desk_y - rect.y as i64) as u32;
                canvas.put_pixel(dst_x, dst_y, *shot.image.get_pixel(src_x, src_y));
            }
        }
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect() {
        let a = ScreenRect::new(0, 0, 100, 100);
        let b = ScreenRect::new(50, 80, 100, 100);
        assert_eq!(a.intersect(&b), Some(ScreenRect::new(50, 80, 50, 20)));

        let c = ScreenRect::new(100, 0, 10, 10);
        assert_eq!(a.intersect(&c), None, "Touching edges do not overlap");
    }

    #[test]
    fn test_intersect_negative_origin() {
        let left_monitor = ScreenRect::new(-1920, 0, 1920, 1080);
        let region = ScreenRect::new(-100, 10, 300, 50);
        assert_eq!(
            left_monitor.intersect(&region),
            Some(ScreenRect::new(-100, 10, 100, 50))
        );
    }

    #[test]
    fn test_validate_accepts_desktop_sizes() {
        assert!(ScreenRect::new(0, 0, 640, 480).validate().is_ok());
        assert!(ScreenRect::new(-3840, -200, 7680, 2160).validate().is_ok());
        assert_eq!(ScreenRect::new(0, 0, 640, 480).rgba_len().unwrap(), 640 * 480 * 4);
    }

    #[test]
    fn test_validate_rejects_oversized_regions() {
        let huge = ScreenRect::new(0, 0, u32::MAX, u32::MAX);
        assert!(huge.validate().is_err());
        assert!(huge.rgba_len().is_err());

        assert!(ScreenRect::new(0, 0, i32::MAX as u32 + 1, 1).validate().is_err());
        assert!(ScreenRect::new(0, 0, 20_000, 20_000).validate().is_err());
        assert!(ScreenRect::new(i32::MAX - 10, 0, 20, 20).validate().is_err());
        assert!(ScreenRect::new(0, 0, 0, 10).validate().is_err());
    }

    #[test]
    fn test_compose_rejects_oversized_region() {
        let err = compose_region(&ScreenRect::new(0, 0, u32::MAX, u32::MAX), &[]).unwrap_err();
        assert!(err.to_string().contains("Capture region"));
    }

    #[test]
    fn test_compose_across_two_monitors() {
        let left = MonitorShot {
            bounds: ScreenRect::new(0, 0, 10, 10),
            image: RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])),
        };
        let right = MonitorShot {
            bounds: ScreenRect::new(10, 0, 10, 10),
            image: RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255])),
        };

        let rect = ScreenRect::new(8, 5, 4, 8);
        let img = compose_region(&rect, &[left, right]).unwrap();

        assert_eq!(img.dimensions(), (4, 8));
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(3, 0), Rgba([0, 0, 255, 255]));
        // Rows 5..10 of the monitors are covered, rows below are not
        assert_eq!(*img.get_pixel(1, 4), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(1, 5), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_compose_samples_hidpi_shot() {
        let mut image = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        image.put_pixel(10, 10, Rgba([9, 9, 9, 255]));
        let shot = MonitorShot {
            bounds: ScreenRect::new(0, 0, 10, 10),
            image,
        };

        let img = compose_region(&ScreenRect::new(5, 5, 2, 2), &[shot]).unwrap();
        assert_eq!(*img.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
    }
}
