//! Screen capture of an arbitrary desktop rectangle.
//!
//! This module provides:
//! - The capture rectangle type (`ScreenRect`)
//! - Platform screen grabbing (`capture_region`): GDI on Windows, xcap elsewhere
//! - Loading a saved screenshot in place of the screen (`load_image`)

pub mod region;

#[cfg(windows)]
mod gdi;
#[cfg(not(windows))]
mod monitors;

pub use region::ScreenRect;

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

/// Captures `rect` from the virtual desktop (all monitors).
///
/// Fails without touching the screen when the rectangle is too large to
/// hold in memory.
pub fn capture_region(rect: &ScreenRect) -> Result<RgbaImage> {
    rect.validate()?;
    log::debug!(
        "Capturing {}x{} at ({}, {})",
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );

    #[cfg(windows)]
    let img = gdi::grab(rect)?;
    #[cfg(not(windows))]
    let img = monitors::grab(rect)?;

    Ok(img)
}

/// Loads an image file to be treated as the content of the capture region.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;
    log::info!(
        "Loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_rejects_oversized_region() {
        let err = capture_region(&ScreenRect::new(0, 0, u32::MAX, u32::MAX)).unwrap_err();
        assert!(err.to_string().contains("Capture region"));
    }
}
