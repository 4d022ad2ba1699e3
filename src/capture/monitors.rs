//! Screen capture through xcap for Linux (X11/Wayland) and macOS.

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use xcap::Monitor;

use super::region::{compose_region, MonitorShot, ScreenRect};

/// Captures every monitor overlapping `rect` and stitches the overlap.
pub fn grab(rect: &ScreenRect) -> Result<RgbaImage> {
    let monitors = Monitor::all().context("Failed to enumerate monitors")?;

    let mut shots = Vec::new();
    for monitor in monitors {
        let bounds = ScreenRect::new(
            monitor.x().context("Failed to read monitor position")?,
            monitor.y().context("Failed to read monitor position")?,
            monitor.width().context("Failed to read monitor size")?,
            monitor.height().context("Failed to read monitor size")?,
        );
        if bounds.intersect(rect).is_none() {
            continue;
        }

        let captured = monitor.capture_image().context(
            "Failed to capture monitor. On macOS, grant Screen Recording permission \
             to the calling terminal in System Settings > Privacy & Security",
        )?;
        log::debug!(
            "Captured monitor at ({}, {}) {}x{} -> {}x{} pixels",
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            captured.width(),
            captured.height()
        );

        let (w, h) = captured.dimensions();
        let image = RgbaImage::from_raw(w, h, captured.into_raw())
            .context("Monitor capture returned a truncated buffer")?;
        shots.push(MonitorShot { bounds, image });
    }

    if shots.is_empty() {
        bail!(
            "Capture region {}x{} at ({}, {}) is not on any monitor",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
    }

    compose_region(rect, &shots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a graphical display and screen recording permission"]
    fn test_grab_dimensions() {
        let img = grab(&ScreenRect::new(0, 0, 64, 48)).expect("grab failed");
        assert_eq!(img.dimensions(), (64, 48));
    }
}
