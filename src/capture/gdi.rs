//! Screen capture using GDI on Windows.
//!
//! The desktop DC spans the whole virtual screen, so a single `BitBlt`
//! covers regions that straddle monitors.

use anyhow::{anyhow, Result};
use image::{ImageBuffer, Rgba, RgbaImage};

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC, GetDIBits,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, CAPTUREBLT, DIB_RGB_COLORS,
    HGDIOBJ, ROP_CODE, SRCCOPY,
};
use windows::Win32::UI::HiDpi::{
    SetThreadDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

use super::region::ScreenRect;

/// Copies `rect` from the screen into an RGBA image.
///
/// The thread is made per-monitor DPI aware first so coordinates are
/// physical pixels on every monitor.
pub fn grab(rect: &ScreenRect) -> Result<RgbaImage> {
    let buffer_len = rect.rgba_len()?;
    let width = i32::try_from(rect.width)?;
    let height = i32::try_from(rect.height)?;

    unsafe {
        let _ = SetThreadDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let screen_dc = unsafe { GetDC(HWND::default()) };
    if screen_dc.is_invalid() {
        return Err(anyhow!("Failed to get the desktop device context"));
    }

    let mem_dc = unsafe { CreateCompatibleDC(screen_dc) };
    let bitmap = unsafe { CreateCompatibleBitmap(screen_dc, width, height) };
    let previous = unsafe { SelectObject(mem_dc, HGDIOBJ(bitmap.0)) };

    let blit = unsafe {
        BitBlt(
            mem_dc,
            0,
            0,
            width,
            height,
            screen_dc,
            rect.x,
            rect.y,
            ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0),
        )
    };

    // Negative height requests a top-down DIB
    let mut info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut bgra = vec![0u8; buffer_len];

    let lines = if blit.is_ok() {
        unsafe {
            SelectObject(mem_dc, previous);
            GetDIBits(
                mem_dc,
                bitmap,
                0,
                rect.height,
                Some(bgra.as_mut_ptr().cast()),
                &mut info,
                DIB_RGB_COLORS,
            )
        }
    } else {
        0
    };

    unsafe {
        let _ = DeleteObject(HGDIOBJ(bitmap.0));
        let _ = DeleteDC(mem_dc);
        let _ = ReleaseDC(HWND::default(), screen_dc);
    }

    blit.map_err(|e| anyhow!("BitBlt failed: {}", e))?;
    if lines != height {
        return Err(anyhow!(
            "GetDIBits copied {} of {} rows",
            lines.max(0),
            height
        ));
    }

    Ok(bgra_to_rgba(rect.width, rect.height, &bgra))
}

/// Converts a top-down BGRA buffer to RGBA. GDI leaves alpha at zero, so it
/// is forced opaque.
fn bgra_to_rgba(width: u32, height: u32, bgra: &[u8]) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let offset = ((y * width + x) * 4) as usize;
        Rgba([bgra[offset + 2], bgra[offset + 1], bgra[offset], 255])
    })
}
